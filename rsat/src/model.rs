//! Model snapshot.
//!
//! The live [`Assignment`](crate::prop::Assignment) keeps changing as soon as the search resumes
//! (e.g. for the next incremental solve call), so a satisfying assignment is snapshotted into a
//! [`Model`] the moment `SAT` is reported, rather than read live out of `Assignment` by callers.

use partial_ref::{partial, PartialRef};

use rsat_formula::{Lit, Var};

use crate::context::{AssignmentP, Context, ModelP};

/// A snapshot of a satisfying assignment.
#[derive(Default, Clone)]
pub struct Model {
    values: Vec<Option<bool>>,
}

impl Model {
    /// The value assigned to `var` in this snapshot, if any.
    pub fn var_value(&self, var: Var) -> Option<bool> {
        self.values.get(var.index()).copied().flatten()
    }

    /// The full assignment as DIMACS-style literals, one per variable, in variable order.
    pub fn lits(&self) -> Vec<Lit> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(index, &value)| {
                value.map(|value| Var::from_index(index).lit(value))
            })
            .collect()
    }
}

/// Snapshot the current assignment as the model, to be returned for as long as the solver stays
/// in the `Sat` state.
pub fn snapshot_model(mut ctx: partial!(Context, mut ModelP, AssignmentP)) {
    let values = ctx.part(AssignmentP).assignment().to_vec();
    ctx.part_mut(ModelP).values = values;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_has_no_values() {
        let model = Model::default();
        assert_eq!(model.lits(), vec![]);
    }
}
