//! Simplification using unit clauses.

use partial_ref::{partial, PartialRef};

use crate::clause::{ClauseDb, ClauseViewMut};
use crate::context::{
    AssignmentP, BinaryClausesP, ClauseActivityP, ClauseAllocP, ClauseDbP, Context, ImplGraphP,
    TrailP, WatchlistsP,
};

/// Clear the level-0 trail, marking its literals as permanently fixed.
///
/// Level-0 assignments are never backtracked, so once propagation settles at level 0 there is no
/// further use in keeping them on the trail; `Trail::clear` folds their count into
/// `top_level_assignment_count` before dropping them.
///
/// Returns whether any new unit clauses were found, which is the trigger to run [`simplify`].
pub fn prove_units(mut ctx: partial!(Context, mut TrailP)) -> bool {
    if ctx.part(TrailP).current_level() == 0 && !ctx.part(TrailP).trail().is_empty() {
        ctx.part_mut(TrailP).clear();
        true
    } else {
        false
    }
}

/// Remove satisfied clauses and false literals.
///
/// Unit-based subsumption and strengthening (§4.9): any long clause containing a literal fixed
/// true at level 0 is deleted; any long clause containing a literal fixed false has that literal
/// removed (shrinking it to a binary clause if necessary).
pub fn simplify(
    mut ctx: partial!(
        Context,
        mut BinaryClausesP,
        mut ClauseActivityP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut WatchlistsP,
        AssignmentP,
        ImplGraphP,
    ),
) {
    let mut crefs = ctx.part(ClauseDbP).problem_clauses().to_vec();
    crefs.extend_from_slice(ctx.part(ClauseDbP).lemmas());

    let mut new_lits = vec![];
    let mut to_binary = vec![];

    for cref in crefs {
        if ctx.part(ClauseAllocP).clause(cref).is_scheduled_for_deletion() {
            continue;
        }

        new_lits.clear();
        let mut satisfied = false;

        for &lit in ctx.part(ClauseAllocP).clause(cref).lits() {
            match ctx.part(AssignmentP).lit_value(lit) {
                None => new_lits.push(lit),
                Some(true) => {
                    satisfied = true;
                    break;
                }
                Some(false) => (),
            }
        }

        if satisfied {
            ClauseDb::try_delete_clause(ctx.borrow(), cref);
            continue;
        }

        let initial_len = ctx.part(ClauseAllocP).clause(cref).lits().len();
        if new_lits.len() == initial_len {
            continue;
        }

        match new_lits[..] {
            // Cannot have empty or unit clauses after full propagation. An empty clause would
            // have been a conflict and a unit clause must be satisfied and thus would have been
            // dropped above.
            [] | [_] => unreachable!("fully propagated clauses cannot shrink below size 2"),
            [lit_0, lit_1] => {
                to_binary.push([lit_0, lit_1]);
                ClauseDb::delete_clause(ctx.borrow(), cref);
            }
            ref lits => {
                let mut view: ClauseViewMut = ctx.part_mut(ClauseAllocP).clause_mut(cref);
                view.lits_mut()[..lits.len()].copy_from_slice(lits);
                view.set_size(lits.len());
                view.refresh_signature();
            }
        }
    }

    for lits in to_binary {
        ctx.part_mut(BinaryClausesP).add_binary_clause(lits);
    }

    ClauseDb::collect_garbage_if_due(ctx.borrow());
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use crate::context::set_var_count;
    use crate::load::load_clause;
    use crate::prop::{enqueue_assignment, Reason};

    #[test]
    fn prove_units_clears_level_zero_trail() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 4);

        assert!(!prove_units(ctx.borrow()));

        enqueue_assignment(ctx.borrow(), rsat_formula::lit![1], Reason::Unit);
        assert!(prove_units(ctx.borrow()));
        assert!(ctx.part(TrailP).trail().is_empty());

        assert!(!prove_units(ctx.borrow()));
    }

    #[test]
    fn prove_units_leaves_deeper_levels_alone() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 4);

        ctx.part_mut(TrailP).new_decision_level();
        enqueue_assignment(ctx.borrow(), rsat_formula::lit![1], Reason::Unit);

        assert!(!prove_units(ctx.borrow()));
        assert_eq!(ctx.part(TrailP).trail().len(), 1);
    }

    #[test]
    fn simplify_drops_satisfied_clause_and_shrinks_false_literal() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 4);

        load_clause(ctx.borrow(), &rsat_formula::lits![1, 2, 3]);
        load_clause(ctx.borrow(), &rsat_formula::lits![-1, 2, 4]);

        enqueue_assignment(ctx.borrow(), rsat_formula::lit![1], Reason::Unit);
        prove_units(ctx.borrow());

        simplify(ctx.borrow());

        // The first clause is satisfied by `1` and dropped; the second loses its false literal
        // `-1` and shrinks to a binary clause.
        assert_eq!(ctx.part(ClauseDbP).problem_clauses().len(), 0);
        assert_eq!(ctx.part(BinaryClausesP).count(), 1);
    }
}
