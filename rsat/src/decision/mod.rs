//! Decision heuristics.

pub mod vsids;

use partial_ref::{partial, PartialRef};

use rsat_formula::{Lit, Var};

use crate::context::{AssignmentP, Context, ImplGraphP, TrailP, VsidsP};
use crate::prop::{enqueue_assignment, Reason};

/// Make a VSIDS-guided decision and enqueue it.
///
/// Pops variables off the activity heap until an eligible (currently unassigned) one is found,
/// builds a literal from it using its last assigned value as phase (defaulting to `false`), and
/// pushes a new decision level.
///
/// Returns `false` if no decision was made because all variables are assigned.
pub fn make_decision(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP, mut VsidsP),
) -> bool {
    let decision_var = loop {
        let (vsids, mut ctx) = ctx.split_part_mut(VsidsP);
        match vsids.next() {
            None => break None,
            Some(var) => {
                if ctx.part(AssignmentP).var_value(var).is_none() {
                    break Some(var);
                }
                // Already assigned (e.g. by a unit clause since it was last reset). `vsids.next`
                // already removed it from the heap; `make_available` puts it back on backtrack.
            }
        }
    };

    match decision_var {
        None => false,
        Some(var) => {
            let phase = ctx.part(AssignmentP).last_var_value(var);
            let decision = Lit::from_var(var, phase);

            ctx.part_mut(TrailP).new_decision_level();

            enqueue_assignment(ctx.borrow(), decision, Reason::Unit);

            true
        }
    }
}

/// Re-insert a variable into the VSIDS heap, e.g. after it becomes unassigned on backtrack.
pub fn make_available(mut ctx: partial!(Context, mut VsidsP), var: Var) {
    ctx.part_mut(VsidsP).make_available(var);
}
