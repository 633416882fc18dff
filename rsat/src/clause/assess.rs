//! Clause assessment.

use partial_ref::{partial, PartialRef};

use rsat_formula::Lit;

use crate::context::{Context, ImplGraphP, TmpDataP};
use crate::glue::compute_glue;

/// Glue level (LBD) of a newly learned clause.
///
/// Called while the clause is still part of the conflict, so the computed glue level is one higher
/// than it will be after backtracking, when the clause becomes asserting.
pub fn assess_learned_clause(mut ctx: partial!(Context, mut TmpDataP, ImplGraphP), lits: &[Lit]) -> usize {
    compute_glue(ctx.borrow(), lits).saturating_sub(1)
}
