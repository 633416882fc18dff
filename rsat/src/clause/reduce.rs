//! Clause database reduction.

use partial_ref::{partial, PartialRef};

use crate::context::{
    AssignmentP, ClauseActivityP, ClauseAllocP, ClauseDbP, Context, ImplGraphP, WatchlistsP,
};

use super::ClauseDb;

/// Deletes the least valuable half of learned lemmas and compacts clause storage.
///
/// Lemmas are sorted by ascending LBD, breaking ties by descending activity, so the front of the
/// sort is "most useful". The first `keep_known_good` lemmas by this order are never considered for
/// deletion regardless of how small the database is; of the remainder, half are dropped, skipping
/// any clause that is currently the reason for a variable on the trail.
pub fn reduce(
    mut ctx: partial!(
        Context,
        mut ClauseDbP,
        mut ClauseAllocP,
        mut ClauseActivityP,
        mut WatchlistsP,
        AssignmentP,
        ImplGraphP,
    ),
    keep_known_good: usize,
) {
    let mut lemmas: Vec<_> = ctx.part(ClauseDbP).lemmas().to_vec();

    lemmas.sort_unstable_by(|&a, &b| {
        let a_lbd = ctx.part(ClauseAllocP).clause(a).lbd();
        let b_lbd = ctx.part(ClauseAllocP).clause(b).lbd();
        a_lbd.cmp(&b_lbd).then_with(|| {
            let a_activity = ctx.part(ClauseActivityP).value(a);
            let b_activity = ctx.part(ClauseActivityP).value(b);
            b_activity
                .partial_cmp(&a_activity)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });

    let to_delete = lemmas.len().saturating_sub(keep_known_good) / 2;

    for &cref in lemmas.iter().rev().take(to_delete) {
        ClauseDb::try_delete_clause(ctx.borrow(), cref);
    }

    let mapping = ClauseDb::collect_garbage(ctx.borrow());
    ctx.part_mut(WatchlistsP).remap(&mapping);
}
