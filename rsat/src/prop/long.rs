//! Propagation of long (3+ literal) clauses via the two-watched-literal scheme.
use partial_ref::{partial, PartialRef};

use rsat_formula::Lit;

use crate::context::{AssignmentP, ClauseAllocP, Context, ImplGraphP, TrailP, WatchlistsP};

use super::watch::Watch;
use super::{enqueue_assignment, Conflict, Reason};

/// Propagate all literals implied by long clauses watching the given literal.
///
/// On conflict return the long clause propagating the conflicting assignment. Whether or not a
/// conflict is found, the watch list for `lit` ends up holding exactly the watches that still
/// belong to it, with clauses whose watches moved removed and any new watches (on other literals)
/// added via [`Watchlists::add_watch`](super::Watchlists::add_watch).
pub fn propagate_long(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut TrailP,
        mut WatchlistsP,
        mut ClauseAllocP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    let false_lit = !lit;

    // Take the watch list out so we can mutate other literals' watch lists (via `add_watch`)
    // while scanning this one.
    let mut watch_list = std::mem::take(ctx.part_mut(WatchlistsP).watched_by_mut(lit));

    let mut read = 0;
    let mut write = 0;
    let mut conflict = None;

    while read < watch_list.len() {
        let watch = watch_list[read];
        read += 1;

        if ctx.part(AssignmentP).lit_is_true(watch.blocking) {
            watch_list[write] = watch;
            write += 1;
            continue;
        }

        let cref = watch.cref;

        // Make sure the other watched literal is in position 0, the false literal in position 1.
        let mut first = ctx.part(ClauseAllocP).clause(cref).lit_at(0);
        if first == false_lit {
            let second = ctx.part(ClauseAllocP).clause(cref).lit_at(1);
            let mut clause = ctx.part_mut(ClauseAllocP).clause_mut(cref);
            clause.set_lit_at(0, second);
            clause.set_lit_at(1, false_lit);
            first = second;
        }

        let new_watch = Watch { cref, blocking: first };

        if first != watch.blocking && ctx.part(AssignmentP).lit_is_true(first) {
            // Clause is already satisfied by its other watched literal.
            watch_list[write] = new_watch;
            write += 1;
            continue;
        }

        // Look for a new literal to watch among the unwatched literals.
        let len = ctx.part(ClauseAllocP).clause(cref).size();
        let mut replaced = false;

        for idx in 2..len {
            let rest_lit = ctx.part(ClauseAllocP).clause(cref).lit_at(idx);
            if !ctx.part(AssignmentP).lit_is_false(rest_lit) {
                let mut clause = ctx.part_mut(ClauseAllocP).clause_mut(cref);
                clause.set_lit_at(1, rest_lit);
                clause.set_lit_at(idx, false_lit);
                ctx.part_mut(WatchlistsP).add_watch(!rest_lit, new_watch);
                replaced = true;
                break;
            }
        }

        if replaced {
            continue;
        }

        // No replacement literal found: the clause stays watched on `lit`.
        watch_list[write] = new_watch;
        write += 1;

        if ctx.part(AssignmentP).lit_is_false(first) {
            conflict = Some(Conflict::Long(cref));
            break;
        }

        enqueue_assignment(ctx.borrow(), first, Reason::Long(cref));
    }

    if conflict.is_some() {
        // Preserve the remaining, not-yet-processed watches unchanged.
        while read < watch_list.len() {
            watch_list[write] = watch_list[read];
            write += 1;
            read += 1;
        }
    }
    watch_list.truncate(write);
    *ctx.part_mut(WatchlistsP).watched_by_mut(lit) = watch_list;

    match conflict {
        Some(conflict) => Err(conflict),
        None => Ok(()),
    }
}
