//! Unit propagation.
pub mod assignment;
mod binary;
pub mod graph;
mod long;
pub mod watch;

use partial_ref::{partial, PartialRef};

use crate::context::{
    AssignmentP, BinaryClausesP, ClauseAllocP, Context, ImplGraphP, TrailP, WatchlistsP,
};

pub use assignment::{backtrack, enqueue_assignment, full_restart, restart, Assignment, Trail};
pub use binary::propagate_binary;
pub use graph::{Conflict, ImplGraph, ImplNode, Reason};
pub use long::propagate_long;
pub use watch::{Watch, Watchlists};

/// Propagate all enqueued assignments to a fixpoint.
///
/// For each literal dequeued from the trail, binary clauses are swept before long clauses, since
/// they are cheaper to check and more likely to find the next forced literal. Propagation keeps
/// going across newly enqueued literals until the queue is empty or a conflict is found.
pub fn propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut TrailP,
        mut WatchlistsP,
        BinaryClausesP,
    ),
) -> Result<(), Conflict> {
    loop {
        let lit = match ctx.part_mut(TrailP).pop_queue() {
            Some(lit) => lit,
            None => return Ok(()),
        };

        propagate_binary(ctx.borrow(), lit)?;
        propagate_long(ctx.borrow(), lit)?;
    }
}
