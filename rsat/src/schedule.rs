//! Scheduling of restarts, reductions and solving steps.
use log::info;

use partial_ref::{partial, PartialRef};

use crate::cdcl::conflict_step;
use crate::clause::reduce::reduce;
use crate::clause::ClauseDb;
use crate::context::{
    AnalyzeConflictP, AssignmentP, BinaryClausesP, ClauseActivityP, ClauseAllocP, ClauseDbP,
    Context, ImplGraphP, IncrementalP, ModelP, RestartP, ScheduleP, SolverConfigP, SolverStateP,
    TmpDataP, TrailP, VsidsP, WatchlistsP,
};
use crate::prop::restart as backjump_to_restart;
use crate::restart::{register_restart, should_restart};
use crate::state::SatState;

/// Scheduling of processing and solving steps.
///
/// Restart and reduction decisions themselves live in [`crate::restart`] and
/// [`crate::clause::db::ClauseDb`]; this only counts conflicts for the periodic log line.
#[derive(Default)]
pub struct Schedule {
    conflicts: u64,
}

impl Schedule {
    /// Total conflicts handled so far, used to gate how often the stop flag is polled (§5: "the
    /// control thread polls a stop-flag atomic every `check_stop_interval` conflicts").
    pub fn conflicts(&self) -> u64 {
        self.conflicts
    }
}

/// Perform one step of the schedule.
pub fn schedule_step(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut BinaryClausesP,
        mut ClauseActivityP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut IncrementalP,
        mut ModelP,
        mut RestartP,
        mut ScheduleP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut VsidsP,
        mut WatchlistsP,
        SolverConfigP,
    ),
) -> bool {
    if ctx.part(SolverStateP).sat_state != SatState::Unknown {
        return false;
    }

    if should_restart(ctx.borrow()) {
        backjump_to_restart(ctx.borrow());
        register_restart(ctx.borrow());
    }

    if ctx.part(ClauseDbP).reduction_due() {
        let config = ctx.part(SolverConfigP);
        let base_interval = config.reduction_base_interval;
        let interval_increment = config.reduction_interval_increment;
        let keep_known_good = config.reduction_keep_known_good;

        reduce(ctx.borrow(), keep_known_good);
        ctx.part_mut(ClauseDbP)
            .schedule_next_reduction(base_interval, interval_increment);
    }

    conflict_step(ctx.borrow());

    ClauseDb::collect_garbage_if_due(ctx.borrow());

    let (schedule, ctx) = ctx.split_part_mut(ScheduleP);
    schedule.conflicts += 1;

    if schedule.conflicts % 5000 == 0 {
        let units = ctx.part(TrailP).top_level_assignment_count();
        info!(
            "confl: {}k vars: {} bin: {} problem: {} lemmas: {}",
            schedule.conflicts / 1000,
            ctx.part(AssignmentP).assignment().len() - units,
            ctx.part(BinaryClausesP).count(),
            ctx.part(ClauseDbP).problem_clauses().len(),
            ctx.part(ClauseDbP).lemmas().len(),
        );
    }

    true
}
