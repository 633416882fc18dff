//! Miscellaneous solver state.

/// Satisfiability state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SatState {
    Unknown,
    Sat,
    Unsat,
    UnsatUnderAssumptions,
}

impl Default for SatState {
    fn default() -> SatState {
        SatState::Unknown
    }
}

/// Miscellaneous solver state.
///
/// Anything larger or any larger group of related state variables should be moved into a separate
/// part of [`Context`](crate::context::Context).
#[derive(Default)]
pub struct SolverState {
    pub sat_state: SatState,

    /// Set once a region allocation has failed. Every solve call returns `Unknown` from this
    /// point on, per the resource-exhaustion error taxonomy.
    pub detected_out_of_memory: bool,

    /// Set once an empty clause has been added. Every solve call returns `Unsat` immediately
    /// from this point on.
    pub detected_unsat: bool,

    /// Set by the stop flag watchdog or by an explicit `stop()` call; observed at the next
    /// conflict checkpoint.
    pub stop_requested: bool,
}

impl SolverState {
    /// Whether further search is pointless: the instance is already known SAT or UNSAT, or a
    /// hard failure was latched.
    pub fn is_settled(&self) -> bool {
        self.detected_unsat
            || self.detected_out_of_memory
            || matches!(self.sat_state, SatState::Unsat | SatState::UnsatUnderAssumptions)
    }
}
