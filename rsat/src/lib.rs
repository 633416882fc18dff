//! A CDCL based SAT solver.
#[cfg(test)]
#[macro_use]
extern crate rsat_formula;

mod analyze_conflict;
mod binary;
mod cdcl;
mod clause;
mod config;
mod context;
mod decision;
mod glue;
mod incremental;
mod load;
mod model;
mod prop;
mod restart;
mod schedule;
mod simplify;
mod solver;
mod state;
mod tmp;
mod watchdog;

mod vec_mut_scan;

#[cfg(test)]
mod test;

pub use config::{SolverConfig, SolverConfigUpdate};
pub use solver::Solver;
pub use state::SatState;
