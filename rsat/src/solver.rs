//! Boolean satisfiability solver.
use std::io;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use anyhow::Error;
use log::info;

use rsat_formula::CnfFormula;
use rsat_formula::Lit;
use rsat_dimacs::DimacsParser;

use crate::config::SolverConfigUpdate;
use crate::context::{
    config_changed, ensure_var, ensure_var_count, Context, IncrementalP, ModelP, ScheduleP,
    SolverConfigP, SolverStateP,
};
use crate::incremental::set_assumptions;
use crate::load::load_clause;
use crate::schedule::schedule_step;
use crate::state::SatState;
use crate::watchdog::{TerminateCallback, Watchdog};

/// A boolean satisfiability solver.
///
/// This is the library-level counterpart of the IPASIR incremental SAT interface: add clauses,
/// optionally set assumptions, solve, and read back the model or the failed assumption core.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
    watchdog: Option<Watchdog>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Add every clause of a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Add a single clause to the solver.
    pub fn add_clause(&mut self, lits: &[Lit]) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        for &lit in lits {
            ensure_var(ctx.borrow(), lit.var());
        }
        load_clause(ctx.borrow(), lits);
    }

    /// Reads and adds a formula in DIMACS CNF format.
    ///
    /// Using this avoids creating a temporary [`CnfFormula`]. The input may be transparently
    /// gzip-compressed; wrap it with [`rsat_dimacs::open_possibly_compressed`] beforehand if it
    /// might be.
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);
        let mut parser = DimacsParser::new();

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            parser.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);

            self.add_formula(&parser.take_formula());
        }
        parser.eof()?;
        self.add_formula(&parser.take_formula());
        parser.check_header()?;

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        Ok(())
    }

    /// Applies a partial configuration update, leaving every unset field untouched.
    pub fn config(&mut self, update: &SolverConfigUpdate) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        update.apply(ctx.part_mut(SolverConfigP));
        config_changed(ctx.borrow(), update);
    }

    /// Sets the assumptions to use for the next call to [`solve`](Solver::solve).
    ///
    /// Replaces any previously set assumptions.
    pub fn assume(&mut self, assumptions: &[Lit]) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        for &lit in assumptions {
            ensure_var(ctx.borrow(), lit.var());
        }
        set_assumptions(ctx.borrow(), assumptions);
    }

    /// Whether `lit` is part of the failed assumption core of the last
    /// [`UnsatUnderAssumptions`](crate::state::SatState::UnsatUnderAssumptions) result.
    pub fn failed(&self, lit: Lit) -> bool {
        let mut ctx = self.ctx.into_partial_ref();
        ctx.part(IncrementalP).failed_core().contains(&lit)
    }

    /// Installs a callback polled roughly every 100ms from a background thread; once it returns
    /// `true`, the next conflict checkpoint stops the search and `solve` returns `None`.
    ///
    /// Replaces any previously installed callback.
    pub fn set_terminate(&mut self, callback: impl FnMut() -> bool + Send + 'static) {
        let callback: TerminateCallback = Box::new(callback);
        self.watchdog = Some(Watchdog::spawn(callback));
    }

    /// Check the satisfiability of the current formula under the current assumptions.
    pub fn solve(&mut self) -> Option<bool> {
        let mut ctx = self.ctx.into_partial_ref_mut();

        while ctx.part(SolverStateP).sat_state == SatState::Unknown {
            let check_stop_interval = ctx.part(SolverConfigP).check_stop_interval.max(1);
            let at_checkpoint = ctx.part(ScheduleP).conflicts() % check_stop_interval == 0;

            if at_checkpoint {
                if let Some(watchdog) = &self.watchdog {
                    if watchdog.stop_requested() {
                        ctx.part_mut(SolverStateP).stop_requested = true;
                        break;
                    }
                }
            }
            if !schedule_step(ctx.borrow()) {
                break;
            }
        }

        if ctx.part(SolverStateP).detected_out_of_memory || ctx.part(SolverStateP).stop_requested {
            return None;
        }

        match ctx.part(SolverStateP).sat_state {
            SatState::Unknown => None,
            SatState::Sat => Some(true),
            SatState::Unsat | SatState::UnsatUnderAssumptions => Some(false),
        }
    }

    /// Set of literals that satisfy the formula, if the last [`solve`](Solver::solve) call
    /// returned `Some(true)`.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let mut ctx = self.ctx.into_partial_ref();
        if ctx.part(SolverStateP).sat_state == SatState::Sat {
            Some(ctx.part(ModelP).lits())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use rsat_dimacs::write_dimacs;
    use rsat_formula::CnfFormula;

    use crate::test::{conditional_pigeon_hole, sat_formula, sgen_unsat_formula};

    proptest! {
        #[test]
        fn sgen_unsat(formula in sgen_unsat_formula(1..7usize)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), Some(false));
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), Some(true));

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sat_via_dimacs(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            let mut dimacs = vec![];

            write_dimacs(&mut dimacs, &formula).unwrap();

            solver.add_dimacs_cnf(&mut &dimacs[..]).unwrap();

            prop_assert_eq!(solver.solve(), Some(true));

            let model = solver.model().unwrap();

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|lit| model.contains(lit)));
            }
        }

        #[test]
        fn sgen_unsat_incremetal_clauses(formula in sgen_unsat_formula(1..7usize)) {
            let mut solver = Solver::new();

            let mut last_state = Some(true);

            for clause in formula.iter() {
                let single_clause = CnfFormula::from(Some(clause));
                solver.add_formula(&single_clause);

                let state = solver.solve();
                if state != last_state {
                    prop_assert_eq!(state, Some(false));
                    prop_assert_eq!(last_state, Some(true));
                    last_state = state;
                }
            }

            prop_assert_eq!(last_state, Some(false));
        }

        #[test]
        fn assumption_core(
            (enable_row, _columns, formula) in conditional_pigeon_hole(1..4usize, 1..4usize),
        ) {
            let mut solver = Solver::new();
            solver.add_formula(&formula);

            prop_assert_eq!(solver.solve(), Some(true));

            solver.assume(&enable_row);
            prop_assert_eq!(solver.solve(), Some(false));

            prop_assert!(enable_row.iter().any(|&lit| solver.failed(lit)));
        }
    }

    #[test]
    fn config_update_is_applied() {
        let mut solver = Solver::new();

        let mut update = SolverConfigUpdate::default();
        update.set_by_name("check-stop-interval", "1").unwrap();
        solver.config(&update);

        let ctx = solver.ctx.into_partial_ref();
        assert_eq!(ctx.part(SolverConfigP).check_stop_interval, 1);
    }
}
