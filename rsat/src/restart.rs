//! Glucose-style restart policy.
//!
//! Restarts are triggered from the glue level (LBD) of freshly learned clauses rather than from a
//! fixed schedule. Two moving averages of LBD are maintained: a short-term one over the last
//! [`recent_lbd_window`](crate::config::SolverConfig::recent_lbd_window) conflicts, and a
//! long-term one over every conflict since the last restart. When the short-term average rises
//! enough above the long-term one, the recent search has been getting harder, so it's time to
//! throw the current decisions away and start over with what was learned.

use std::collections::VecDeque;

use partial_ref::{partial, PartialRef};

use crate::context::{Context, RestartP, SolverConfigP};

/// Tracks the moving averages driving the restart decision.
#[derive(Default)]
pub struct Restart {
    recent: VecDeque<usize>,
    recent_sum: u64,
    global_sum: u64,
    global_count: u64,
}

impl Restart {
    /// Short-term moving average of LBD, over the last `window` conflicts.
    fn recent_lbd_avg(&self) -> f64 {
        if self.recent.is_empty() {
            return 0.0;
        }
        self.recent_sum as f64 / self.recent.len() as f64
    }

    /// Long-term moving average of LBD, over every conflict since the last restart.
    fn global_lbd_avg(&self) -> f64 {
        if self.global_count == 0 {
            return 0.0;
        }
        self.global_sum as f64 / self.global_count as f64
    }

    /// Feed the LBD of a newly learned clause into both moving averages.
    fn register_conflict(&mut self, lbd: usize, window: usize) {
        self.recent.push_back(lbd);
        self.recent_sum += lbd as u64;
        while self.recent.len() > window {
            if let Some(old) = self.recent.pop_front() {
                self.recent_sum -= old as u64;
            }
        }

        self.global_sum += lbd as u64;
        self.global_count += 1;
    }

    /// Whether the short-term average has risen enough above the long-term average to warrant a
    /// restart.
    fn should_restart(&self, factor: f32) -> bool {
        self.global_count > 0 && self.recent_lbd_avg() * f64::from(factor) > self.global_lbd_avg()
    }

    /// Reset the short-term window after a restart, without touching the long-term average.
    fn register_restart(&mut self) {
        self.recent.clear();
        self.recent_sum = 0;
    }
}

/// Feed the LBD of a freshly learned clause into the restart policy.
pub fn register_conflict(mut ctx: partial!(Context, mut RestartP, SolverConfigP), lbd: usize) {
    let window = ctx.part(SolverConfigP).recent_lbd_window;
    ctx.part_mut(RestartP).register_conflict(lbd, window);
}

/// Whether a restart is due right now.
pub fn should_restart(ctx: partial!(Context, RestartP, SolverConfigP)) -> bool {
    let factor = ctx.part(SolverConfigP).restart_lbd_factor;
    ctx.part(RestartP).should_restart(factor)
}

/// Record that a restart happened, resetting the short-term window.
pub fn register_restart(mut ctx: partial!(Context, mut RestartP)) {
    ctx.part_mut(RestartP).register_restart();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_lbd_never_restarts() {
        let mut restart = Restart::default();
        for _ in 0..200 {
            restart.register_conflict(5, 50);
        }
        assert!(!restart.should_restart(0.8));
    }

    #[test]
    fn lbd_spike_then_drop_triggers_restart() {
        let mut restart = Restart::default();
        for _ in 0..200 {
            restart.register_conflict(10, 50);
        }
        for _ in 0..50 {
            restart.register_conflict(1, 50);
        }
        assert!(restart.should_restart(0.8));
    }

    #[test]
    fn register_restart_resets_recent_window_only() {
        let mut restart = Restart::default();
        for _ in 0..50 {
            restart.register_conflict(10, 50);
        }
        restart.register_restart();
        assert_eq!(restart.recent_lbd_avg(), 0.0);
        assert!(restart.global_lbd_avg() > 0.0);
    }
}
