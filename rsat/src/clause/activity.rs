//! Clause activity.
//!
//! Mirrors the VSIDS bump/decay/rescale scheme (see [`crate::decision::vsids`]) but for learned
//! clauses instead of variables: bumping a clause involved in a conflict makes it less likely to be
//! reclaimed by the next reduction pass.

use std::collections::HashMap;

use partial_ref::{partial, PartialRef};
use rustc_hash::FxHashMap;

use crate::config::SolverConfig;
use crate::context::{parts::*, Context};

use super::ClauseRef;

/// Per-clause activity values, keyed by the clause's current [`ClauseRef`].
///
/// Unlike variable activity, clause activity isn't dense over a small integer range, so it's kept
/// in a hash map rather than a `Vec`. `ClauseAlloc::compress` invalidates every `ClauseRef`, so
/// [`ClauseActivity::remap`] must run immediately after any compaction.
pub struct ClauseActivity {
    values: FxHashMap<ClauseRef, f32>,
    bump: f32,
    inv_decay: f32,
}

impl Default for ClauseActivity {
    fn default() -> ClauseActivity {
        ClauseActivity {
            values: FxHashMap::default(),
            bump: 1.0,
            inv_decay: 1.0 / SolverConfig::default().clause_activity_decay,
        }
    }
}

fn rescale_limit() -> f32 {
    std::f32::MAX / 16.0
}

impl ClauseActivity {
    /// Change the decay factor.
    pub fn set_decay(&mut self, decay: f32) {
        assert!(decay < 1.0);
        assert!(decay > 1.0 / 16.0);
        self.inv_decay = 1.0 / decay;
    }

    pub fn value(&self, cref: ClauseRef) -> f32 {
        self.values.get(&cref).copied().unwrap_or(0.0)
    }

    /// Start tracking activity for a freshly learned clause, at the current bump value.
    pub fn register(&mut self, cref: ClauseRef) {
        self.values.insert(cref, self.bump);
    }

    pub fn forget(&mut self, cref: ClauseRef) {
        self.values.remove(&cref);
    }

    /// Carry activity values over a `ClauseAlloc::compress` call.
    pub fn remap(&mut self, mapping: &HashMap<ClauseRef, ClauseRef>) {
        let mut updated = FxHashMap::default();
        for (&old, &value) in self.values.iter() {
            if let Some(&new) = mapping.get(&old) {
                updated.insert(new, value);
            }
        }
        self.values = updated;
    }

    fn rescale(&mut self) {
        let rescale_factor = 1.0 / rescale_limit();
        for value in self.values.values_mut() {
            *value *= rescale_factor;
        }
        self.bump *= rescale_factor;
    }
}

/// Increase a clause's activity.
pub fn bump_clause_activity(mut ctx: partial!(Context, mut ClauseActivityP), cref: ClauseRef) {
    let activities = ctx.part_mut(ClauseActivityP);
    let bump = activities.bump;
    let value = activities.values.entry(cref).or_insert(0.0);
    *value += bump;
    let rescale = *value >= rescale_limit();
    if rescale {
        activities.rescale();
    }
}

/// Decay all clause activities.
pub fn decay_clause_activities(mut ctx: partial!(Context, mut ClauseActivityP)) {
    let activities = ctx.part_mut(ClauseActivityP);
    activities.bump *= activities.inv_decay;
    if activities.bump >= rescale_limit() {
        activities.rescale();
    }
}
