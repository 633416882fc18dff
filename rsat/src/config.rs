//! Solver configuration.

use thiserror::Error;

/// Configurable parameters used during solving.
///
/// Defaults follow the algorithm descriptions for VSIDS branching, Glucose-style restarts, and
/// database reduction.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Multiplicative decay for the VSIDS decision heuristic.
    ///
    /// The bump amount grows by `1 / vsids_decay` on every conflict, which is equivalent to
    /// decaying all activities by `vsids_decay` every conflict.
    pub vsids_decay: f32,

    /// Multiplicative decay for clause activities, used to prioritize recently useful lemmas
    /// during reduction.
    pub clause_activity_decay: f32,

    /// Restart trigger factor `X`: a restart is due once `recent_lbd_avg * X > global_lbd_avg`.
    pub restart_lbd_factor: f32,

    /// Window size for the recent (short-term) LBD moving average.
    pub recent_lbd_window: usize,

    /// Conflicts until the first database reduction.
    pub reduction_base_interval: u64,

    /// Additive growth of the reduction interval after each reduction.
    pub reduction_interval_increment: u64,

    /// Number of most-recently-added lemmas exempted from reduction.
    pub reduction_keep_known_good: usize,

    /// Lemma minimization only runs binary self-subsumption when the lemma is no larger than
    /// this.
    pub minimize_size_bound: usize,

    /// Lemma minimization only runs binary self-subsumption when the lemma's LBD is no larger
    /// than this.
    pub minimize_lbd_bound: usize,

    /// Maximum number of current-level reason clauses to recompute the LBD of right before a
    /// backjump.
    pub max_lbd_updates_on_backtrack: usize,

    /// Number of conflicts between polls of the stop flag.
    pub check_stop_interval: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            vsids_decay: 0.8,
            clause_activity_decay: 0.999,
            restart_lbd_factor: 0.8,
            recent_lbd_window: 50,
            reduction_base_interval: 2000,
            reduction_interval_increment: 1300,
            reduction_keep_known_good: 0,
            minimize_size_bound: 30,
            minimize_lbd_bound: 6,
            max_lbd_updates_on_backtrack: 32,
            check_stop_interval: 8192,
        }
    }
}

/// A partial override of a [`SolverConfig`].
///
/// Every field defaults to `None`, meaning "keep the current value." Used by the CLI and by
/// library callers who only want to tune a handful of parameters.
#[derive(Clone, Debug, Default)]
pub struct SolverConfigUpdate {
    pub vsids_decay: Option<f32>,
    pub clause_activity_decay: Option<f32>,
    pub restart_lbd_factor: Option<f32>,
    pub recent_lbd_window: Option<usize>,
    pub reduction_base_interval: Option<u64>,
    pub reduction_interval_increment: Option<u64>,
    pub reduction_keep_known_good: Option<usize>,
    pub minimize_size_bound: Option<usize>,
    pub minimize_lbd_bound: Option<usize>,
    pub max_lbd_updates_on_backtrack: Option<usize>,
    pub check_stop_interval: Option<u64>,
}

impl SolverConfigUpdate {
    /// Applies every `Some` field onto `config`, leaving the rest untouched.
    pub fn apply(&self, config: &mut SolverConfig) {
        macro_rules! apply_field {
            ($field:ident) => {
                if let Some(value) = self.$field {
                    config.$field = value;
                }
            };
        }

        apply_field!(vsids_decay);
        apply_field!(clause_activity_decay);
        apply_field!(restart_lbd_factor);
        apply_field!(recent_lbd_window);
        apply_field!(reduction_base_interval);
        apply_field!(reduction_interval_increment);
        apply_field!(reduction_keep_known_good);
        apply_field!(minimize_size_bound);
        apply_field!(minimize_lbd_bound);
        apply_field!(max_lbd_updates_on_backtrack);
        apply_field!(check_stop_interval);
    }

    /// Sets a single field by its kebab-case CLI name, parsing `value` into the field's type.
    ///
    /// Used to apply unrecognized `--name=value` command line options to the backend.
    pub fn set_by_name(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        macro_rules! parse_field {
            ($name:literal, $field:ident) => {
                if key == $name {
                    self.$field = Some(value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_owned(),
                        value: value.to_owned(),
                    })?);
                    return Ok(());
                }
            };
        }

        parse_field!("vsids-decay", vsids_decay);
        parse_field!("clause-activity-decay", clause_activity_decay);
        parse_field!("restart-lbd-factor", restart_lbd_factor);
        parse_field!("recent-lbd-window", recent_lbd_window);
        parse_field!("reduction-base-interval", reduction_base_interval);
        parse_field!("reduction-interval-increment", reduction_interval_increment);
        parse_field!("reduction-keep-known-good", reduction_keep_known_good);
        parse_field!("minimize-size-bound", minimize_size_bound);
        parse_field!("minimize-lbd-bound", minimize_lbd_bound);
        parse_field!("max-lbd-updates-on-backtrack", max_lbd_updates_on_backtrack);
        parse_field!("check-stop-interval", check_stop_interval);

        Err(ConfigError::UnknownOption(key.to_owned()))
    }
}

/// An error applying a single named config option.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown config option '{0}'")]
    UnknownOption(String),
    #[error("invalid value '{value}' for config option '{key}'")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_only_touches_set_fields() {
        let mut config = SolverConfig::default();
        let baseline_decay = config.clause_activity_decay;

        let update = SolverConfigUpdate {
            vsids_decay: Some(0.5),
            ..Default::default()
        };
        update.apply(&mut config);

        assert_eq!(config.vsids_decay, 0.5);
        assert_eq!(config.clause_activity_decay, baseline_decay);
    }

    #[test]
    fn set_by_name_parses_known_options() {
        let mut update = SolverConfigUpdate::default();
        update.set_by_name("recent-lbd-window", "100").unwrap();
        assert_eq!(update.recent_lbd_window, Some(100));
    }

    #[test]
    fn set_by_name_rejects_unknown_option() {
        let mut update = SolverConfigUpdate::default();
        assert!(update.set_by_name("not-a-real-option", "1").is_err());
    }

    #[test]
    fn set_by_name_rejects_invalid_value() {
        let mut update = SolverConfigUpdate::default();
        assert!(update.set_by_name("vsids-decay", "not-a-float").is_err());
    }
}
