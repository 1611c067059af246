//! Decision core configuration
//!
//! Every numeric threshold used by the decision logic lives here — nothing
//! is hardcoded inside the scorer or the supervisory layer. Defaults are
//! documented on each field; whether these should eventually be learned
//! rather than fixed is an open question, so they stay swappable.
//!
//! Config files must be complete: a TOML file missing a threshold fails at
//! load time rather than silently falling back to a default.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Multi-objective scoring weights: alpha·goal + beta·info − gamma·cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight on predicted goal value
    pub alpha: f64,
    /// Weight on predicted information gain
    pub beta: f64,
    /// Weight on action cost
    pub gamma: f64,
}

impl Default for ScoreWeights {
    /// Defaults: alpha 1.0, beta 1.0, gamma 0.2
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
            gamma: 0.2,
        }
    }
}

/// Belief prior and observation jump targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeliefConfig {
    /// Prior probability at episode start (default 0.5)
    pub prior: f64,
    /// Belief after a confirming observation (default 0.9; never 1.0 —
    /// residual uncertainty is kept deliberately)
    pub confirm_target: f64,
    /// Belief after a disconfirming observation (default 0.1; never 0.0)
    pub disconfirm_target: f64,
}

impl Default for BeliefConfig {
    fn default() -> Self {
        Self {
            prior: 0.5,
            confirm_target: 0.9,
            disconfirm_target: 0.1,
        }
    }
}

/// Sliding-window stability tracking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Window size W for the composite metric (default 6)
    pub window: usize,
    /// Trend tolerance: rises smaller than this are noise (default 0.05)
    pub tolerance: f64,
    /// Consecutive diverging checks before signaling the guard (default 2)
    pub patience: u32,
    /// Composite weight on entropy (default 1.0)
    pub entropy_weight: f64,
    /// Composite weight on normalized distance-to-goal (default 1.0)
    pub distance_weight: f64,
    /// Composite weight on stress (default 1.0)
    pub stress_weight: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            window: 6,
            tolerance: 0.05,
            patience: 2,
            entropy_weight: 1.0,
            distance_weight: 1.0,
            stress_weight: 1.0,
        }
    }
}

/// Circuit-breaker thresholds for the escalation guard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Panic triggers inside the trailing window that trip the breaker
    /// (default 3)
    pub panic_trigger_threshold: u32,
    /// Trailing window, in steps, for counting panic triggers (default 5)
    pub panic_window_steps: u32,
    /// Deadlock triggers inside the trailing window that trip the breaker
    /// (default 2)
    pub deadlock_trigger_threshold: u32,
    /// Trailing window, in steps, for counting deadlock triggers (default 10)
    pub deadlock_window_steps: u32,
    /// Sustained-divergence signals that trip the breaker (default 1)
    pub divergence_signal_threshold: u32,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            panic_trigger_threshold: 3,
            panic_window_steps: 5,
            deadlock_trigger_threshold: 2,
            deadlock_window_steps: 10,
            divergence_signal_threshold: 1,
        }
    }
}

/// Full decision-core configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Base scoring weights
    pub weights: ScoreWeights,
    /// Belief prior and jump targets
    pub belief: BeliefConfig,
    /// Entropy above which the agent is considered confused (default 0.9)
    pub panic_threshold: f64,
    /// Steps that must have executed before panic can fire (default 1);
    /// maximal uncertainty at episode start is expected, not alarming
    pub panic_grace_steps: u32,
    /// Scarcity fires when steps_remaining < distance × factor (default 1.2)
    pub scarcity_factor: f64,
    /// Prediction error above which the agent is surprised (default 0.5)
    pub novelty_threshold: f64,
    /// Entropy below which the agent counts as confident (default 0.3)
    pub low_entropy_threshold: f64,
    /// Consecutive positive rewards that suggest overconfidence (default 3)
    pub hubris_streak: u32,
    /// History length examined for repeating action cycles (default 4)
    pub deadlock_window: usize,
    /// Contrary readings required before a non-Flow state reverts (default 2)
    pub hysteresis_evidence: u32,
    /// Ring-buffer capacity for recent actions and rewards (default 10)
    pub history_capacity: usize,
    /// Bounded bonus a directive may add to a candidate's score (default 0.5)
    pub directive_bonus: f64,
    /// Stability-monitor settings
    pub stability: StabilityConfig,
    /// Escalation-guard settings
    pub escalation: EscalationConfig,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            belief: BeliefConfig::default(),
            panic_threshold: 0.9,
            panic_grace_steps: 1,
            scarcity_factor: 1.2,
            novelty_threshold: 0.5,
            low_entropy_threshold: 0.3,
            hubris_streak: 3,
            deadlock_window: 4,
            hysteresis_evidence: 2,
            history_capacity: 10,
            directive_bonus: 0.5,
            stability: StabilityConfig::default(),
            escalation: EscalationConfig::default(),
        }
    }
}

impl DecisionConfig {
    /// Load a complete configuration from a TOML file. Every field is
    /// required; a missing threshold is a configuration error.
    pub fn from_toml_path(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| CoreError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate ranges. Called by the orchestrator at construction, so a
    /// bad config fails before any decision is made.
    pub fn validate(&self) -> CoreResult<()> {
        fn probability(field: &str, value: f64) -> CoreResult<()> {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(CoreError::invalid_config(
                    field,
                    value,
                    "must be a probability in [0, 1]",
                ));
            }
            Ok(())
        }
        fn non_negative(field: &str, value: f64) -> CoreResult<()> {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::invalid_config(field, value, "must be >= 0"));
            }
            Ok(())
        }
        fn positive(field: &str, value: f64) -> CoreResult<()> {
            if !value.is_finite() || value <= 0.0 {
                return Err(CoreError::invalid_config(field, value, "must be > 0"));
            }
            Ok(())
        }

        non_negative("weights.alpha", self.weights.alpha)?;
        non_negative("weights.beta", self.weights.beta)?;
        non_negative("weights.gamma", self.weights.gamma)?;

        probability("belief.prior", self.belief.prior)?;
        probability("belief.confirm_target", self.belief.confirm_target)?;
        probability("belief.disconfirm_target", self.belief.disconfirm_target)?;
        if self.belief.confirm_target >= 1.0 || self.belief.disconfirm_target <= 0.0 {
            return Err(CoreError::invalid_config(
                "belief targets",
                format!(
                    "confirm={}, disconfirm={}",
                    self.belief.confirm_target, self.belief.disconfirm_target
                ),
                "targets must keep residual uncertainty (0 < target < 1)",
            ));
        }

        positive("panic_threshold", self.panic_threshold)?;
        positive("scarcity_factor", self.scarcity_factor)?;
        positive("novelty_threshold", self.novelty_threshold)?;
        probability("low_entropy_threshold", self.low_entropy_threshold)?;
        non_negative("directive_bonus", self.directive_bonus)?;
        positive("stability.tolerance", self.stability.tolerance)?;

        if self.hubris_streak == 0 {
            return Err(CoreError::invalid_config("hubris_streak", 0, "must be >= 1"));
        }
        if self.deadlock_window < 4 {
            return Err(CoreError::invalid_config(
                "deadlock_window",
                self.deadlock_window,
                "cycle detection needs at least 4 actions",
            ));
        }
        if self.history_capacity < self.deadlock_window {
            return Err(CoreError::invalid_config(
                "history_capacity",
                self.history_capacity,
                "must cover the deadlock window",
            ));
        }
        if self.stability.window < 2 {
            return Err(CoreError::invalid_config(
                "stability.window",
                self.stability.window,
                "trend detection needs at least 2 samples",
            ));
        }
        if self.stability.patience == 0 {
            return Err(CoreError::invalid_config(
                "stability.patience",
                0,
                "must be >= 1",
            ));
        }

        let esc = &self.escalation;
        for (field, value) in [
            ("escalation.panic_trigger_threshold", esc.panic_trigger_threshold),
            ("escalation.panic_window_steps", esc.panic_window_steps),
            (
                "escalation.deadlock_trigger_threshold",
                esc.deadlock_trigger_threshold,
            ),
            ("escalation.deadlock_window_steps", esc.deadlock_window_steps),
            (
                "escalation.divergence_signal_threshold",
                esc.divergence_signal_threshold,
            ),
        ] {
            if value == 0 {
                return Err(CoreError::invalid_config(field, 0, "must be >= 1"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        DecisionConfig::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_out_of_range_weights() {
        let mut config = DecisionConfig::default();
        config.weights.gamma = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_certainty_targets() {
        let mut config = DecisionConfig::default();
        config.belief.confirm_target = 1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("residual uncertainty"));
    }

    #[test]
    fn test_rejects_zero_escalation_thresholds() {
        let mut config = DecisionConfig::default();
        config.escalation.panic_trigger_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = DecisionConfig::default();
        let serialized = toml::to_string(&config).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serialized.as_bytes()).unwrap();

        let loaded = DecisionConfig::from_toml_path(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_threshold_fails_at_load() {
        // A file with only the weights section must be rejected, not
        // silently defaulted.
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[weights]\nalpha = 1.0\nbeta = 1.0\ngamma = 0.2\n")
            .unwrap();

        let err = DecisionConfig::from_toml_path(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse { .. }));
    }

    #[test]
    fn test_missing_file_fails() {
        let err = DecisionConfig::from_toml_path("/nonexistent/egress.toml").unwrap_err();
        assert!(matches!(err, CoreError::ConfigIo { .. }));
    }
}
