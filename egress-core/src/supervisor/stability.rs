//! Stability monitor — sliding-window divergence detection
//!
//! Tracks a composite scalar of agent-health signals and watches its trend
//! over a bounded FIFO window. A sustained non-decreasing trend beyond the
//! tolerance means the agent is getting worse, not better, and the
//! escalation guard is signaled.
//!
//! The window is owned by exactly one episode and starts empty; carrying
//! history from a prior episode into a new one is a correctness bug, which
//! per-episode construction prevents structurally.

use crate::config::StabilityConfig;
use crate::supervisor::state::AgentHealthSnapshot;
use std::collections::VecDeque;
use tracing::debug;

/// Sliding-window trend detector over a composite health metric
#[derive(Debug)]
pub struct StabilityMonitor {
    config: StabilityConfig,
    window: VecDeque<f64>,
    consecutive_diverging: u32,
    horizon: f64,
}

impl StabilityMonitor {
    /// Fresh monitor for one episode. `horizon` is the episode's step
    /// budget, used to normalize distance-to-goal.
    pub fn new(config: StabilityConfig, horizon: u32) -> Self {
        Self {
            config,
            window: VecDeque::with_capacity(config.window),
            consecutive_diverging: 0,
            horizon: horizon.max(1) as f64,
        }
    }

    /// Composite metric: weighted entropy, normalized remaining distance,
    /// and stress (fraction of recent rewards that are negative).
    fn composite(&self, snapshot: &AgentHealthSnapshot) -> f64 {
        let stress = if snapshot.recent_rewards.is_empty() {
            0.0
        } else {
            let negative = snapshot.recent_rewards.iter().filter(|&&r| r < 0.0).count();
            negative as f64 / snapshot.recent_rewards.len() as f64
        };
        self.config.entropy_weight * snapshot.entropy
            + self.config.distance_weight * (snapshot.distance_to_goal / self.horizon)
            + self.config.stress_weight * stress
    }

    /// Recompute the composite for this step and push it into the window
    /// (oldest value evicted at capacity). Returns the composite value.
    pub fn observe(&mut self, snapshot: &AgentHealthSnapshot) -> f64 {
        let value = self.composite(snapshot);
        if self.window.len() == self.config.window {
            self.window.pop_front();
        }
        self.window.push_back(value);

        if self.is_diverging() {
            self.consecutive_diverging += 1;
            debug!(
                value,
                consecutive = self.consecutive_diverging,
                "stability trend diverging"
            );
        } else {
            self.consecutive_diverging = 0;
        }
        value
    }

    /// True when the window is full, every step-to-step delta is at worst
    /// tolerance noise, and the total rise exceeds the tolerance.
    pub fn is_diverging(&self) -> bool {
        if self.window.len() < self.config.window {
            return false;
        }
        let values: Vec<f64> = self.window.iter().copied().collect();
        let monotone = values
            .windows(2)
            .all(|pair| pair[1] - pair[0] >= -self.config.tolerance);
        monotone && values[values.len() - 1] - values[0] > self.config.tolerance
    }

    /// Mirror of [`is_diverging`](Self::is_diverging): a non-increasing
    /// trend with a total fall beyond the tolerance.
    pub fn is_stable(&self) -> bool {
        if self.window.len() < self.config.window {
            return false;
        }
        let values: Vec<f64> = self.window.iter().copied().collect();
        let monotone = values
            .windows(2)
            .all(|pair| pair[1] - pair[0] <= self.config.tolerance);
        monotone && values[0] - values[values.len() - 1] > self.config.tolerance
    }

    /// True when divergence has persisted for the configured number of
    /// consecutive observations; the caller forwards this to the guard.
    pub fn divergence_signal(&self) -> bool {
        self.consecutive_diverging >= self.config.patience
    }

    /// Number of samples currently in the window
    pub fn window_len(&self) -> usize {
        self.window.len()
    }
}
