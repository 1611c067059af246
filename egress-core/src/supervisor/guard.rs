//! Escalation guard — circuit breaker over critical-state thrashing
//!
//! Counts qualifying critical-state triggers in trailing step windows and
//! sustained-divergence signals from the stability monitor. Crossing a
//! threshold trips the breaker, which forces `CriticalState::Escalation`
//! for the remainder of the episode: a terminal, not-retryable halt.
//!
//! Counters start empty per episode. Cross-episode leakage causing
//! premature halts is the documented failure mode per-episode construction
//! exists to prevent.

use crate::config::EscalationConfig;
use crate::supervisor::state::CriticalState;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::warn;

/// Why the circuit breaker tripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTrigger {
    /// Too many panic activations inside the trailing window
    RepeatedPanic { count: u32, window_steps: u32 },
    /// Too many deadlock activations inside the trailing window
    RepeatedDeadlock { count: u32, window_steps: u32 },
    /// The stability monitor reported sustained divergence
    SustainedDivergence { signals: u32 },
}

impl std::fmt::Display for EscalationTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RepeatedPanic { count, window_steps } => {
                write!(f, "{} panics within {} steps", count, window_steps)
            }
            Self::RepeatedDeadlock { count, window_steps } => {
                write!(f, "{} deadlocks within {} steps", count, window_steps)
            }
            Self::SustainedDivergence { signals } => {
                write!(f, "sustained divergence ({} signals)", signals)
            }
        }
    }
}

/// Circuit breaker over repeated critical-state triggers
#[derive(Debug)]
pub struct EscalationGuard {
    config: EscalationConfig,
    /// (step index, state) per recorded step
    events: VecDeque<(u32, CriticalState)>,
    divergence_signals: u32,
    tripped: Option<EscalationTrigger>,
}

impl EscalationGuard {
    /// Fresh guard for one episode; all counters zeroed.
    pub fn new(config: EscalationConfig) -> Self {
        Self {
            config,
            events: VecDeque::new(),
            divergence_signals: 0,
            tripped: None,
        }
    }

    /// Whether the breaker has tripped. Once tripped it stays tripped for
    /// the remainder of the episode.
    pub fn is_tripped(&self) -> bool {
        self.tripped.is_some()
    }

    /// The trigger that tripped the breaker, if any
    pub fn trigger(&self) -> Option<&EscalationTrigger> {
        self.tripped.as_ref()
    }

    /// Record the resolved critical state for a step and re-evaluate the
    /// trip conditions. Fires on exactly the N-th qualifying trigger inside
    /// the configured trailing window.
    pub fn record_state(&mut self, step: u32, state: CriticalState) {
        if self.tripped.is_some() {
            return;
        }
        self.events.push_back((step, state));
        // Keep only what the widest trailing window can see.
        let widest = self
            .config
            .panic_window_steps
            .max(self.config.deadlock_window_steps);
        while let Some(&(s, _)) = self.events.front() {
            if step.saturating_sub(s) >= widest {
                self.events.pop_front();
            } else {
                break;
            }
        }

        let panics = self.count_in_window(step, CriticalState::Panic, self.config.panic_window_steps);
        if panics >= self.config.panic_trigger_threshold {
            self.trip(EscalationTrigger::RepeatedPanic {
                count: panics,
                window_steps: self.config.panic_window_steps,
            });
            return;
        }

        let deadlocks = self.count_in_window(
            step,
            CriticalState::Deadlock,
            self.config.deadlock_window_steps,
        );
        if deadlocks >= self.config.deadlock_trigger_threshold {
            self.trip(EscalationTrigger::RepeatedDeadlock {
                count: deadlocks,
                window_steps: self.config.deadlock_window_steps,
            });
        }
    }

    /// Record a sustained-divergence signal from the stability monitor.
    pub fn record_divergence(&mut self) {
        if self.tripped.is_some() {
            return;
        }
        self.divergence_signals += 1;
        if self.divergence_signals >= self.config.divergence_signal_threshold {
            self.trip(EscalationTrigger::SustainedDivergence {
                signals: self.divergence_signals,
            });
        }
    }

    fn count_in_window(&self, now: u32, state: CriticalState, window: u32) -> u32 {
        self.events
            .iter()
            .filter(|(step, s)| *s == state && now.saturating_sub(*step) < window)
            .count() as u32
    }

    fn trip(&mut self, trigger: EscalationTrigger) {
        warn!(%trigger, "escalation guard tripped");
        self.tripped = Some(trigger);
    }
}
