//! Per-step records and episode reports

use crate::belief::Observation;
use crate::diagnostics::DecisionShape;
use crate::supervisor::guard::EscalationTrigger;
use crate::supervisor::state::CriticalState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Record emitted after each executed step, for external persistence.
/// The core never blocks on or retries this write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-indexed step number
    pub step_index: u32,
    /// Name of the executed action
    pub action_name: String,
    /// Observation returned by the oracle
    pub observation: Observation,
    /// Belief before the update
    pub belief_before: f64,
    /// Belief after the update
    pub belief_after: f64,
    /// Critical state active during this step
    pub critical_state: CriticalState,
    /// Shaped score of the executed action
    pub score: f64,
    /// Read-only decision-shape diagnostic, computed post-selection
    pub shape: Option<DecisionShape>,
    /// When the step finished
    pub timestamp: DateTime<Utc>,
}

/// Terminal result of one episode. The three outcomes are distinct and are
/// never collapsed into a single failure signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    /// The goal was reached
    Escaped,
    /// The step budget ran out
    Exhausted,
    /// The escalation guard tripped; terminal, not retryable
    Escalated { trigger: EscalationTrigger },
}

impl std::fmt::Display for EpisodeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Escaped => write!(f, "escaped"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Escalated { trigger } => write!(f, "escalated ({})", trigger),
        }
    }
}

/// Summary returned to the caller when the episode ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    /// Unique id for this episode
    pub episode_id: Uuid,
    /// How the episode ended
    pub outcome: EpisodeOutcome,
    /// Steps that actually executed an action
    pub steps_taken: u32,
    /// Critical state resolved at every step, in order — the diagnostic
    /// trail that led to an escalation, when one occurred
    pub state_trail: Vec<CriticalState>,
    /// Belief at episode end
    pub final_belief: f64,
    /// When the episode started
    pub started_at: DateTime<Utc>,
}
