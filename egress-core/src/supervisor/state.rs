//! Critical states, agent-health snapshots, and directives
//!
//! A critical state is a judgment about the agent's current situation that
//! can reshape or replace normal action scoring. Exactly one is active per
//! step; it is recomputed from scratch every step and never persisted.

use crate::action::ActionKind;
use crate::config::ScoreWeights;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Supervisory override modes, totally ordered by priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalState {
    /// Circuit breaker tripped; terminal for the episode
    Escalation,
    /// Steps are running out relative to the remaining distance
    Scarcity,
    /// The agent is confused: belief entropy is high after the grace period
    Panic,
    /// Recent actions form a short repeating cycle
    Deadlock,
    /// The last observation was surprising
    Novelty,
    /// A winning streak with suspiciously low uncertainty
    Hubris,
    /// Normal operation; the scorer runs unmodified
    Flow,
}

impl CriticalState {
    /// Priority rank: higher wins when several predicates match.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Escalation => 6,
            Self::Scarcity => 5,
            Self::Panic => 4,
            Self::Deadlock => 3,
            Self::Novelty => 2,
            Self::Hubris => 1,
            Self::Flow => 0,
        }
    }
}

impl std::fmt::Display for CriticalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Escalation => write!(f, "escalation"),
            Self::Scarcity => write!(f, "scarcity"),
            Self::Panic => write!(f, "panic"),
            Self::Deadlock => write!(f, "deadlock"),
            Self::Novelty => write!(f, "novelty"),
            Self::Hubris => write!(f, "hubris"),
            Self::Flow => write!(f, "flow"),
        }
    }
}

/// Agent-health signals evaluated by the supervisory layer.
///
/// Rebuilt fresh from orchestrator state every step — never partially stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentHealthSnapshot {
    /// Current belief probability
    pub belief: f64,
    /// Binary entropy of the current belief
    pub entropy: f64,
    /// Names of the most recent actions, oldest first (bounded ring)
    pub recent_actions: VecDeque<String>,
    /// Steps left in the episode
    pub steps_remaining: u32,
    /// Steps already executed
    pub steps_taken: u32,
    /// Estimated number of actions to the goal
    pub distance_to_goal: f64,
    /// Recent rewards, oldest first (bounded ring)
    pub recent_rewards: VecDeque<f64>,
    /// |belief_after − belief_before| of the previous step
    pub last_prediction_error: f64,
    /// Set when the escalation guard has already tripped
    pub escalation_forced: bool,
}

/// Where a directive bonus lands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusTarget {
    /// A single candidate, by catalog index
    Index(usize),
    /// Every candidate of the given kind
    Kind(ActionKind),
}

/// A bounded score bonus applied by the active directive, exactly once
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateBonus {
    pub target: BonusTarget,
    pub amount: f64,
}

/// The reshaping instruction emitted by the active critical state for the
/// current step only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directive {
    /// Flow (or Escalation, which never scores): scorer runs unmodified
    None,
    /// Substitute weights and/or add a bounded bonus
    Reweight {
        weights: ScoreWeights,
        bonus: Option<CandidateBonus>,
    },
    /// Restrict selection to candidates of one kind (Hubris sanity check)
    ForceKind { kind: ActionKind },
    /// Override argmax entirely with one candidate (Deadlock recovery)
    ForceCandidate { index: usize },
}

/// Advisory prior for one action, supplied by an external memory collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorSignal {
    /// Action the signal refers to
    pub action: String,
    /// Historical success rate in [0, 1]
    pub success_rate: f64,
    /// The advisor considers this action historically failing
    pub veto: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_total_order() {
        let ordered = [
            CriticalState::Escalation,
            CriticalState::Scarcity,
            CriticalState::Panic,
            CriticalState::Deadlock,
            CriticalState::Novelty,
            CriticalState::Hubris,
            CriticalState::Flow,
        ];
        for pair in ordered.windows(2) {
            assert!(
                pair[0].priority() > pair[1].priority(),
                "{} must outrank {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&CriticalState::Deadlock).unwrap();
        assert_eq!(json, "\"deadlock\"");
        let back: CriticalState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CriticalState::Deadlock);
    }
}
