//! Action candidates — the catalog the scorer chooses from
//!
//! Candidates are supplied by an external catalog and are immutable for the
//! duration of an episode. The catalog ordering is meaningful: ties are
//! broken by lowest index, so selection is deterministic.

use crate::belief::binary_entropy;
use serde::{Deserialize, Serialize};

/// Whether an action gathers information or acts on the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Information-gathering action (no direct goal progress)
    Sense,
    /// Goal-directed action
    Act,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sense => write!(f, "sense"),
            Self::Act => write!(f, "act"),
        }
    }
}

/// Predicted payoff of a candidate as a function of the current belief
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueModel {
    /// No goal value; the candidate exists to reduce uncertainty
    Probe,
    /// Payoff scales with the belief that the hidden state is favorable
    BeliefScaled { payoff: f64 },
    /// Payoff scales with the belief that the hidden state is unfavorable
    InverseBeliefScaled { payoff: f64 },
    /// Payoff independent of belief (robust to being wrong)
    Fixed { payoff: f64 },
}

/// One candidate action from the external catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCandidate {
    /// Unique name within the catalog
    pub name: String,
    /// Sense or act
    pub kind: ActionKind,
    /// Execution cost (time, effort)
    pub cost: f64,
    /// Predicted payoff model
    pub value_model: ValueModel,
}

impl ActionCandidate {
    /// Convenience constructor
    pub fn new(name: impl Into<String>, kind: ActionKind, cost: f64, value_model: ValueModel) -> Self {
        Self {
            name: name.into(),
            kind,
            cost,
            value_model,
        }
    }

    /// Predicted goal value at the given belief
    pub fn goal_value(&self, belief: f64) -> f64 {
        match self.value_model {
            ValueModel::Probe => 0.0,
            ValueModel::BeliefScaled { payoff } => payoff * belief,
            ValueModel::InverseBeliefScaled { payoff } => payoff * (1.0 - belief),
            ValueModel::Fixed { payoff } => payoff,
        }
    }

    /// Predicted information gain at the given belief. Sense actions are
    /// worth the remaining uncertainty; act actions gather nothing.
    pub fn info_gain(&self, belief: f64) -> f64 {
        match self.kind {
            ActionKind::Sense => binary_entropy(belief),
            ActionKind::Act => 0.0,
        }
    }

    /// How much the predicted goal value swings across the belief range.
    /// Low sensitivity means the candidate is robust to a wrong belief.
    pub fn belief_sensitivity(&self) -> f64 {
        (self.goal_value(0.95) - self.goal_value(0.05)).abs()
    }
}

impl std::fmt::Display for ActionCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}, cost {:.2})", self.name, self.kind, self.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe() -> ActionCandidate {
        ActionCandidate::new("peek", ActionKind::Sense, 1.0, ValueModel::Probe)
    }

    #[test]
    fn test_goal_value_models() {
        let scaled = ActionCandidate::new(
            "try_door",
            ActionKind::Act,
            1.5,
            ValueModel::BeliefScaled { payoff: 1.0 },
        );
        assert_eq!(scaled.goal_value(0.5), 0.5);
        assert_eq!(scaled.goal_value(0.9), 0.9);

        let inverse = ActionCandidate::new(
            "pick_lock",
            ActionKind::Act,
            1.5,
            ValueModel::InverseBeliefScaled { payoff: 1.0 },
        );
        assert_eq!(inverse.goal_value(0.1), 0.9);

        let fixed = ActionCandidate::new(
            "climb_window",
            ActionKind::Act,
            2.0,
            ValueModel::Fixed { payoff: 0.8 },
        );
        assert_eq!(fixed.goal_value(0.0), 0.8);
        assert_eq!(fixed.goal_value(1.0), 0.8);

        assert_eq!(probe().goal_value(0.5), 0.0);
    }

    #[test]
    fn test_info_gain_only_for_sense() {
        let p = probe();
        assert!((p.info_gain(0.5) - 1.0).abs() < 1e-12);
        assert_eq!(p.info_gain(1.0), 0.0);

        let act = ActionCandidate::new(
            "try_door",
            ActionKind::Act,
            1.5,
            ValueModel::BeliefScaled { payoff: 1.0 },
        );
        assert_eq!(act.info_gain(0.5), 0.0);
    }

    #[test]
    fn test_belief_sensitivity() {
        let scaled = ActionCandidate::new(
            "try_door",
            ActionKind::Act,
            1.5,
            ValueModel::BeliefScaled { payoff: 1.0 },
        );
        let fixed = ActionCandidate::new(
            "climb_window",
            ActionKind::Act,
            2.0,
            ValueModel::Fixed { payoff: 0.8 },
        );
        assert!(scaled.belief_sensitivity() > fixed.belief_sensitivity());
        assert_eq!(fixed.belief_sensitivity(), 0.0);
        assert_eq!(probe().belief_sensitivity(), 0.0);
    }
}
