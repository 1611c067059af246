//! Belief state — scalar probabilistic belief about one hidden binary variable
//!
//! The belief is a single probability `p` that the hidden world state is
//! favorable (e.g. the door is unlocked). Confirmatory observations move it
//! toward — but never exactly to — 0 or 1, preserving residual uncertainty
//! for future reasoning. The targets are configuration, not derived values.

use crate::config::BeliefConfig;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// An observation token returned by the oracle after executing an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observation {
    /// Evidence that the hidden state is favorable
    Confirming,
    /// Evidence that the hidden state is unfavorable
    Disconfirming,
    /// No usable evidence; belief is unchanged
    Ambiguous,
}

impl std::fmt::Display for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirming => write!(f, "confirming"),
            Self::Disconfirming => write!(f, "disconfirming"),
            Self::Ambiguous => write!(f, "ambiguous"),
        }
    }
}

/// Scalar belief that the hidden binary state is favorable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Belief {
    p: f64,
}

impl Belief {
    /// Create a belief from a prior probability. Fails fast when the prior
    /// is outside [0, 1] or not finite.
    pub fn new(prior: f64) -> CoreResult<Self> {
        if !prior.is_finite() || !(0.0..=1.0).contains(&prior) {
            return Err(CoreError::BeliefOutOfRange { value: prior });
        }
        Ok(Self { p: prior })
    }

    /// Current probability estimate
    pub fn probability(&self) -> f64 {
        self.p
    }

    /// Binary entropy of the current belief, in bits
    pub fn entropy(&self) -> f64 {
        binary_entropy(self.p)
    }

    /// Update the belief from an observation token. Confirming observations
    /// jump to the configured confirm target (near 1, never exactly 1);
    /// disconfirming observations jump to the disconfirm target.
    pub fn update(&mut self, observation: Observation, targets: &BeliefConfig) {
        self.p = match observation {
            Observation::Confirming => targets.confirm_target,
            Observation::Disconfirming => targets.disconfirm_target,
            Observation::Ambiguous => self.p,
        };
    }
}

/// Standard binary entropy in bits: 0 at p = 0 and p = 1, maximal (1.0)
/// at p = 0.5.
pub fn binary_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    -(p * p.log2()) - ((1.0 - p) * (1.0 - p).log2())
}
