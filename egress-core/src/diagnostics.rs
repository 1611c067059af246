//! Decision-shape diagnostics — a purely observational overlay
//!
//! Computed strictly after a step's decision is finalized, from a shared
//! reference to the shaped scores. It returns a fresh value and mutates
//! nothing, so it is architecturally incapable of influencing candidate
//! selection — provable by construction, not by convention.

use crate::scoring::ScoredCandidate;
use serde::{Deserialize, Serialize};

/// Geometric summary of one step's score landscape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionShape {
    /// Gap between the best and second-best shaped scores
    pub winner_margin: f64,
    /// Gap between the best and worst shaped scores
    pub score_spread: f64,
    /// Margin normalized by spread: 1.0 = clear winner, 0.0 = near tie
    pub decisiveness: f64,
}

impl DecisionShape {
    /// Summarize a finalized score vector. `None` for a single-candidate
    /// catalog, where shape carries no information.
    pub fn from_scores(scored: &[ScoredCandidate]) -> Option<Self> {
        if scored.len() < 2 {
            return None;
        }
        let mut values: Vec<f64> = scored.iter().map(|s| s.shaped).collect();
        values.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        let winner_margin = values[0] - values[1];
        let score_spread = values[0] - values[values.len() - 1];
        let decisiveness = if score_spread > f64::EPSILON {
            winner_margin / score_spread
        } else {
            0.0
        };
        Some(Self {
            winner_margin,
            score_spread,
            decisiveness,
        })
    }
}
