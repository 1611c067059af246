//! Action scorer — multi-objective utility with directive reshaping
//!
//! `score = alpha·goal_value + beta·info_gain − gamma·cost`, reshaped
//! exactly once by the active directive (weight substitution and/or a
//! bounded bonus). Scoring is a pure function of its inputs: identical
//! `(catalog, belief, weights, directive)` always yields identical scores.
//!
//! Selection is argmax over shaped scores with ties broken by catalog
//! order (lowest index) — never random. Force directives from the
//! supervisory layer override argmax entirely.

use crate::action::ActionCandidate;
use crate::config::ScoreWeights;
use crate::error::{CoreError, CoreResult};
use crate::supervisor::state::{BonusTarget, Directive};
use serde::{Deserialize, Serialize};

/// A candidate with its base and directive-shaped scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// Catalog index
    pub index: usize,
    /// Candidate name
    pub name: String,
    /// Score under the base weights, before any directive reshaping
    pub base: f64,
    /// Final score after the directive was applied exactly once
    pub shaped: f64,
}

/// Deterministic multi-objective scorer
pub struct ActionScorer;

impl ActionScorer {
    fn raw_score(candidate: &ActionCandidate, belief: f64, weights: &ScoreWeights) -> f64 {
        weights.alpha * candidate.goal_value(belief)
            + weights.beta * candidate.info_gain(belief)
            - weights.gamma * candidate.cost
    }

    /// Score every candidate. The directive's weight substitution and bonus
    /// are applied here and nowhere else, so a boost can never compound.
    pub fn score_all(
        catalog: &[ActionCandidate],
        belief: f64,
        weights: &ScoreWeights,
        directive: &Directive,
    ) -> CoreResult<Vec<ScoredCandidate>> {
        if catalog.is_empty() {
            return Err(CoreError::EmptyCatalog);
        }

        let (active_weights, bonus) = match directive {
            Directive::Reweight {
                weights: substituted,
                bonus,
            } => (substituted, *bonus),
            _ => (weights, None),
        };

        Ok(catalog
            .iter()
            .enumerate()
            .map(|(index, candidate)| {
                let base = Self::raw_score(candidate, belief, weights);
                let mut shaped = Self::raw_score(candidate, belief, active_weights);
                if let Some(bonus) = bonus {
                    let applies = match bonus.target {
                        BonusTarget::Index(i) => i == index,
                        BonusTarget::Kind(kind) => candidate.kind == kind,
                    };
                    if applies {
                        shaped += bonus.amount;
                    }
                }
                ScoredCandidate {
                    index,
                    name: candidate.name.clone(),
                    base,
                    shaped,
                }
            })
            .collect())
    }

    /// Pick the candidate index for this step. Force directives replace
    /// argmax; otherwise the highest shaped score wins, first index on ties.
    pub fn select(
        scored: &[ScoredCandidate],
        catalog: &[ActionCandidate],
        directive: &Directive,
    ) -> CoreResult<usize> {
        if scored.is_empty() {
            return Err(CoreError::EmptyCatalog);
        }
        match directive {
            Directive::ForceCandidate { index } => Ok(*index),
            // A forced kind with no members is an empty candidate set; the
            // monitor degrades such directives before they reach selection.
            Directive::ForceKind { kind } => Self::argmax(
                scored
                    .iter()
                    .filter(|s| catalog[s.index].kind == *kind),
            )
            .ok_or(CoreError::EmptyCatalog),
            _ => Self::argmax(scored.iter()).ok_or(CoreError::EmptyCatalog),
        }
    }

    fn argmax<'a>(scored: impl Iterator<Item = &'a ScoredCandidate>) -> Option<usize> {
        let mut best: Option<&ScoredCandidate> = None;
        for candidate in scored {
            match best {
                Some(current) if candidate.shaped <= current.shaped => {}
                _ => best = Some(candidate),
            }
        }
        best.map(|c| c.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionKind, ValueModel};
    use crate::supervisor::state::CandidateBonus;

    fn catalog() -> Vec<ActionCandidate> {
        vec![
            ActionCandidate::new("peek", ActionKind::Sense, 1.0, ValueModel::Probe),
            ActionCandidate::new(
                "try_door",
                ActionKind::Act,
                1.5,
                ValueModel::BeliefScaled { payoff: 1.0 },
            ),
            ActionCandidate::new(
                "climb_window",
                ActionKind::Act,
                2.0,
                ValueModel::Fixed { payoff: 0.8 },
            ),
        ]
    }

    #[test]
    fn test_empty_catalog_is_a_configuration_error() {
        let err = ActionScorer::score_all(&[], 0.5, &ScoreWeights::default(), &Directive::None)
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyCatalog));
    }

    #[test]
    fn test_scoring_is_pure() {
        let catalog = catalog();
        let weights = ScoreWeights::default();
        let directive = Directive::Reweight {
            weights: ScoreWeights {
                alpha: 2.0,
                beta: 0.5,
                gamma: 0.1,
            },
            bonus: Some(CandidateBonus {
                target: BonusTarget::Kind(ActionKind::Sense),
                amount: 0.5,
            }),
        };
        let first = ActionScorer::score_all(&catalog, 0.42, &weights, &directive).unwrap();
        let second = ActionScorer::score_all(&catalog, 0.42, &weights, &directive).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sense_wins_under_maximal_uncertainty() {
        let catalog = catalog();
        let scored =
            ActionScorer::score_all(&catalog, 0.5, &ScoreWeights::default(), &Directive::None)
                .unwrap();
        let chosen = ActionScorer::select(&scored, &catalog, &Directive::None).unwrap();
        assert_eq!(catalog[chosen].name, "peek");
    }

    #[test]
    fn test_goal_action_wins_once_confident() {
        let catalog = catalog();
        let scored =
            ActionScorer::score_all(&catalog, 0.9, &ScoreWeights::default(), &Directive::None)
                .unwrap();
        let chosen = ActionScorer::select(&scored, &catalog, &Directive::None).unwrap();
        assert_eq!(catalog[chosen].name, "try_door");
    }

    #[test]
    fn test_boost_applied_exactly_once() {
        let catalog = catalog();
        let weights = ScoreWeights::default();
        let bonus = 0.5;
        let directive = Directive::Reweight {
            weights,
            bonus: Some(CandidateBonus {
                target: BonusTarget::Index(2),
                amount: bonus,
            }),
        };
        let scored = ActionScorer::score_all(&catalog, 0.5, &weights, &directive).unwrap();
        // Same weights, so shaped differs from base by the bonus alone —
        // present exactly once on the target, absent everywhere else.
        assert!((scored[2].shaped - scored[2].base - bonus).abs() < 1e-12);
        assert_eq!(scored[0].shaped, scored[0].base);
        assert_eq!(scored[1].shaped, scored[1].base);
    }

    #[test]
    fn test_tie_breaks_by_catalog_order() {
        let tied = vec![
            ActionCandidate::new("first", ActionKind::Act, 1.0, ValueModel::Fixed { payoff: 0.5 }),
            ActionCandidate::new("second", ActionKind::Act, 1.0, ValueModel::Fixed { payoff: 0.5 }),
        ];
        let scored =
            ActionScorer::score_all(&tied, 0.5, &ScoreWeights::default(), &Directive::None)
                .unwrap();
        assert_eq!(scored[0].shaped, scored[1].shaped);
        let chosen = ActionScorer::select(&scored, &tied, &Directive::None).unwrap();
        assert_eq!(chosen, 0);
    }

    #[test]
    fn test_force_candidate_overrides_argmax() {
        let catalog = catalog();
        let directive = Directive::ForceCandidate { index: 2 };
        let scored =
            ActionScorer::score_all(&catalog, 0.5, &ScoreWeights::default(), &directive).unwrap();
        let chosen = ActionScorer::select(&scored, &catalog, &directive).unwrap();
        assert_eq!(chosen, 2, "forced candidate wins regardless of score");
    }

    #[test]
    fn test_force_kind_without_members_is_an_error() {
        let act_only = vec![ActionCandidate::new(
            "try_door",
            ActionKind::Act,
            1.5,
            ValueModel::BeliefScaled { payoff: 1.0 },
        )];
        let directive = Directive::ForceKind {
            kind: ActionKind::Sense,
        };
        let scored =
            ActionScorer::score_all(&act_only, 0.5, &ScoreWeights::default(), &directive).unwrap();
        let err = ActionScorer::select(&scored, &act_only, &directive).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCatalog));
    }

    #[test]
    fn test_force_kind_restricts_to_sense() {
        let catalog = catalog();
        let directive = Directive::ForceKind {
            kind: ActionKind::Sense,
        };
        // At high belief the act candidate would normally win.
        let scored =
            ActionScorer::score_all(&catalog, 0.95, &ScoreWeights::default(), &directive).unwrap();
        let chosen = ActionScorer::select(&scored, &catalog, &directive).unwrap();
        assert_eq!(catalog[chosen].name, "peek");
    }
}
