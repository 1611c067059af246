//! Critical-state monitor — a priority state machine over agent health
//!
//! Each step the monitor evaluates a fixed, ordered table of
//! `(state, predicate)` pairs top-to-bottom and resolves the first match,
//! else Flow. The priority contract is a structural property of the table,
//! not an accident of control-flow ordering.
//!
//! ```text
//! escalation   guard tripped — terminal, no directive
//! scarcity     steps_remaining < distance × factor
//! panic        entropy > threshold (after the grace period)
//! deadlock     recent actions alternate A,B,A,B
//! novelty      last prediction error > threshold
//! hubris       reward streak + suspiciously low entropy
//! flow         default — scorer runs unmodified
//! ```
//!
//! An advisory veto from an external memory collaborator may only promote
//! the resolved state toward Panic-like caution; it can never override
//! Scarcity or Escalation. Hysteresis prevents step-to-step jitter: upward
//! transitions are immediate, downward transitions need buffered contrary
//! evidence.

use crate::action::{ActionCandidate, ActionKind};
use crate::config::{DecisionConfig, ScoreWeights};
use crate::supervisor::state::{
    AdvisorSignal, AgentHealthSnapshot, BonusTarget, CandidateBonus, CriticalState, Directive,
};
use tracing::debug;

/// Outcome of one resolution pass
#[derive(Debug, Clone, PartialEq)]
pub struct StateResolution {
    /// State after advisor adjustment and hysteresis
    pub state: CriticalState,
    /// State the predicate table matched before adjustment
    pub raw_state: CriticalState,
    /// This step's fresh reading: after advisor adjustment, before
    /// hysteresis. The escalation guard counts these — a held state kept
    /// alive by hysteresis is residue, not a new trigger.
    pub detected_state: CriticalState,
    /// Reshaping instruction for this step's scoring
    pub directive: Directive,
}

type Predicate = fn(&DecisionConfig, &AgentHealthSnapshot) -> bool;

fn escalation_set(_config: &DecisionConfig, snapshot: &AgentHealthSnapshot) -> bool {
    snapshot.escalation_forced
}

fn scarcity_hit(config: &DecisionConfig, snapshot: &AgentHealthSnapshot) -> bool {
    (snapshot.steps_remaining as f64) < snapshot.distance_to_goal * config.scarcity_factor
}

fn panic_hit(config: &DecisionConfig, snapshot: &AgentHealthSnapshot) -> bool {
    snapshot.steps_taken >= config.panic_grace_steps && snapshot.entropy > config.panic_threshold
}

fn deadlock_hit(config: &DecisionConfig, snapshot: &AgentHealthSnapshot) -> bool {
    detects_alternating_cycle(&snapshot.recent_actions, config.deadlock_window)
}

fn novelty_hit(config: &DecisionConfig, snapshot: &AgentHealthSnapshot) -> bool {
    snapshot.last_prediction_error > config.novelty_threshold
}

fn hubris_hit(config: &DecisionConfig, snapshot: &AgentHealthSnapshot) -> bool {
    let streak = config.hubris_streak as usize;
    snapshot.recent_rewards.len() >= streak
        && snapshot
            .recent_rewards
            .iter()
            .rev()
            .take(streak)
            .all(|&r| r > 0.0)
        && snapshot.entropy < config.low_entropy_threshold
}

/// The priority contract: evaluated top-to-bottom, first match wins.
const RULES: &[(CriticalState, Predicate)] = &[
    (CriticalState::Escalation, escalation_set),
    (CriticalState::Scarcity, scarcity_hit),
    (CriticalState::Panic, panic_hit),
    (CriticalState::Deadlock, deadlock_hit),
    (CriticalState::Novelty, novelty_hit),
    (CriticalState::Hubris, hubris_hit),
];

/// True when the trailing `window` actions form a two-action alternation
/// (A,B,A,B with A ≠ B). `[A,B,C,D]` is not a cycle; neither is steady
/// repetition of one action.
fn detects_alternating_cycle(
    history: &std::collections::VecDeque<String>,
    window: usize,
) -> bool {
    if history.len() < window || window < 4 {
        return false;
    }
    let tail: Vec<&String> = history.iter().skip(history.len() - window).collect();
    for i in 2..window {
        if tail[i] != tail[i - 2] {
            return false;
        }
    }
    tail[window - 1] != tail[window - 2]
}

/// Resolves exactly one critical state per step and emits its directive
#[derive(Debug)]
pub struct CriticalStateMonitor {
    config: DecisionConfig,
    held: CriticalState,
    run_length: u32,
    contrary: u32,
    deadlock_cursor: usize,
}

impl CriticalStateMonitor {
    /// Fresh monitor for one episode. Constructed per episode, never shared.
    pub fn new(config: DecisionConfig) -> Self {
        Self {
            config,
            held: CriticalState::Flow,
            run_length: 0,
            contrary: 0,
            deadlock_cursor: 0,
        }
    }

    /// Currently held state (after hysteresis)
    pub fn held_state(&self) -> CriticalState {
        self.held
    }

    /// How many consecutive steps the held state has been active
    pub fn run_length(&self) -> u32 {
        self.run_length
    }

    /// Resolve the critical state for this step and build its directive.
    pub fn resolve(
        &mut self,
        snapshot: &AgentHealthSnapshot,
        catalog: &[ActionCandidate],
        advisor_signals: &[AdvisorSignal],
    ) -> StateResolution {
        let raw = RULES
            .iter()
            .find(|(_, predicate)| predicate(&self.config, snapshot))
            .map(|(state, _)| *state)
            .unwrap_or(CriticalState::Flow);

        let adjusted = self.apply_advisor(raw, advisor_signals);
        let state = self.apply_hysteresis(adjusted);

        if state != raw {
            debug!(%raw, %state, "critical state adjusted");
        }

        let directive = self.build_directive(state, snapshot, catalog);
        StateResolution {
            state,
            raw_state: raw,
            detected_state: adjusted,
            directive,
        }
    }

    /// An advisory veto may only escalate toward Panic-like caution; it
    /// never overrides Scarcity or Escalation.
    fn apply_advisor(&self, raw: CriticalState, signals: &[AdvisorSignal]) -> CriticalState {
        let vetoed = signals.iter().any(|s| s.veto);
        if vetoed && raw.priority() < CriticalState::Panic.priority() {
            debug!(%raw, "advisor veto promoted state to panic");
            CriticalState::Panic
        } else {
            raw
        }
    }

    /// Anti-oscillation: switching to a higher-priority state is immediate;
    /// dropping to a lower-priority state (including Flow) requires
    /// `hysteresis_evidence` consecutive contrary readings.
    fn apply_hysteresis(&mut self, incoming: CriticalState) -> CriticalState {
        if incoming == self.held {
            self.run_length += 1;
            self.contrary = 0;
            return self.held;
        }
        if incoming.priority() > self.held.priority() {
            self.held = incoming;
            self.run_length = 1;
            self.contrary = 0;
            return self.held;
        }
        self.contrary += 1;
        if self.contrary >= self.config.hysteresis_evidence {
            self.held = incoming;
            self.run_length = 1;
            self.contrary = 0;
        } else {
            self.run_length += 1;
        }
        self.held
    }

    /// Build the directive for the resolved state. A directive's boost is
    /// applied exactly once per step, in the scorer.
    fn build_directive(
        &mut self,
        state: CriticalState,
        snapshot: &AgentHealthSnapshot,
        catalog: &[ActionCandidate],
    ) -> Directive {
        match state {
            CriticalState::Flow | CriticalState::Escalation => Directive::None,
            CriticalState::Scarcity => self.scarcity_directive(snapshot, catalog),
            CriticalState::Panic => self.panic_directive(catalog),
            CriticalState::Deadlock => self.deadlock_directive(snapshot, catalog),
            CriticalState::Novelty => Directive::Reweight {
                weights: self.config.weights,
                bonus: Some(CandidateBonus {
                    target: BonusTarget::Kind(ActionKind::Sense),
                    amount: self.config.directive_bonus,
                }),
            },
            CriticalState::Hubris => self.hubris_directive(catalog),
        }
    }

    /// Scarcity: suppress exploratory scoring entirely and boost the single
    /// most goal-direct candidate at the current belief.
    fn scarcity_directive(
        &self,
        snapshot: &AgentHealthSnapshot,
        catalog: &[ActionCandidate],
    ) -> Directive {
        let most_direct = argmax_by(catalog, |c| c.goal_value(snapshot.belief));
        Directive::Reweight {
            weights: ScoreWeights {
                alpha: self.config.weights.alpha,
                beta: 0.0,
                gamma: self.config.weights.gamma,
            },
            bonus: most_direct.map(|index| CandidateBonus {
                target: BonusTarget::Index(index),
                amount: self.config.directive_bonus,
            }),
        }
    }

    /// Panic: de-emphasize cost and boost the candidate least sensitive to
    /// the belief being wrong.
    fn panic_directive(&self, catalog: &[ActionCandidate]) -> Directive {
        let most_robust = argmax_by(catalog, |c| -c.belief_sensitivity());
        Directive::Reweight {
            weights: ScoreWeights {
                alpha: self.config.weights.alpha,
                beta: self.config.weights.beta,
                gamma: self.config.weights.gamma * 0.5,
            },
            bonus: most_robust.map(|index| CandidateBonus {
                target: BonusTarget::Index(index),
                amount: self.config.directive_bonus,
            }),
        }
    }

    /// Deadlock: override argmax entirely. Force a candidate absent from
    /// the recent history, round-robin over the unused pool so repeated
    /// deadlocks vary the escape action deterministically.
    fn deadlock_directive(
        &mut self,
        snapshot: &AgentHealthSnapshot,
        catalog: &[ActionCandidate],
    ) -> Directive {
        let unused: Vec<usize> = catalog
            .iter()
            .enumerate()
            .filter(|(_, c)| !snapshot.recent_actions.iter().any(|a| *a == c.name))
            .map(|(i, _)| i)
            .collect();
        let pool: Vec<usize> = if unused.is_empty() {
            (0..catalog.len()).collect()
        } else {
            unused
        };
        let index = pool[self.deadlock_cursor % pool.len()];
        self.deadlock_cursor += 1;
        debug!(action = %catalog[index].name, "deadlock recovery forcing candidate");
        Directive::ForceCandidate { index }
    }

    /// Hubris: force a sense-kind candidate to sanity-check the belief.
    /// Degrades to no directive when the catalog has no sense candidate.
    fn hubris_directive(&self, catalog: &[ActionCandidate]) -> Directive {
        if catalog.iter().any(|c| c.kind == ActionKind::Sense) {
            Directive::ForceKind {
                kind: ActionKind::Sense,
            }
        } else {
            debug!("hubris directive degraded: no sense candidate in catalog");
            Directive::None
        }
    }
}

/// Index of the candidate maximizing `key`; first max wins on ties.
fn argmax_by(catalog: &[ActionCandidate], key: impl Fn(&ActionCandidate) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in catalog.iter().enumerate() {
        let value = key(candidate);
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}
