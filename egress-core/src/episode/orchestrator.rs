//! Episode orchestrator — the per-step control loop
//!
//! Wires belief, scorer, and the supervisory layer together for exactly one
//! episode:
//!
//! ```text
//! INIT → RUNNING → { ESCAPED | EXHAUSTED | ESCALATED }
//! ```
//!
//! Per step: decrement the budget, build a fresh health snapshot, consult
//! the stability monitor and escalation guard (they can force a terminal
//! halt), resolve the critical state, apply its directive to scoring,
//! select and execute one action, update belief and histories, emit a step
//! record, and evaluate the terminal condition. Once the guard trips, zero
//! further actions execute.
//!
//! All mutable state is owned by one orchestrator instance for one episode.
//! Running several episodes means constructing several orchestrators —
//! monitors are built inside `new`, so cross-episode history leaks are
//! structurally impossible.

use crate::action::ActionCandidate;
use crate::belief::Belief;
use crate::config::DecisionConfig;
use crate::contracts::{ObservationOracle, PriorAdvisor, StepRecorder};
use crate::diagnostics::DecisionShape;
use crate::episode::record::{EpisodeOutcome, EpisodeReport, StepRecord};
use crate::error::{CoreError, CoreResult};
use crate::scoring::ActionScorer;
use crate::supervisor::guard::{EscalationGuard, EscalationTrigger};
use crate::supervisor::monitor::CriticalStateMonitor;
use crate::supervisor::stability::StabilityMonitor;
use crate::supervisor::state::{AdvisorSignal, AgentHealthSnapshot, CriticalState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};
use uuid::Uuid;

/// Episode lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodePhase {
    Init,
    Running,
    Escaped,
    Exhausted,
    Escalated,
}

/// Control loop for a single episode
#[derive(Debug)]
pub struct Orchestrator {
    episode_id: Uuid,
    config: DecisionConfig,
    catalog: Vec<ActionCandidate>,
    belief: Belief,
    phase: EpisodePhase,
    outcome: Option<EpisodeOutcome>,
    max_steps: u32,
    steps_remaining: u32,
    steps_taken: u32,
    action_history: VecDeque<String>,
    reward_history: VecDeque<f64>,
    last_prediction_error: f64,
    monitor: CriticalStateMonitor,
    stability: StabilityMonitor,
    guard: EscalationGuard,
    state_trail: Vec<CriticalState>,
    started_at: DateTime<Utc>,
}

impl Orchestrator {
    /// Build a fresh orchestrator for one episode. Fails fast on an empty
    /// catalog, an invalid config, an out-of-range prior, or a zero step
    /// budget — misconfiguration is never masked with defaults.
    pub fn new(
        catalog: Vec<ActionCandidate>,
        config: DecisionConfig,
        max_steps: u32,
    ) -> CoreResult<Self> {
        config.validate()?;
        if catalog.is_empty() {
            return Err(CoreError::EmptyCatalog);
        }
        if max_steps == 0 {
            return Err(CoreError::invalid_config("max_steps", 0, "must be >= 1"));
        }
        let belief = Belief::new(config.belief.prior)?;

        // Monitors are constructed here, per episode, never shared.
        let monitor = CriticalStateMonitor::new(config.clone());
        let stability = StabilityMonitor::new(config.stability, max_steps);
        let guard = EscalationGuard::new(config.escalation);

        Ok(Self {
            episode_id: Uuid::new_v4(),
            config,
            catalog,
            belief,
            phase: EpisodePhase::Init,
            outcome: None,
            max_steps,
            steps_remaining: max_steps,
            steps_taken: 0,
            action_history: VecDeque::new(),
            reward_history: VecDeque::new(),
            last_prediction_error: 0.0,
            monitor,
            stability,
            guard,
            state_trail: Vec::new(),
            started_at: Utc::now(),
        })
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    /// Current belief probability
    pub fn belief(&self) -> f64 {
        self.belief.probability()
    }

    /// Run the episode to a terminal outcome.
    pub fn run(
        &mut self,
        oracle: &mut dyn ObservationOracle,
        recorder: &mut dyn StepRecorder,
        advisor: Option<&dyn PriorAdvisor>,
    ) -> CoreResult<EpisodeReport> {
        if self.phase == EpisodePhase::Init {
            self.phase = EpisodePhase::Running;
            info!(episode_id = %self.episode_id, max_steps = self.max_steps, "episode started");
        }
        while self.outcome.is_none() {
            self.step(oracle, recorder, advisor)?;
        }
        let outcome = self
            .outcome
            .clone()
            .ok_or_else(|| CoreError::invalid_config("episode", "running", "no outcome"))?;
        info!(episode_id = %self.episode_id, %outcome, steps = self.steps_taken, "episode finished");
        Ok(EpisodeReport {
            episode_id: self.episode_id,
            outcome,
            steps_taken: self.steps_taken,
            state_trail: self.state_trail.clone(),
            final_belief: self.belief.probability(),
            started_at: self.started_at,
        })
    }

    /// Execute one step of the control loop.
    fn step(
        &mut self,
        oracle: &mut dyn ObservationOracle,
        recorder: &mut dyn StepRecorder,
        advisor: Option<&dyn PriorAdvisor>,
    ) -> CoreResult<()> {
        self.steps_remaining -= 1;
        let step_index = self.steps_taken + 1;

        let snapshot = self.build_snapshot(oracle);

        // Stability and guard are consulted before normal resolution; they
        // can force a terminal escalation with no action executed.
        self.stability.observe(&snapshot);
        if self.stability.divergence_signal() {
            self.guard.record_divergence();
        }
        if let Some(trigger) = self.guard.trigger().cloned() {
            self.finish_escalated(trigger);
            return Ok(());
        }

        let advisor_signals = self.gather_advisor_signals(advisor);
        let resolution = self
            .monitor
            .resolve(&snapshot, &self.catalog, &advisor_signals);
        self.state_trail.push(resolution.state);
        debug!(step = step_index, state = %resolution.state, "critical state resolved");

        // The trigger that trips the breaker halts the same step: the guard
        // is updated before any action executes. It counts fresh detections;
        // a state held only by hysteresis is not a new trigger.
        self.guard.record_state(step_index, resolution.detected_state);
        if let Some(trigger) = self.guard.trigger().cloned() {
            self.finish_escalated(trigger);
            return Ok(());
        }

        let scored = ActionScorer::score_all(
            &self.catalog,
            self.belief.probability(),
            &self.config.weights,
            &resolution.directive,
        )?;
        let chosen = ActionScorer::select(&scored, &self.catalog, &resolution.directive)?;
        let action = self.catalog[chosen].clone();

        let belief_before = self.belief.probability();
        let outcome = oracle.execute(&action);
        self.belief.update(outcome.observation, &self.config.belief);
        let belief_after = self.belief.probability();
        self.last_prediction_error = (belief_after - belief_before).abs();

        self.push_bounded(&action.name, outcome.reward);
        self.steps_taken += 1;

        // Purely observational overlay, computed after the decision is final.
        let shape = DecisionShape::from_scores(&scored);
        recorder.record(&StepRecord {
            step_index,
            action_name: action.name.clone(),
            observation: outcome.observation,
            belief_before,
            belief_after,
            critical_state: resolution.state,
            score: scored[chosen].shaped,
            shape,
            timestamp: Utc::now(),
        });
        debug!(
            step = step_index,
            action = %action.name,
            belief = belief_after,
            reward = outcome.reward,
            "step executed"
        );

        if outcome.terminal {
            self.phase = EpisodePhase::Escaped;
            self.outcome = Some(EpisodeOutcome::Escaped);
        } else if self.steps_remaining == 0 {
            self.phase = EpisodePhase::Exhausted;
            self.outcome = Some(EpisodeOutcome::Exhausted);
        }
        Ok(())
    }

    /// Snapshot of agent health, rebuilt fresh from current state.
    fn build_snapshot(&self, oracle: &dyn ObservationOracle) -> AgentHealthSnapshot {
        AgentHealthSnapshot {
            belief: self.belief.probability(),
            entropy: self.belief.entropy(),
            recent_actions: self.action_history.clone(),
            steps_remaining: self.steps_remaining,
            steps_taken: self.steps_taken,
            distance_to_goal: oracle.distance_to_goal(),
            recent_rewards: self.reward_history.clone(),
            last_prediction_error: self.last_prediction_error,
            escalation_forced: self.guard.is_tripped(),
        }
    }

    fn gather_advisor_signals(&self, advisor: Option<&dyn PriorAdvisor>) -> Vec<AdvisorSignal> {
        match advisor {
            Some(advisor) => self
                .catalog
                .iter()
                .filter_map(|action| advisor.assess(action))
                .collect(),
            None => Vec::new(),
        }
    }

    fn push_bounded(&mut self, action_name: &str, reward: f64) {
        if self.action_history.len() == self.config.history_capacity {
            self.action_history.pop_front();
        }
        self.action_history.push_back(action_name.to_string());
        if self.reward_history.len() == self.config.history_capacity {
            self.reward_history.pop_front();
        }
        self.reward_history.push_back(reward);
    }

    fn finish_escalated(&mut self, trigger: EscalationTrigger) {
        self.state_trail.push(CriticalState::Escalation);
        self.phase = EpisodePhase::Escalated;
        self.outcome = Some(EpisodeOutcome::Escalated { trigger });
        info!(episode_id = %self.episode_id, "episode escalated; no further actions will execute");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionKind, ValueModel};
    use crate::belief::Observation;
    use crate::contracts::{MemoryRecorder, NullRecorder, StepOutcome};

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

    /// Oracle that always answers ambiguously and never terminates —
    /// the agent stays maximally confused.
    struct AmbiguousWorld;

    impl ObservationOracle for AmbiguousWorld {
        fn execute(&mut self, _action: &ActionCandidate) -> StepOutcome {
            StepOutcome {
                observation: Observation::Ambiguous,
                terminal: false,
                reward: 0.0,
            }
        }
        fn distance_to_goal(&self) -> f64 {
            2.0
        }
    }

    #[test]
    fn test_rejects_empty_catalog() {
        let err = Orchestrator::new(vec![], DecisionConfig::default(), 10).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCatalog));
    }

    #[test]
    fn test_rejects_zero_step_budget() {
        let err = Orchestrator::new(catalog(), DecisionConfig::default(), 0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_rejects_invalid_prior() {
        let mut config = DecisionConfig::default();
        config.belief.prior = 1.4;
        let err = Orchestrator::new(catalog(), config, 10).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_fresh_episode_starts_empty() {
        let orchestrator = Orchestrator::new(catalog(), DecisionConfig::default(), 10).unwrap();
        assert_eq!(orchestrator.phase(), EpisodePhase::Init);
        assert!(orchestrator.action_history.is_empty());
        assert!(orchestrator.reward_history.is_empty());
        assert_eq!(orchestrator.stability.window_len(), 0);
        assert!(!orchestrator.guard.is_tripped());
        assert!(orchestrator.state_trail.is_empty());
    }

    #[test]
    fn test_fresh_episode_invariant_survives_a_prior_run() {
        // Run a full episode that ends in escalation...
        let mut first = Orchestrator::new(catalog(), DecisionConfig::default(), 30).unwrap();
        let report = first
            .run(&mut AmbiguousWorld, &mut NullRecorder, None)
            .unwrap();
        assert!(matches!(report.outcome, EpisodeOutcome::Escalated { .. }));

        // ...and a separately constructed orchestrator starts clean.
        let second = Orchestrator::new(catalog(), DecisionConfig::default(), 30).unwrap();
        assert!(second.action_history.is_empty());
        assert!(second.reward_history.is_empty());
        assert_eq!(second.stability.window_len(), 0);
        assert!(!second.guard.is_tripped());
    }

    #[test]
    fn test_exhaustion_when_budget_runs_out() {
        // Generous escalation thresholds so the ambiguous world exhausts
        // the budget instead of tripping the breaker.
        let mut config = DecisionConfig::default();
        config.panic_threshold = 1.5;
        let mut orchestrator = Orchestrator::new(catalog(), config, 4).unwrap();
        let report = orchestrator
            .run(&mut AmbiguousWorld, &mut NullRecorder, None)
            .unwrap();
        assert_eq!(report.outcome, EpisodeOutcome::Exhausted);
        assert_eq!(report.steps_taken, 4);
        assert_eq!(orchestrator.phase(), EpisodePhase::Exhausted);
    }

    #[test]
    fn test_no_actions_execute_on_or_after_the_halting_step() {
        // Grace blocks panic on step 1; steps 2-4 panic, and the third
        // trigger halts step 4 before its action executes.
        let mut orchestrator = Orchestrator::new(catalog(), DecisionConfig::default(), 30).unwrap();
        let mut recorder = MemoryRecorder::new();
        let report = orchestrator
            .run(&mut AmbiguousWorld, &mut recorder, None)
            .unwrap();
        assert!(matches!(report.outcome, EpisodeOutcome::Escalated { .. }));
        assert_eq!(recorder.records().len(), 3);
        assert_eq!(report.steps_taken, 3);
        assert_eq!(
            report.state_trail.last(),
            Some(&CriticalState::Escalation),
            "the trail ends with the forced escalation"
        );
    }

    #[test]
    fn test_escalated_report_carries_the_state_trail() {
        let mut orchestrator = Orchestrator::new(catalog(), DecisionConfig::default(), 30).unwrap();
        let report = orchestrator
            .run(&mut AmbiguousWorld, &mut NullRecorder, None)
            .unwrap();
        let panics = report
            .state_trail
            .iter()
            .filter(|s| **s == CriticalState::Panic)
            .count();
        assert!(panics >= 3, "trail shows the panics that led to the halt");
    }
}
