//! External collaborator contracts
//!
//! The decision core is synchronous and single-threaded: every collaborator
//! call is a plain blocking call made once per step. Persistence is
//! fire-and-forget — the core's control flow never depends on a recorder
//! succeeding, and it never retries a write.

use crate::action::ActionCandidate;
use crate::belief::Observation;
use crate::episode::record::StepRecord;
use crate::supervisor::state::AdvisorSignal;
use serde::{Deserialize, Serialize};

/// What the world returned for one executed action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Observation token for the belief update
    pub observation: Observation,
    /// The goal was reached by this action
    pub terminal: bool,
    /// Scalar reward signal (negative on setbacks)
    pub reward: f64,
}

/// Ground-truth world the agent acts against. Called once per step,
/// synchronously.
pub trait ObservationOracle {
    /// Execute the chosen action and observe the result
    fn execute(&mut self, action: &ActionCandidate) -> StepOutcome;

    /// Estimated number of actions between the agent and the goal
    fn distance_to_goal(&self) -> f64;
}

/// Sink for per-step records. Implementations must not block the episode;
/// errors are swallowed at the implementation boundary.
pub trait StepRecorder {
    fn record(&mut self, record: &StepRecord);
}

/// Recorder that drops everything
#[derive(Debug, Default)]
pub struct NullRecorder;

impl StepRecorder for NullRecorder {
    fn record(&mut self, _record: &StepRecord) {}
}

/// Recorder that keeps records in memory (demos, tests)
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    records: Vec<StepRecord>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }
}

impl StepRecorder for MemoryRecorder {
    fn record(&mut self, record: &StepRecord) {
        self.records.push(record.clone());
    }
}

/// Optional memory/prior advisor. Its signals are advisory only: they can
/// nudge the supervisory layer toward Panic-like caution but are
/// subordinate to the monitor's priority rules.
pub trait PriorAdvisor {
    fn assess(&self, action: &ActionCandidate) -> Option<AdvisorSignal>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::state::CriticalState;

    #[test]
    fn test_memory_recorder_collects() {
        let mut recorder = MemoryRecorder::new();
        let record = StepRecord {
            step_index: 1,
            action_name: "peek".to_string(),
            observation: Observation::Confirming,
            belief_before: 0.5,
            belief_after: 0.9,
            critical_state: CriticalState::Flow,
            score: 0.8,
            shape: None,
            timestamp: chrono::Utc::now(),
        };
        recorder.record(&record);
        assert_eq!(recorder.records().len(), 1);
        assert_eq!(recorder.records()[0].action_name, "peek");
    }
}
