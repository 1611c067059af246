//! Egress Core — a supervised decision-making loop
//!
//! This library provides:
//! - A probabilistic belief over one hidden proposition, updated by
//!   categorical observations
//! - A deterministic multi-objective action scorer (goal value,
//!   information gain, cost)
//! - A supervisory layer that resolves a single critical state per step
//!   and reshapes scoring through directives
//! - A stability monitor and an escalation circuit breaker that halt an
//!   episode that is getting worse instead of letting it thrash
//!
//! # Layers
//!
//! ## Decision layer
//! - `belief`: belief state and binary entropy
//! - `action`: candidate catalog and per-candidate value models
//! - `scoring`: utility scoring, directive reshaping, argmax selection
//!
//! ## Supervisory layer
//! - `supervisor::monitor`: priority-ordered critical-state rules with
//!   hysteresis, plus the directive each state emits
//! - `supervisor::stability`: sliding-window trend over a composite
//!   wellness metric
//! - `supervisor::guard`: trip-once circuit breaker over repeated panic,
//!   repeated deadlock, and sustained divergence
//!
//! ## Episode layer
//! - `episode`: the per-step orchestrator, step records, final reports
//! - `contracts`: oracle, recorder, and advisor seams for host programs
//! - `world`: a bundled locked-room oracle for demos and tests
//!
//! # Usage
//!
//! ```no_run
//! use egress_core::config::DecisionConfig;
//! use egress_core::contracts::NullRecorder;
//! use egress_core::episode::Orchestrator;
//! use egress_core::world::LockedRoomWorld;
//!
//! # fn main() -> egress_core::error::CoreResult<()> {
//! let catalog = LockedRoomWorld::standard_catalog();
//! let mut world = LockedRoomWorld::new(true);
//! let mut orchestrator = Orchestrator::new(catalog, DecisionConfig::default(), 20)?;
//! let report = orchestrator.run(&mut world, &mut NullRecorder, None)?;
//! println!("{}", report.outcome);
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod belief;
pub mod config;
pub mod contracts;
pub mod diagnostics;
pub mod episode;
pub mod error;
pub mod scoring;
pub mod supervisor;
pub mod world;

// Re-export decision-layer types
pub use action::{ActionCandidate, ActionKind, ValueModel};
pub use belief::{binary_entropy, Belief, Observation};
pub use scoring::{ActionScorer, ScoredCandidate};

// Re-export supervisory types
pub use supervisor::guard::{EscalationGuard, EscalationTrigger};
pub use supervisor::monitor::{CriticalStateMonitor, StateResolution};
pub use supervisor::stability::StabilityMonitor;
pub use supervisor::state::{
    AdvisorSignal, AgentHealthSnapshot, BonusTarget, CandidateBonus, CriticalState, Directive,
};

// Re-export episode types
pub use contracts::{
    MemoryRecorder, NullRecorder, ObservationOracle, PriorAdvisor, StepOutcome, StepRecorder,
};
pub use diagnostics::DecisionShape;
pub use episode::{EpisodeOutcome, EpisodePhase, EpisodeReport, Orchestrator, StepRecord};

// Re-export configuration and errors
pub use config::{BeliefConfig, DecisionConfig, EscalationConfig, ScoreWeights, StabilityConfig};
pub use error::{CoreError, CoreResult};
pub use world::LockedRoomWorld;
