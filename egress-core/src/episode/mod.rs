//! Episode lifecycle: orchestration, per-step records, and final reports

pub mod orchestrator;
pub mod record;

pub use orchestrator::{EpisodePhase, Orchestrator};
pub use record::{EpisodeOutcome, EpisodeReport, StepRecord};
