//! Supervisory layer — critical states, stability tracking, escalation
//!
//! The supervisor watches agent health each step, resolves exactly one
//! critical state from a fixed priority list, and reshapes action scoring
//! through directives. A circuit breaker halts the episode when overrides
//! start thrashing.

pub mod guard;
pub mod monitor;
pub mod stability;
pub mod state;

pub use guard::{EscalationGuard, EscalationTrigger};
pub use monitor::{CriticalStateMonitor, StateResolution};
pub use stability::StabilityMonitor;
pub use state::{
    AdvisorSignal, AgentHealthSnapshot, BonusTarget, CandidateBonus, CriticalState, Directive,
};
