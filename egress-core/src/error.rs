//! Core error types
//!
//! Misconfiguration fails fast at the point of use; the core never
//! substitutes a default action or belief value to mask it. Recoverable
//! deviations (non-Flow critical states) are not errors — they are handled
//! by reshaping the score — and fatal escalation surfaces as a distinct
//! episode outcome, not through this type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while constructing or running a decision core
#[derive(Error, Debug)]
pub enum CoreError {
    /// The action catalog is empty — there is nothing to score
    #[error("Action catalog is empty: at least one candidate is required")]
    EmptyCatalog,

    /// A belief value fell outside [0, 1]
    #[error("Belief out of range: {value} (must be within [0, 1])")]
    BeliefOutOfRange { value: f64 },

    /// A configuration field is missing or out of its valid range
    #[error("Invalid configuration: {field} = {value} ({reason})")]
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    /// Configuration file could not be read
    #[error("Failed to read config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed (missing thresholds included)
    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },
}

impl CoreError {
    /// Create an invalid-config error
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::EmptyCatalog;
        assert!(err.to_string().contains("catalog is empty"));

        let err = CoreError::BeliefOutOfRange { value: 1.5 };
        assert!(err.to_string().contains("1.5"));

        let err = CoreError::invalid_config("panic_threshold", -0.2, "must be positive");
        assert!(err.to_string().contains("panic_threshold"));
        assert!(err.to_string().contains("must be positive"));
    }
}
