//! Error taxonomy for the harness core

use thiserror::Error;

/// Errors surfaced by the harness core.
///
/// `Assertion` and `ConditionTimeout` mean an expectation about the page did
/// not hold; everything else is a harness or engine fault.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Engine process failed to start, or the initial navigation never completed
    #[error("failed to launch browser session: {0}")]
    Launch(String),

    /// A named wait condition was not satisfied within its deadline
    #[error("condition not satisfied: {condition} (waited {elapsed_ms}ms)")]
    ConditionTimeout { condition: String, elapsed_ms: u64 },

    /// An explicit expectation about page state did not hold
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// Screenshot or log persistence failed
    #[error("artifact error: {0}")]
    Artifact(String),

    /// Lower-level engine I/O failure, wrapped with the step it occurred in
    #[error("{step}: {message}")]
    Engine { step: String, message: String },
}

impl HarnessError {
    /// Wrap an engine-level error with the step it occurred in.
    pub fn engine(step: impl Into<String>, err: impl std::fmt::Display) -> Self {
        HarnessError::Engine {
            step: step.into(),
            message: err.to_string(),
        }
    }

    /// True when the error represents a failed expectation rather than a
    /// harness fault. Used to split scenario outcomes into failed vs errored.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            HarnessError::Assertion(_) | HarnessError::ConditionTimeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_distinguished_from_faults() {
        assert!(HarnessError::Assertion("title mismatch".into()).is_failure());
        assert!(HarnessError::ConditionTimeout {
            condition: "network idle".into(),
            elapsed_ms: 10000,
        }
        .is_failure());

        assert!(!HarnessError::Launch("no browser".into()).is_failure());
        assert!(!HarnessError::Artifact("disk full".into()).is_failure());
        assert!(!HarnessError::engine("clicking #submit", "socket closed").is_failure());
    }

    #[test]
    fn timeout_message_names_condition_and_elapsed() {
        let err = HarnessError::ConditionTimeout {
            condition: "text present: \"Create account\"".into(),
            elapsed_ms: 5003,
        };
        let msg = err.to_string();
        assert!(msg.contains("Create account"));
        assert!(msg.contains("5003ms"));
    }

    #[test]
    fn engine_errors_carry_step_context() {
        let err = HarnessError::engine("navigating to https://tokero.dev/en/", "net::ERR_FAILED");
        assert_eq!(
            err.to_string(),
            "navigating to https://tokero.dev/en/: net::ERR_FAILED"
        );
    }
}
