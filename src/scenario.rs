//! Scenario abstraction and per-scenario outcome records.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::session::{Engine, Session};

/// A scenario owns exactly one session for its duration and produces one
/// verdict. The suite acquires the session, runs the body, and tears the
/// session down on every exit path; scenario bodies never manage lifecycle.
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Stable name used in reports, filters and artifact file names.
    fn name(&self) -> String;

    /// URL the session starts at.
    fn start_url(&self, config: &HarnessConfig) -> String;

    /// Scenario body: flows plus assertions. The first failing step
    /// terminates it.
    async fn run(&self, session: &Session, config: &HarnessConfig) -> Result<(), HarnessError>;
}

/// Scenario execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScenarioStatus {
    Pending,
    Running,
    Passed,
    Failed { reason: String },
    Error { detail: String },
    Skipped { reason: String },
}

impl ScenarioStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScenarioStatus::Pending | ScenarioStatus::Running)
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, ScenarioStatus::Passed)
    }

    /// Failed expectations become failures; harness faults become errors.
    pub fn from_error(err: &HarnessError) -> Self {
        if err.is_failure() {
            ScenarioStatus::Failed {
                reason: err.to_string(),
            }
        } else {
            ScenarioStatus::Error {
                detail: err.to_string(),
            }
        }
    }
}

/// State for a single scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioState {
    pub name: String,
    pub engine: Engine,
    pub status: ScenarioStatus,
    pub started_at: Option<Instant>,
    pub duration_ms: Option<u64>,
}

impl ScenarioState {
    pub fn new(name: &str, engine: Engine) -> Self {
        Self {
            name: name.to_string(),
            engine,
            status: ScenarioStatus::Pending,
            started_at: None,
            duration_ms: None,
        }
    }

    pub fn start(&mut self) {
        self.status = ScenarioStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn finish(&mut self, status: ScenarioStatus) {
        self.status = status;
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    pub fn skip(&mut self, reason: &str) {
        self.status = ScenarioStatus::Skipped {
            reason: reason.to_string(),
        };
    }

    /// Serialize for reporting (without Instant, which isn't serializable).
    pub fn to_report(&self) -> ScenarioReport {
        ScenarioReport {
            name: self.name.clone(),
            engine: self.engine.to_string(),
            status: self.status.clone(),
            duration_ms: self.duration_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub name: String,
    pub engine: String,
    pub status: ScenarioStatus,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub errored: u32,
    pub skipped: u32,
    pub total_duration_ms: Option<u64>,
}

/// Fold scenario states into a summary.
pub fn summarize(states: &[ScenarioState], total_duration_ms: Option<u64>) -> SuiteSummary {
    let mut summary = SuiteSummary {
        total: states.len() as u32,
        passed: 0,
        failed: 0,
        errored: 0,
        skipped: 0,
        total_duration_ms,
    };

    for state in states {
        match state.status {
            ScenarioStatus::Passed => summary.passed += 1,
            ScenarioStatus::Failed { .. } => summary.failed += 1,
            ScenarioStatus::Error { .. } => summary.errored += 1,
            ScenarioStatus::Skipped { .. } => summary.skipped += 1,
            _ => {}
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_expectations_map_to_failed() {
        let status = ScenarioStatus::from_error(&HarnessError::Assertion("wrong title".into()));
        assert!(matches!(status, ScenarioStatus::Failed { .. }));

        let status = ScenarioStatus::from_error(&HarnessError::ConditionTimeout {
            condition: "network idle".into(),
            elapsed_ms: 10_000,
        });
        assert!(matches!(status, ScenarioStatus::Failed { .. }));
    }

    #[test]
    fn harness_faults_map_to_error() {
        let status = ScenarioStatus::from_error(&HarnessError::Launch("no webkit".into()));
        assert!(matches!(status, ScenarioStatus::Error { .. }));
    }

    #[test]
    fn finishing_records_a_duration() {
        let mut state = ScenarioState::new("home-title", Engine::Chromium);
        assert!(!state.status.is_terminal());

        state.start();
        assert!(!state.status.is_terminal());

        state.finish(ScenarioStatus::Passed);
        assert!(state.status.is_terminal());
        assert!(state.status.is_pass());
        assert!(state.duration_ms.is_some());
    }

    #[test]
    fn summary_counts_every_status() {
        let mut passed = ScenarioState::new("a", Engine::Chromium);
        passed.finish(ScenarioStatus::Passed);
        let mut failed = ScenarioState::new("b", Engine::Chromium);
        failed.finish(ScenarioStatus::Failed {
            reason: "x".into(),
        });
        let mut errored = ScenarioState::new("c", Engine::Firefox);
        errored.finish(ScenarioStatus::Error {
            detail: "y".into(),
        });
        let mut skipped = ScenarioState::new("d", Engine::Webkit);
        skipped.skip("previous failure");

        let summary = summarize(&[passed, failed, errored, skipped], Some(1234));
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errored, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total_duration_ms, Some(1234));
    }
}
