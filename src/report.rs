//! JSON report generation for suite runs.

use std::path::Path;

use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::scenario::{ScenarioReport, SuiteSummary};

/// Results of one suite run, ready for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
    pub scenarios: Vec<ScenarioReport>,
    pub summary: SuiteSummary,
    pub generated_at: String,
}

impl SuiteReport {
    pub fn new(scenarios: Vec<ScenarioReport>, summary: SuiteSummary) -> Self {
        Self {
            scenarios,
            summary,
            generated_at: Local::now().to_rfc3339(),
        }
    }
}

/// Write the report as pretty JSON to `output`, or to stdout when no path is
/// given.
pub fn generate(report: &SuiteReport, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;

    if let Some(path) = output {
        std::fs::write(path, json)?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{ScenarioState, ScenarioStatus};
    use crate::session::Engine;

    #[test]
    fn reports_serialize_with_camel_case_keys() {
        let mut state = ScenarioState::new("home-title", Engine::Chromium);
        state.finish(ScenarioStatus::Failed {
            reason: "title mismatch".into(),
        });

        let report = SuiteReport::new(
            vec![state.to_report()],
            crate::scenario::summarize(&[state], Some(42)),
        );

        let value = serde_json::to_value(&report).unwrap();
        assert!(value["generatedAt"].is_string());
        assert_eq!(value["summary"]["totalDurationMs"], 42);
        assert_eq!(value["scenarios"][0]["engine"], "chromium");
        assert_eq!(value["scenarios"][0]["status"]["type"], "failed");
    }
}
