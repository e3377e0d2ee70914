//! Suite runner
//!
//! Runs scenarios per engine with one fresh session each, acquired from the
//! factory and closed on every exit path, so a failing scenario body never
//! leaks an open browser context.

use std::time::Instant;

use anyhow::Result;
use colored::Colorize;
use log::debug;

use crate::config::HarnessConfig;
use crate::report::SuiteReport;
use crate::scenario::{self, Scenario, ScenarioState, ScenarioStatus, SuiteSummary};
use crate::scenarios;
use crate::session::{Engine, SessionFactory};

/// What to run and how to react to failures.
#[derive(Debug, Clone)]
pub struct SuiteOptions {
    /// Engines to run the suite on, in order
    pub engines: Vec<Engine>,
    /// Only scenarios whose name contains this substring
    pub filter: Option<String>,
    /// Keep running scenarios after one fails
    pub continue_on_failure: bool,
}

/// Run the suite and return the report. Engine processes are shared across
/// the scenarios of a run and shut down at the end.
pub async fn run_suite(config: HarnessConfig, options: SuiteOptions) -> Result<SuiteReport> {
    let scenarios = scenarios::all();

    // Engine selection falls back to the configured default.
    let engines = if options.engines.is_empty() {
        vec![config.engine]
    } else {
        options.engines.clone()
    };

    // Flatten the plan up front so an aborted run can mark the tail skipped.
    let plan: Vec<(Engine, &Box<dyn Scenario>)> = engines
        .iter()
        .flat_map(|engine| {
            scenarios
                .iter()
                .filter(|s| matches_filter(&s.name(), &options.filter))
                .map(move |s| (*engine, s))
        })
        .collect();

    if plan.is_empty() {
        anyhow::bail!("no scenarios to run (check --filter and --engine)");
    }

    let mut factory = SessionFactory::new(config.clone());
    let mut states: Vec<ScenarioState> = Vec::new();
    let mut current_engine: Option<Engine> = None;
    let mut aborted_at: Option<usize> = None;
    let run_started = Instant::now();

    for (idx, (engine, scenario)) in plan.iter().enumerate() {
        if current_engine != Some(*engine) {
            current_engine = Some(*engine);
            println!(
                "\n{} Engine: {}",
                "▶".green().bold(),
                engine.to_string().cyan()
            );
        }

        let name = scenario.name();
        let mut state = ScenarioState::new(&name, *engine);
        state.start();
        println!("  {} {}", "→".blue(), name.white().bold());

        let status = run_one(&mut factory, *engine, scenario.as_ref(), &config).await;
        state.finish(status);
        print_outcome(&state);

        let passed = state.status.is_pass();
        states.push(state);

        if !passed && !options.continue_on_failure {
            aborted_at = Some(idx + 1);
            break;
        }
    }

    if let Some(from) = aborted_at {
        for (engine, scenario) in &plan[from..] {
            let mut state = ScenarioState::new(&scenario.name(), *engine);
            state.skip("previous scenario failed");
            states.push(state);
        }
    }

    factory.shutdown().await;

    let summary = scenario::summarize(&states, Some(run_started.elapsed().as_millis() as u64));
    print_summary(&summary);

    Ok(SuiteReport::new(
        states.iter().map(|s| s.to_report()).collect(),
        summary,
    ))
}

/// Scoped acquisition for one scenario: launch, run, close. The close runs
/// whether the body passed, failed or errored.
async fn run_one(
    factory: &mut SessionFactory,
    engine: Engine,
    scenario: &dyn Scenario,
    config: &HarnessConfig,
) -> ScenarioStatus {
    let start_url = scenario.start_url(config);
    debug!("Starting {} on {} at {}", scenario.name(), engine, start_url);

    let mut session = match factory.launch(engine, &start_url).await {
        Ok(session) => session,
        Err(e) => return ScenarioStatus::from_error(&e),
    };

    let result = scenario.run(&session, config).await;
    session.close().await;

    match result {
        Ok(()) => ScenarioStatus::Passed,
        Err(e) => ScenarioStatus::from_error(&e),
    }
}

fn matches_filter(name: &str, filter: &Option<String>) -> bool {
    filter.as_ref().map_or(true, |f| name.contains(f.as_str()))
}

fn print_outcome(state: &ScenarioState) {
    let duration = state
        .duration_ms
        .map(|ms| format!(" ({} ms)", ms))
        .unwrap_or_default();

    match &state.status {
        ScenarioStatus::Passed => println!("    {} passed{}", "✓".green(), duration),
        ScenarioStatus::Failed { reason } => {
            println!("    {} failed{}: {}", "✗".red(), duration, reason)
        }
        ScenarioStatus::Error { detail } => {
            println!("    {} error{}: {}", "⚠".yellow(), duration, detail)
        }
        _ => {}
    }
}

fn print_summary(summary: &SuiteSummary) {
    println!("\n{} Suite finished", "■".blue().bold());
    println!("  Total scenarios: {}", summary.total);
    println!(
        "  {} passed, {} failed, {} errored, {} skipped",
        summary.passed.to_string().green(),
        summary.failed.to_string().red(),
        summary.errored.to_string().yellow(),
        summary.skipped.to_string().yellow()
    );
    if let Some(duration) = summary.total_duration_ms {
        println!("  Duration: {}ms", duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_filter_matches_on_substrings() {
        assert!(matches_filter("home-title", &None));
        assert!(matches_filter("home-title", &Some("home".to_string())));
        assert!(matches_filter("language-switcher-ro", &Some("switcher".to_string())));
        assert!(!matches_filter("home-title", &Some("contact".to_string())));
    }
}
