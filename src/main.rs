use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use tokero_tester::config::HarnessConfig;
use tokero_tester::session::{self, Engine};
use tokero_tester::suite::{run_suite, SuiteOptions};
use tokero_tester::{report, scenarios};

#[derive(Parser)]
#[command(name = "tokero-tester")]
#[command(version = "0.1.0")]
#[command(about = "End-to-end UI verification harness for the TOKERO website", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the verification suite
    Run {
        /// Engine(s) to drive: chromium, firefox, webkit, or all
        #[arg(short, long, default_value = "chromium", value_delimiter = ',')]
        engine: Vec<String>,

        /// Run browsers without a visible window
        #[arg(long, default_value = "false")]
        headless: bool,

        /// Site root under test
        #[arg(long)]
        base_url: Option<String>,

        /// Run only scenarios whose name contains this substring
        #[arg(short, long)]
        filter: Option<String>,

        /// Keep running after a scenario fails
        #[arg(long, default_value = "false")]
        continue_on_failure: bool,

        /// Write a JSON report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for failure screenshots
        #[arg(long)]
        artifact_dir: Option<PathBuf>,
    },

    /// List scenarios in execution order
    List,

    /// Download the Playwright driver and browser builds
    Install,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            engine,
            headless,
            base_url,
            filter,
            continue_on_failure,
            output,
            artifact_dir,
        } => {
            let mut config = HarnessConfig::default();
            if headless {
                config.headless = true;
            }
            if let Some(base_url) = base_url {
                config.base_url = base_url;
            }
            if let Some(dir) = artifact_dir {
                config.artifact_dir = dir;
            }

            let engines = parse_engines(&engine)?;
            config.engine = engines[0];

            let results = run_suite(
                config,
                SuiteOptions {
                    engines,
                    filter,
                    continue_on_failure,
                },
            )
            .await?;

            report::generate(&results, output.as_deref())?;

            let summary = &results.summary;
            let not_passed = summary.failed + summary.errored;
            if not_passed > 0 {
                anyhow::bail!("{} of {} scenarios did not pass", not_passed, summary.total);
            }
            Ok(())
        }

        Commands::List => {
            for scenario in scenarios::all() {
                println!("{}", scenario.name());
            }
            Ok(())
        }

        Commands::Install => {
            println!(
                "{} Fetching Playwright driver and browser builds...",
                "⬇".blue()
            );
            session::install_browsers().await?;
            println!("{} Browsers installed", "✓".green());
            Ok(())
        }
    }
}

/// Expand engine names, with "all" fanning out to every variant.
fn parse_engines(names: &[String]) -> anyhow::Result<Vec<Engine>> {
    let mut engines = Vec::new();
    for name in names {
        if name.eq_ignore_ascii_case("all") {
            for engine in Engine::all() {
                if !engines.contains(&engine) {
                    engines.push(engine);
                }
            }
        } else {
            let engine: Engine = name.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            if !engines.contains(&engine) {
                engines.push(engine);
            }
        }
    }
    if engines.is_empty() {
        anyhow::bail!("no engine selected");
    }
    Ok(engines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_expands_to_every_engine_once() {
        let engines = parse_engines(&["all".to_string(), "chromium".to_string()]).unwrap();
        assert_eq!(engines, vec![Engine::Chromium, Engine::Firefox, Engine::Webkit]);
    }

    #[test]
    fn unknown_engines_are_rejected() {
        assert!(parse_engines(&["edge".to_string()]).is_err());
    }
}
