//! Home page load and title checks.

use async_trait::async_trait;

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::flows;
use crate::scenario::Scenario;
use crate::session::Session;

/// Outer deadline for the root page to reach network idle.
const LOAD_DEADLINE_MS: u64 = 10_000;

/// The load itself must come in under this.
const LOAD_BUDGET_MS: u64 = 5_000;

const TITLE_TOKEN: &str = "TOKERO";

/// Root page reaches network idle inside the performance budget.
pub struct HomeLoadPerformance;

#[async_trait]
impl Scenario for HomeLoadPerformance {
    fn name(&self) -> String {
        "home-load-performance".to_string()
    }

    fn start_url(&self, config: &HarnessConfig) -> String {
        config.base_url.clone()
    }

    async fn run(&self, session: &Session, config: &HarnessConfig) -> Result<(), HarnessError> {
        let elapsed =
            flows::load_and_check_title(session, &config.base_url, TITLE_TOKEN, LOAD_DEADLINE_MS)
                .await?;

        let elapsed_ms = elapsed.as_millis() as u64;
        if elapsed_ms >= LOAD_BUDGET_MS {
            return Err(HarnessError::Assertion(format!(
                "page took too long to load: {} ms",
                elapsed_ms
            )));
        }

        Ok(())
    }
}

/// Root page title carries the site name.
pub struct HomeTitle;

#[async_trait]
impl Scenario for HomeTitle {
    fn name(&self) -> String {
        "home-title".to_string()
    }

    fn start_url(&self, config: &HarnessConfig) -> String {
        config.base_url.clone()
    }

    async fn run(&self, session: &Session, config: &HarnessConfig) -> Result<(), HarnessError> {
        flows::load_and_check_title(
            session,
            &config.base_url,
            TITLE_TOKEN,
            config.nav_timeout_ms,
        )
        .await?;
        Ok(())
    }
}
