//! SocialFi waiting-list signup.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::flows;
use crate::scenario::Scenario;
use crate::session::Session;
use crate::testdata;
use crate::waiter::{self, WaitCondition};

const SOCIALFI_SECTION: &str = "div .text-hover-purple-white";
const WAITLIST_PANEL: &str = "div .border-smoke-white";
const NAME_FIELD: &str = "#Name";
const EMAIL_FIELD: &str = "#Email";
const SUBMIT_BUTTON: &str = ".mud-button-label";
const SUCCESS_HEADING: &str = "h1.mt-5";

/// The success heading must equal this exactly; a visible panel with any
/// other text is a failure.
const SUCCESS_TEXT: &str = "Congratulations!";

/// The waiting-list panel renders client-side after the section click.
const PANEL_TIMEOUT_MS: u64 = 20_000;

/// Joining the SocialFi waiting list with a fresh email succeeds.
pub struct SocialFiSignup;

#[async_trait]
impl Scenario for SocialFiSignup {
    fn name(&self) -> String {
        "socialfi-signup".to_string()
    }

    fn start_url(&self, config: &HarnessConfig) -> String {
        config.base_url.clone()
    }

    async fn run(&self, session: &Session, config: &HarnessConfig) -> Result<(), HarnessError> {
        let page = session.page();

        flows::click(page, SOCIALFI_SECTION, config.default_timeout_ms).await?;

        waiter::wait_for(
            page,
            WaitCondition::ElementVisible {
                selector: WAITLIST_PANEL.to_string(),
            },
            Duration::from_millis(PANEL_TIMEOUT_MS),
        )
        .await?;

        let name = testdata::random_first_name();
        let email = testdata::random_email();

        flows::submit_form_and_verify(
            session,
            config,
            &[(NAME_FIELD, name.as_str()), (EMAIL_FIELD, email.as_str())],
            SUBMIT_BUTTON,
            SUCCESS_HEADING,
            SUCCESS_TEXT,
        )
        .await
    }
}
