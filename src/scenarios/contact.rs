//! Contact form message-length validation, at the boundary.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::flows;
use crate::scenario::Scenario;
use crate::session::Session;
use crate::waiter::{self, WaitCondition};

const MESSAGE_FIELD: &str = "#contact-form-message";
const MESSAGE_ERROR: &str = "#contact-form-message-error";

/// Messages shorter than this trigger the validation error.
const MIN_MESSAGE_LEN: usize = 20;

/// The validation message is debounced client-side with no observable
/// completion signal, so the wait is a bounded fixed pause.
const VALIDATION_DEBOUNCE_MS: u64 = 5_000;

/// Fill the message field with `len` characters and report whether the
/// validation error is visible once the debounce has settled.
async fn validation_error_shown(
    session: &Session,
    config: &HarnessConfig,
    len: usize,
) -> Result<bool, HarnessError> {
    let page = session.page();

    flows::fill_field(page, MESSAGE_FIELD, &message_of_len(len), config.default_timeout_ms)
        .await?;

    waiter::wait_for(
        page,
        WaitCondition::Timeout(Duration::from_millis(VALIDATION_DEBOUNCE_MS)),
        Duration::from_millis(VALIDATION_DEBOUNCE_MS),
    )
    .await?;

    flows::element_visible(page, MESSAGE_ERROR).await
}

fn message_of_len(len: usize) -> String {
    (1..=len).map(|i| char::from(b'0' + (i % 10) as u8)).collect()
}

/// One character under the minimum shows the validation error.
pub struct ContactMessageTooShort;

#[async_trait]
impl Scenario for ContactMessageTooShort {
    fn name(&self) -> String {
        "contact-message-too-short".to_string()
    }

    fn start_url(&self, config: &HarnessConfig) -> String {
        config.page_url("contact/")
    }

    async fn run(&self, session: &Session, config: &HarnessConfig) -> Result<(), HarnessError> {
        let shown = validation_error_shown(session, config, MIN_MESSAGE_LEN - 1).await?;
        if !shown {
            return Err(HarnessError::Assertion(format!(
                "validation error not shown for a {}-character message",
                MIN_MESSAGE_LEN - 1
            )));
        }
        Ok(())
    }
}

/// Exactly the minimum length hides the validation error.
pub struct ContactMessageMinLength;

#[async_trait]
impl Scenario for ContactMessageMinLength {
    fn name(&self) -> String {
        "contact-message-min-length".to_string()
    }

    fn start_url(&self, config: &HarnessConfig) -> String {
        config.page_url("contact/")
    }

    async fn run(&self, session: &Session, config: &HarnessConfig) -> Result<(), HarnessError> {
        let shown = validation_error_shown(session, config, MIN_MESSAGE_LEN).await?;
        if shown {
            return Err(HarnessError::Assertion(format!(
                "validation error still visible for a {}-character message",
                MIN_MESSAGE_LEN
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_hit_the_exact_boundary_lengths() {
        assert_eq!(message_of_len(19), "1234567890123456789");
        assert_eq!(message_of_len(20), "12345678901234567890");
        assert_eq!(message_of_len(19).chars().count(), MIN_MESSAGE_LEN - 1);
        assert_eq!(message_of_len(20).chars().count(), MIN_MESSAGE_LEN);
    }
}
