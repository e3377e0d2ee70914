//! Language switcher verification.

use async_trait::async_trait;
use log::debug;

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::flows;
use crate::scenario::Scenario;
use crate::session::Session;
use crate::waiter;

/// Switch the site to one language and verify its copy appears.
pub struct LanguageSwitch {
    lang_code: &'static str,
    expected_text: &'static str,
}

impl LanguageSwitch {
    pub const fn new(lang_code: &'static str, expected_text: &'static str) -> Self {
        Self {
            lang_code,
            expected_text,
        }
    }

    /// True when the start page is already in this language, in which case
    /// the pre-switch absence check has nothing to observe.
    fn already_active(&self, config: &HarnessConfig) -> bool {
        config
            .base_url
            .to_lowercase()
            .contains(&format!("/{}/", self.lang_code.to_lowercase()))
    }
}

#[async_trait]
impl Scenario for LanguageSwitch {
    fn name(&self) -> String {
        format!("language-switcher-{}", self.lang_code.to_lowercase())
    }

    fn start_url(&self, config: &HarnessConfig) -> String {
        config.base_url.clone()
    }

    async fn run(&self, session: &Session, config: &HarnessConfig) -> Result<(), HarnessError> {
        // Atomic from the observer's viewpoint: the target language's copy is
        // absent before the switch and visible after it.
        if self.already_active(config) {
            debug!(
                "Start page is already in {}; skipping the absence pre-check",
                self.lang_code
            );
        } else if waiter::text_is_visible(session.page(), self.expected_text).await? {
            return Err(HarnessError::Assertion(format!(
                "\"{}\" is already visible before switching to {}",
                self.expected_text, self.lang_code
            )));
        }

        flows::switch_language_and_verify(session, self.lang_code, self.expected_text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_start_language_is_detected_from_the_base_url() {
        let config = HarnessConfig {
            base_url: "https://tokero.dev/en/".to_string(),
            ..Default::default()
        };

        assert!(LanguageSwitch::new("EN", "Create account").already_active(&config));
        assert!(!LanguageSwitch::new("RO", "Creare cont").already_active(&config));
        assert!(!LanguageSwitch::new("DE", "Konto erstellen").already_active(&config));
    }
}
