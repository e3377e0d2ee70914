//! Footer policy navigation.

use async_trait::async_trait;
use log::info;

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::flows;
use crate::scenario::Scenario;
use crate::session::Session;

const FOOTER: &str = "footer";

/// Links worth following, matched on their visible text.
const KEYWORDS: [&str; 6] = [
    "Policies list",
    "Terms and conditions",
    "GDPR",
    "Privacy",
    "KYC",
    "Cookies",
];

/// Any one of these on the target page confirms it. Unordered; first match
/// wins.
const EXPECTED_CONTENTS: [&str; 6] = [
    "TOKERO policies and rules",
    "Terms of Service",
    "RIGHTS OF DATA SUBJECTS",
    "Privacy Policy",
    "KYC and AML policy",
    "Cookies Policy",
];

/// Every policy link in the footer opens a page with recognizable policy
/// content.
pub struct FooterPolicyLinks;

#[async_trait]
impl Scenario for FooterPolicyLinks {
    fn name(&self) -> String {
        "footer-policy-links".to_string()
    }

    fn start_url(&self, config: &HarnessConfig) -> String {
        config.base_url.clone()
    }

    async fn run(&self, session: &Session, config: &HarnessConfig) -> Result<(), HarnessError> {
        let verified = flows::follow_matching_links_and_verify(
            session,
            config,
            FOOTER,
            &KEYWORDS,
            &EXPECTED_CONTENTS,
            &self.name(),
        )
        .await?;

        // Zero matches would pass vacuously and hide footer selector rot.
        if verified == 0 {
            return Err(HarnessError::Assertion(
                "no footer links matched any policy keyword".to_string(),
            ));
        }

        info!("Verified {} footer policy links", verified);
        Ok(())
    }
}
