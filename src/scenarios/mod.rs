//! The verification suite: concrete scenarios against the live site.
//!
//! Selectors and expected copy are domain content; everything else flows
//! through the session/waiter/flows core.

mod contact;
mod home;
mod language;
mod policies;
mod signup;

pub use contact::{ContactMessageMinLength, ContactMessageTooShort};
pub use home::{HomeLoadPerformance, HomeTitle};
pub use language::LanguageSwitch;
pub use policies::FooterPolicyLinks;
pub use signup::SocialFiSignup;

use crate::scenario::Scenario;

/// The full suite, in execution order.
pub fn all() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(HomeLoadPerformance),
        Box::new(HomeTitle),
        Box::new(LanguageSwitch::new("RO", "Creare cont")),
        Box::new(LanguageSwitch::new("EN", "Create account")),
        Box::new(LanguageSwitch::new("DE", "Konto erstellen")),
        Box::new(FooterPolicyLinks),
        Box::new(SocialFiSignup),
        Box::new(ContactMessageTooShort),
        Box::new(ContactMessageMinLength),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use std::collections::HashSet;

    #[test]
    fn scenario_names_are_unique() {
        let scenarios = all();
        let names: HashSet<String> = scenarios.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), scenarios.len());
    }

    #[test]
    fn start_urls_resolve_under_the_base() {
        let config = HarnessConfig::default();
        for scenario in all() {
            let url = scenario.start_url(&config);
            assert!(
                url.starts_with(config.base_url.trim_end_matches('/')),
                "{} starts at {}",
                scenario.name(),
                url
            );
        }
    }
}
