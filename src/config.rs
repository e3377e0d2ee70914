//! Harness configuration
//!
//! Launch parameters consumed from the environment and the CLI rather than
//! hard-coded in scenarios.

use std::path::PathBuf;

use crate::session::Engine;

/// Site root the suite runs against unless overridden.
pub const DEFAULT_BASE_URL: &str = "https://tokero.dev/en/";

/// Launch and timeout configuration for the harness core.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Browser engine to drive
    pub engine: Engine,
    /// Run without a visible window
    pub headless: bool,
    /// Site root under test, also used to resolve relative links
    pub base_url: String,
    /// Deadline for navigations (initial load, followed links)
    pub nav_timeout_ms: u64,
    /// Fallback deadline for condition waits that don't specify one
    pub default_timeout_ms: u64,
    /// Deadline for form success panels to appear after submit
    pub form_timeout_ms: u64,
    /// Deadline for expected content on followed link targets
    pub link_content_timeout_ms: u64,
    /// Directory failure screenshots are written to
    pub artifact_dir: PathBuf,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        let headless = std::env::var("TOKERO_HEADLESS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let base_url =
            std::env::var("TOKERO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let engine = std::env::var("TOKERO_ENGINE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Self {
            engine,
            headless,
            base_url,
            nav_timeout_ms: 30_000,
            default_timeout_ms: 5_000,
            form_timeout_ms: 20_000,
            link_content_timeout_ms: 15_000,
            artifact_dir: PathBuf::from("screenshots"),
        }
    }
}

impl HarnessConfig {
    /// Join a site-relative path onto the base URL.
    pub fn page_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

}

/// Scheme + host portion of a URL, without the trailing path.
pub(crate) fn origin_of(url: &str) -> String {
    if let Some(scheme_end) = url.find("://") {
        let rest = &url[scheme_end + 3..];
        match rest.find('/') {
            Some(i) => url[..scheme_end + 3 + i].to_string(),
            None => url.to_string(),
        }
    } else {
        url.trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_joins_without_doubled_slashes() {
        let config = HarnessConfig {
            base_url: "https://tokero.dev/en/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.page_url("contact/"),
            "https://tokero.dev/en/contact/"
        );
        assert_eq!(
            config.page_url("/contact/"),
            "https://tokero.dev/en/contact/"
        );
    }

    #[test]
    fn origin_strips_the_path() {
        assert_eq!(origin_of("https://tokero.dev/en/"), "https://tokero.dev");
        assert_eq!(origin_of("https://tokero.dev"), "https://tokero.dev");
        assert_eq!(
            origin_of("http://localhost:3000/en/contact/"),
            "http://localhost:3000"
        );
    }

    #[test]
    fn default_deadlines_are_finite() {
        let config = HarnessConfig::default();
        assert_eq!(config.nav_timeout_ms, 30_000);
        assert_eq!(config.default_timeout_ms, 5_000);
        assert_eq!(config.form_timeout_ms, 20_000);
        assert_eq!(config.link_content_timeout_ms, 15_000);
    }
}
