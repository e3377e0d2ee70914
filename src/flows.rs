//! Scenario-level operations
//!
//! Each flow is a sequence of session/waiter calls plus one assertion. The
//! first failing step terminates the scenario; a step whose element never
//! shows up fails with a condition timeout, it is never silently skipped.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use playwright::api::Page;

use crate::artifacts;
use crate::config::{origin_of, HarnessConfig};
use crate::error::HarnessError;
use crate::session::{close_page, Session};
use crate::waiter::{self, WaitCondition};

/// Language selector control in the site header.
const LANGUAGE_DROPDOWN: &str = "button.dropdown-toggle";

/// Deadline for the full dropdown -> option -> applied sequence steps.
const LANGUAGE_SWITCH_TIMEOUT_MS: u64 = 5_000;

fn language_option_selector(lang_code: &str) -> String {
    format!(".languageSwitcher_btnLabel__JjcN5:has-text('{}')", lang_code)
}

/// Navigate to `url`, wait for the network to go idle within `max_millis`,
/// and assert the page title contains `expected_substring`. Returns the
/// elapsed navigation time so callers can also assert on timing.
pub async fn load_and_check_title(
    session: &Session,
    url: &str,
    expected_substring: &str,
    max_millis: u64,
) -> Result<Duration, HarnessError> {
    let page = session.page();
    let started = Instant::now();
    let deadline = Duration::from_millis(max_millis);

    page.goto_builder(url)
        .timeout(max_millis as f64)
        .goto()
        .await
        .map_err(|e| {
            debug!("Navigation to {} failed: {}", url, e);
            timeout_reaching_idle(url, started)
        })?;

    // The load event fired; idle means the page also stopped fetching.
    let remaining = deadline.saturating_sub(started.elapsed());
    waiter::wait_for(page, WaitCondition::NetworkIdle, remaining)
        .await
        .map_err(|_| timeout_reaching_idle(url, started))?;

    let elapsed = started.elapsed();
    info!("Loaded {} in {} ms", url, elapsed.as_millis());

    let title = page
        .title()
        .await
        .map_err(|e| HarnessError::engine("reading page title", e))?;

    if !title.contains(expected_substring) {
        return Err(HarnessError::Assertion(format!(
            "title \"{}\" does not contain \"{}\"",
            title, expected_substring
        )));
    }

    Ok(elapsed)
}

/// Switch the site language via the header dropdown and verify the copy
/// changed. State machine: closed dropdown -> open dropdown -> language
/// applied; a stalled transition surfaces as one failure naming the
/// attempted language and the expected text, with no silent partial
/// application.
pub async fn switch_language_and_verify(
    session: &Session,
    lang_code: &str,
    expected_text: &str,
) -> Result<(), HarnessError> {
    let page = session.page();

    let step_failed = |what: &str| {
        HarnessError::Assertion(format!(
            "switching language to {} failed: {} (expected \"{}\")",
            lang_code, what, expected_text
        ))
    };

    click(page, LANGUAGE_DROPDOWN, LANGUAGE_SWITCH_TIMEOUT_MS)
        .await
        .map_err(|e| {
            debug!("Language dropdown step failed: {}", e);
            step_failed("language dropdown did not open")
        })?;

    let option = language_option_selector(lang_code);
    click(page, &option, LANGUAGE_SWITCH_TIMEOUT_MS)
        .await
        .map_err(|e| {
            debug!("Language option step failed: {}", e);
            step_failed("language option not found")
        })?;

    waiter::wait_for(
        page,
        WaitCondition::TextPresent {
            text: expected_text.to_string(),
        },
        Duration::from_millis(LANGUAGE_SWITCH_TIMEOUT_MS),
    )
    .await
    .map_err(|e| {
        debug!("Language apply step failed: {}", e);
        step_failed("expected text never appeared")
    })?;

    if !waiter::text_is_visible(page, expected_text).await? {
        return Err(step_failed("expected text present but not visible"));
    }

    info!("Language switched to {}", lang_code);
    Ok(())
}

/// Enumerate links under `container_selector`, follow each whose visible
/// text contains any keyword, and verify any one of `expected_contents`
/// appears on the target (first match wins; the set is unordered). Every
/// followed link gets its own secondary page, closed before the next link
/// regardless of outcome, so at most one is open at a time. Returns the
/// number of links verified.
pub async fn follow_matching_links_and_verify(
    session: &Session,
    config: &HarnessConfig,
    container_selector: &str,
    keywords: &[&str],
    expected_contents: &[&str],
    scenario: &str,
) -> Result<usize, HarnessError> {
    let page = session.page();
    let link_selector = format!("{} a", container_selector);

    let links = page
        .query_selector_all(&link_selector)
        .await
        .map_err(|e| HarnessError::engine(format!("enumerating {}", link_selector), e))?;
    debug!("{} links under {}", links.len(), container_selector);

    let mut verified = 0;
    for link in links {
        // Detached or icon-only links read as empty and never match.
        let text = link.inner_text().await.unwrap_or_default();
        if !matches_any_keyword(&text, keywords) {
            continue;
        }

        let href = match link
            .get_attribute("href")
            .await
            .map_err(|e| HarnessError::engine("reading link href", e))?
        {
            Some(href) if !href.is_empty() => href,
            _ => continue,
        };

        let url = resolve_href(&config.base_url, &href);
        info!("Checking \"{}\" -> {}", text.trim(), url);

        verify_link_target(session, config, &url, expected_contents, scenario).await?;
        verified += 1;
    }

    Ok(verified)
}

/// Open one link target in a secondary page and confirm expected content
/// shows up. The page is closed before returning, on success and failure
/// alike; a screenshot is captured (best-effort) when the content never
/// appears.
async fn verify_link_target(
    session: &Session,
    config: &HarnessConfig,
    url: &str,
    expected_contents: &[&str],
    scenario: &str,
) -> Result<(), HarnessError> {
    let page = session
        .open_page(url, config.link_content_timeout_ms)
        .await?;

    if let Err(e) = waiter::wait_for(
        &page,
        WaitCondition::NetworkIdle,
        Duration::from_millis(config.link_content_timeout_ms),
    )
    .await
    {
        close_page(&page).await;
        return Err(e);
    }

    let result = waiter::wait_for_any_text(
        &page,
        expected_contents,
        Duration::from_millis(config.link_content_timeout_ms),
    )
    .await;

    let outcome = match result {
        Ok(matched) => {
            debug!("Found expected text \"{}\" at {}", matched, url);
            Ok(())
        }
        Err(err @ HarnessError::ConditionTimeout { .. }) => {
            // Best-effort artifact; never promoted over the original failure.
            match artifacts::capture_screenshot(&page, &config.artifact_dir, scenario).await {
                Ok(file) => info!("Saved failure screenshot to {}", file.display()),
                Err(artifact_err) => warn!("{}", artifact_err),
            }
            Err(HarnessError::Assertion(format!(
                "none of the expected contents appeared at {}: {}",
                url, err
            )))
        }
        Err(other) => Err(other),
    };

    close_page(&page).await;
    outcome
}

/// Fill each field in the given order (the order the page's client-side
/// validation expects), click submit, wait for the success element, and
/// assert its text equals `success_expected_text` exactly, not as a
/// substring.
pub async fn submit_form_and_verify(
    session: &Session,
    config: &HarnessConfig,
    fields: &[(&str, &str)],
    submit_selector: &str,
    success_selector: &str,
    success_expected_text: &str,
) -> Result<(), HarnessError> {
    let page = session.page();

    for (selector, value) in fields {
        fill_field(page, selector, value, config.default_timeout_ms).await?;
    }

    click(page, submit_selector, config.default_timeout_ms).await?;

    waiter::wait_for(
        page,
        WaitCondition::ElementVisible {
            selector: success_selector.to_string(),
        },
        Duration::from_millis(config.form_timeout_ms),
    )
    .await?;

    let panel = page
        .query_selector(success_selector)
        .await
        .map_err(|e| HarnessError::engine(format!("locating {}", success_selector), e))?
        .ok_or_else(|| {
            HarnessError::Assertion(format!(
                "success element {} disappeared after becoming visible",
                success_selector
            ))
        })?;

    let text = panel
        .inner_text()
        .await
        .map_err(|e| HarnessError::engine(format!("reading {}", success_selector), e))?;

    if text != success_expected_text {
        return Err(HarnessError::Assertion(format!(
            "success text \"{}\" does not equal \"{}\"",
            text, success_expected_text
        )));
    }

    Ok(())
}

/// Wait for the element to be visible, then click it.
pub async fn click(page: &Page, selector: &str, timeout_ms: u64) -> Result<(), HarnessError> {
    waiter::wait_for(
        page,
        WaitCondition::ElementVisible {
            selector: selector.to_string(),
        },
        Duration::from_millis(timeout_ms),
    )
    .await?;

    page.click_builder(selector)
        .click()
        .await
        .map_err(|e| HarnessError::engine(format!("clicking {}", selector), e))
}

/// Wait for the field to be visible, then fill it.
pub async fn fill_field(
    page: &Page,
    selector: &str,
    value: &str,
    timeout_ms: u64,
) -> Result<(), HarnessError> {
    waiter::wait_for(
        page,
        WaitCondition::ElementVisible {
            selector: selector.to_string(),
        },
        Duration::from_millis(timeout_ms),
    )
    .await?;

    let field = page
        .query_selector(selector)
        .await
        .map_err(|e| HarnessError::engine(format!("locating {}", selector), e))?
        .ok_or_else(|| {
            HarnessError::engine(
                format!("locating {}", selector),
                "element disappeared after wait",
            )
        })?;

    field
        .fill_builder(value)
        .fill()
        .await
        .map_err(|e| HarnessError::engine(format!("filling {}", selector), e))
}

/// Whether an element matching the selector currently exists and is visible.
pub async fn element_visible(page: &Page, selector: &str) -> Result<bool, HarnessError> {
    match page.query_selector(selector).await {
        Ok(Some(el)) => Ok(el.is_visible().await.unwrap_or(false)),
        Ok(None) => Ok(false),
        Err(e) => Err(HarnessError::engine(format!("querying {}", selector), e)),
    }
}

fn timeout_reaching_idle(url: &str, started: Instant) -> HarnessError {
    HarnessError::ConditionTimeout {
        condition: format!("network idle after navigating to {}", url),
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

/// Resolve a link href against the configured site root.
fn resolve_href(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", origin_of(base_url), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}

fn matches_any_keyword(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hrefs_resolve_against_the_site_root() {
        let base = "https://tokero.dev/en/";
        assert_eq!(
            resolve_href(base, "/en/policies/"),
            "https://tokero.dev/en/policies/"
        );
        assert_eq!(
            resolve_href(base, "gdpr/"),
            "https://tokero.dev/en/gdpr/"
        );
        assert_eq!(
            resolve_href(base, "https://elsewhere.example/terms"),
            "https://elsewhere.example/terms"
        );
    }

    #[test]
    fn keyword_matching_is_containment_and_case_sensitive() {
        let keywords = ["GDPR", "Privacy", "Cookies"];
        assert!(matches_any_keyword("Our GDPR statement", &keywords));
        assert!(matches_any_keyword("Privacy", &keywords));
        assert!(!matches_any_keyword("gdpr", &keywords));
        assert!(!matches_any_keyword("Imprint", &keywords));
    }

    #[test]
    fn language_options_select_by_code() {
        assert_eq!(
            language_option_selector("RO"),
            ".languageSwitcher_btnLabel__JjcN5:has-text('RO')"
        );
    }
}
