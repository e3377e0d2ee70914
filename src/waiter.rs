//! Condition waiting
//!
//! The single place wait/poll/timeout policy lives: every asynchronous
//! boundary in the harness resolves through here, so flakiness handling is
//! defined once. Element and text waits use the engine's native wait
//! primitive; network idle is detected by polling the page's resource-timing
//! entries for a quiescence window.

use std::fmt;
use std::time::{Duration, Instant};

use playwright::api::Page;

use crate::error::HarnessError;

/// Quiescence window: no new network activity for this long counts as idle.
const NETWORK_IDLE_WINDOW_MS: u64 = 500;

/// Poll interval bounds for conditions without a native engine wait.
const POLL_INITIAL_MS: u64 = 100;
const POLL_MAX_MS: u64 = 250;

/// A named condition a flow can wait on.
///
/// Conditions carry no deadline themselves; `wait_for` requires one, so an
/// unbounded wait is unrepresentable.
#[derive(Debug, Clone)]
pub enum WaitCondition {
    /// An element matching the selector is attached and visible
    ElementVisible { selector: String },
    /// The given text is present somewhere on the page
    TextPresent { text: String },
    /// No network activity observed for the quiescence window
    NetworkIdle,
    /// Explicit bounded pause, for states with no observable completion signal
    Timeout(Duration),
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitCondition::ElementVisible { selector } => {
                write!(f, "element visible: {}", selector)
            }
            WaitCondition::TextPresent { text } => write!(f, "text present: \"{}\"", text),
            WaitCondition::NetworkIdle => write!(f, "network idle"),
            WaitCondition::Timeout(pause) => write!(f, "fixed pause of {}ms", pause.as_millis()),
        }
    }
}

/// Selector-engine syntax for matching an element by its text.
pub(crate) fn text_selector(text: &str) -> String {
    format!("text={}", text)
}

/// Wait until `condition` holds on `page`, or fail with `ConditionTimeout`
/// once `deadline` elapses. Returns the elapsed time on success so callers
/// can assert on timing.
pub async fn wait_for(
    page: &Page,
    condition: WaitCondition,
    deadline: Duration,
) -> Result<Duration, HarnessError> {
    let started = Instant::now();

    match &condition {
        WaitCondition::ElementVisible { selector } => {
            wait_for_selector(page, selector, &condition, deadline, started).await
        }
        WaitCondition::TextPresent { text } => {
            let selector = text_selector(text);
            wait_for_selector(page, &selector, &condition, deadline, started).await
        }
        WaitCondition::NetworkIdle => wait_for_network_idle(page, &condition, deadline, started).await,
        WaitCondition::Timeout(pause) => {
            // Last resort for debounced UI with no completion signal; still
            // bounded by the caller's deadline.
            tokio::time::sleep((*pause).min(deadline)).await;
            Ok(started.elapsed())
        }
    }
}

/// Wait until ANY of `candidates` is present and visible. First match wins;
/// the set is unordered. Candidates are polled uniformly so an early
/// candidate's absence cannot starve a later one.
pub async fn wait_for_any_text(
    page: &Page,
    candidates: &[&str],
    deadline: Duration,
) -> Result<String, HarnessError> {
    let started = Instant::now();
    let mut interval = POLL_INITIAL_MS;

    loop {
        for text in candidates {
            if text_is_visible(page, text).await? {
                return Ok((*text).to_string());
            }
        }

        if started.elapsed() >= deadline {
            return Err(HarnessError::ConditionTimeout {
                condition: format!("any of {:?} present", candidates),
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        }

        sleep_within(interval, deadline, started).await;
        interval = next_interval(interval);
    }
}

/// Whether an element with the given text currently exists and is visible.
pub async fn text_is_visible(page: &Page, text: &str) -> Result<bool, HarnessError> {
    let selector = text_selector(text);
    match page.query_selector(&selector).await {
        Ok(Some(el)) => Ok(el.is_visible().await.unwrap_or(false)),
        Ok(None) => Ok(false),
        Err(e) => Err(HarnessError::engine(
            format!("querying {}", selector),
            e,
        )),
    }
}

async fn wait_for_selector(
    page: &Page,
    selector: &str,
    condition: &WaitCondition,
    deadline: Duration,
    started: Instant,
) -> Result<Duration, HarnessError> {
    let result = page
        .wait_for_selector_builder(selector)
        .timeout(deadline.as_millis() as f64)
        .wait_for_selector()
        .await;

    // The engine reports deadline expiry as an error; either shape means the
    // condition never held in time.
    match result {
        Ok(Some(_)) => Ok(started.elapsed()),
        Ok(None) | Err(_) => Err(timeout_error(condition, started)),
    }
}

/// Idle means the resource-timing entry count has not grown for the
/// quiescence window.
async fn wait_for_network_idle(
    page: &Page,
    condition: &WaitCondition,
    deadline: Duration,
    started: Instant,
) -> Result<Duration, HarnessError> {
    let mut interval = POLL_INITIAL_MS;
    let mut last_count: Option<u64> = None;
    let mut quiet_since = Instant::now();

    loop {
        let count = resource_count(page).await?;
        match last_count {
            Some(prev) if prev == count => {
                if quiet_since.elapsed() >= Duration::from_millis(NETWORK_IDLE_WINDOW_MS) {
                    return Ok(started.elapsed());
                }
            }
            _ => {
                last_count = Some(count);
                quiet_since = Instant::now();
            }
        }

        if started.elapsed() >= deadline {
            return Err(timeout_error(condition, started));
        }

        sleep_within(interval, deadline, started).await;
        interval = next_interval(interval);
    }
}

async fn resource_count(page: &Page) -> Result<u64, HarnessError> {
    page.evaluate("() => performance.getEntriesByType('resource').length", ())
        .await
        .map_err(|e| HarnessError::engine("reading resource timing entries", e))
}

/// Sleep one poll interval, clamped so we never overshoot the deadline by
/// more than the interval itself.
async fn sleep_within(interval_ms: u64, deadline: Duration, started: Instant) {
    let remaining = deadline.saturating_sub(started.elapsed());
    let pause = Duration::from_millis(interval_ms).min(remaining);
    if !pause.is_zero() {
        tokio::time::sleep(pause).await;
    }
}

fn next_interval(interval_ms: u64) -> u64 {
    (interval_ms * 3 / 2).min(POLL_MAX_MS)
}

fn timeout_error(condition: &WaitCondition, started: Instant) -> HarnessError {
    HarnessError::ConditionTimeout {
        condition: condition.to_string(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditions_describe_themselves() {
        let visible = WaitCondition::ElementVisible {
            selector: "#contact-form-message-error".into(),
        };
        assert_eq!(
            visible.to_string(),
            "element visible: #contact-form-message-error"
        );

        let text = WaitCondition::TextPresent {
            text: "Create account".into(),
        };
        assert_eq!(text.to_string(), "text present: \"Create account\"");

        assert_eq!(WaitCondition::NetworkIdle.to_string(), "network idle");
        assert_eq!(
            WaitCondition::Timeout(Duration::from_millis(5000)).to_string(),
            "fixed pause of 5000ms"
        );
    }

    #[test]
    fn text_selector_uses_the_text_engine() {
        assert_eq!(text_selector("GDPR"), "text=GDPR");
    }

    #[test]
    fn poll_interval_backs_off_to_the_cap() {
        let mut interval = POLL_INITIAL_MS;
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(interval);
            interval = next_interval(interval);
        }
        assert_eq!(seen, vec![100, 150, 225, 250, 250]);
    }

    #[tokio::test]
    async fn sleep_within_never_overshoots_the_deadline() {
        let started = Instant::now();
        // Deadline already passed: must return without sleeping.
        sleep_within(POLL_MAX_MS, Duration::from_millis(0), started).await;
        assert!(started.elapsed() < Duration::from_millis(POLL_MAX_MS));
    }
}
