//! Browser session lifecycle
//!
//! Launching engines, opening isolated contexts, and deterministic teardown.
//! The engine process is the shared resource; contexts and pages are owned
//! exclusively by one session each.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, info, warn};
use playwright::api::{Browser, BrowserContext, Page};
use playwright::Playwright;

use crate::config::HarnessConfig;
use crate::error::HarnessError;

/// First-run consent banner; absence is not an error.
const COOKIE_CONSENT_SELECTOR: &str = "text=Accept all cookies";

/// Browser engine to drive. Resolved once at session creation; call sites
/// never dispatch on engine names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Engine {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Engine {
    /// All supported engines, for parametrized runs.
    pub fn all() -> [Engine; 3] {
        [Engine::Chromium, Engine::Firefox, Engine::Webkit]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Chromium => "chromium",
            Engine::Firefox => "firefox",
            Engine::Webkit => "webkit",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chromium" => Ok(Engine::Chromium),
            "firefox" => Ok(Engine::Firefox),
            "webkit" => Ok(Engine::Webkit),
            other => Err(format!(
                "unknown engine \"{}\" (expected chromium, firefox or webkit)",
                other
            )),
        }
    }
}

/// A running engine: the Playwright driver plus one launched browser
/// process. Shared by reference across every session attached to it within
/// a run; closed only by the last holder.
pub struct EngineHandle {
    engine: Engine,
    // Keeps the driver process alive for the lifetime of the browser.
    #[allow(dead_code)]
    playwright: Playwright,
    browser: Browser,
}

impl EngineHandle {
    /// Start the engine process.
    pub async fn start(engine: Engine, headless: bool) -> Result<EngineHandle, HarnessError> {
        let playwright = Playwright::initialize()
            .await
            .map_err(|e| HarnessError::Launch(format!("playwright driver init failed: {}", e)))?;

        let browser_type = match engine {
            Engine::Chromium => playwright.chromium(),
            Engine::Firefox => playwright.firefox(),
            Engine::Webkit => playwright.webkit(),
        };

        let mut launcher = browser_type.launcher().headless(headless);

        let executable = chromium_executable_override(engine);
        if let Some(ref path) = executable {
            info!("Using browser executable from env: {}", path.display());
            launcher = launcher.executable(path);
        }

        let args = launch_args(engine);
        if !args.is_empty() {
            launcher = launcher.args(&args);
        }

        let browser = launcher
            .launch()
            .await
            .map_err(|e| HarnessError::Launch(format!("{} failed to start: {}", engine, e)))?;

        info!("Launched {} (headless: {})", engine, headless);

        Ok(EngineHandle {
            engine,
            playwright,
            browser,
        })
    }

    /// Shut down the browser process. Errors are logged, not surfaced: the
    /// teardown path must never mask the failure that led here.
    pub async fn close(&self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close {} browser: {}", self.engine, e);
        } else {
            debug!("Closed {} browser", self.engine);
        }
    }
}

/// Explicit executable override, for driving a system-installed Chromium.
fn chromium_executable_override(engine: Engine) -> Option<PathBuf> {
    if engine != Engine::Chromium {
        return None;
    }
    std::env::var("TOKERO_CHROMIUM_EXECUTABLE")
        .ok()
        .map(PathBuf::from)
}

fn launch_args(engine: Engine) -> Vec<String> {
    match engine {
        Engine::Chromium => vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
        ],
        _ => Vec::new(),
    }
}

/// An isolated browsing context plus its page, bound to a shared engine
/// handle. Cookies, storage and cache are private to the context even when
/// the engine process is shared.
pub struct Session {
    engine: Arc<EngineHandle>,
    context: BrowserContext,
    page: Page,
    closed: bool,
}

impl Session {
    /// The session's page. Invariant: never used after `close`.
    pub fn page(&self) -> &Page {
        debug_assert!(!self.closed, "session page used after close");
        &self.page
    }

    /// Open a secondary page in this session's context (shared cookies and
    /// storage, isolated from the parent page) and navigate it to `url`
    /// within the deadline. The caller owns the page, including any further
    /// waits on it, and must close it before the session closes.
    pub async fn open_page(&self, url: &str, timeout_ms: u64) -> Result<Page, HarnessError> {
        let page = self
            .context
            .new_page()
            .await
            .map_err(|e| HarnessError::engine("opening secondary page", e))?;

        let navigated = page
            .goto_builder(url)
            .timeout(timeout_ms as f64)
            .goto()
            .await;

        if let Err(e) = navigated {
            // No orphan page on the failure path.
            close_page(&page).await;
            return Err(HarnessError::engine(
                format!("navigating secondary page to {}", url),
                e,
            ));
        }

        Ok(page)
    }

    /// Close the context, then the engine if this session holds the last
    /// reference to it. Closing an already-closed session is a no-op.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.context.close().await {
            warn!("Failed to close browser context: {}", e);
        }

        // The engine is shared; only the last holder shuts it down.
        if Arc::strong_count(&self.engine) == 1 {
            self.engine.close().await;
        }
    }
}

/// Launches engines and hands out isolated sessions. One factory per run;
/// engine processes are cached per variant and reused by later launches.
pub struct SessionFactory {
    config: HarnessConfig,
    engines: HashMap<Engine, Arc<EngineHandle>>,
}

impl SessionFactory {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            engines: HashMap::new(),
        }
    }

    /// Start (or reuse) the engine, open an isolated context and page,
    /// navigate to `start_url` and dismiss the cookie banner if present.
    pub async fn launch(
        &mut self,
        engine: Engine,
        start_url: &str,
    ) -> Result<Session, HarnessError> {
        let handle = self.handle(engine).await?;
        Self::attach(&handle, start_url, &self.config).await
    }

    /// Open a new session against an already-running engine handle, for
    /// scenarios spawning several sessions against one engine instance.
    pub async fn attach(
        handle: &Arc<EngineHandle>,
        start_url: &str,
        config: &HarnessConfig,
    ) -> Result<Session, HarnessError> {
        let context = handle
            .browser
            .context_builder()
            .build()
            .await
            .map_err(|e| HarnessError::Launch(format!("failed to open browser context: {}", e)))?;

        let page = context
            .new_page()
            .await
            .map_err(|e| HarnessError::Launch(format!("failed to open page: {}", e)))?;

        page.goto_builder(start_url)
            .timeout(config.nav_timeout_ms as f64)
            .goto()
            .await
            .map_err(|e| {
                HarnessError::Launch(format!("initial navigation to {} failed: {}", start_url, e))
            })?;

        let session = Session {
            engine: handle.clone(),
            context,
            page,
            closed: false,
        };

        accept_cookies_if_visible(session.page()).await;

        Ok(session)
    }

    /// Engine handle for `engine`, starting it on first use this run.
    pub async fn handle(&mut self, engine: Engine) -> Result<Arc<EngineHandle>, HarnessError> {
        if let Some(handle) = self.engines.get(&engine) {
            return Ok(handle.clone());
        }
        let handle = Arc::new(EngineHandle::start(engine, self.config.headless).await?);
        self.engines.insert(engine, handle.clone());
        Ok(handle)
    }

    /// Close every cached engine no live session still references. A handle
    /// still in use is left open and logged.
    pub async fn shutdown(&mut self) {
        for (engine, handle) in self.engines.drain() {
            match Arc::try_unwrap(handle) {
                Ok(handle) => handle.close().await,
                Err(_) => warn!("{} still referenced by a live session; leaving it open", engine),
            }
        }
    }
}

/// Dismiss the cookie consent banner if it is showing. Best-effort: absence
/// of the banner is the normal case after the first visit.
pub async fn accept_cookies_if_visible(page: &Page) {
    match page.query_selector(COOKIE_CONSENT_SELECTOR).await {
        Ok(Some(button)) => {
            if button.is_visible().await.unwrap_or(false) {
                if let Err(e) = button.click_builder().click().await {
                    warn!("Cookie banner was visible but could not be clicked: {}", e);
                } else {
                    debug!("Dismissed cookie consent banner");
                }
            }
        }
        Ok(None) => {}
        Err(e) => debug!("Cookie banner probe failed: {}", e),
    }
}

/// Close a page on a teardown path, logging rather than failing.
pub async fn close_page(page: &Page) {
    if let Err(e) = page.close(None).await {
        warn!("Failed to close page: {}", e);
    }
}

/// Download the Playwright driver and browser builds. One-time setup, the
/// equivalent of the engine install step on CI hosts.
pub async fn install_browsers() -> Result<(), HarnessError> {
    let playwright = Playwright::initialize()
        .await
        .map_err(|e| HarnessError::Launch(format!("playwright driver init failed: {}", e)))?;
    playwright
        .prepare()
        .map_err(|e| HarnessError::Launch(format!("browser install failed: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_parses_case_insensitively() {
        assert_eq!("chromium".parse::<Engine>().unwrap(), Engine::Chromium);
        assert_eq!("Firefox".parse::<Engine>().unwrap(), Engine::Firefox);
        assert_eq!("WEBKIT".parse::<Engine>().unwrap(), Engine::Webkit);
        assert!("edge".parse::<Engine>().is_err());
    }

    #[test]
    fn engine_round_trips_through_its_name() {
        for engine in Engine::all() {
            assert_eq!(engine.as_str().parse::<Engine>().unwrap(), engine);
        }
    }

    #[test]
    fn the_variant_set_is_closed() {
        let all = Engine::all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], Engine::Chromium);
    }

    #[test]
    fn only_chromium_gets_launch_args() {
        assert!(!launch_args(Engine::Chromium).is_empty());
        assert!(launch_args(Engine::Firefox).is_empty());
        assert!(launch_args(Engine::Webkit).is_empty());
    }

    #[test]
    fn executable_override_only_applies_to_chromium() {
        // Env var unset in the test environment either way; the engine gate
        // must short-circuit before the lookup.
        assert_eq!(chromium_executable_override(Engine::Firefox), None);
        assert_eq!(chromium_executable_override(Engine::Webkit), None);
    }
}
