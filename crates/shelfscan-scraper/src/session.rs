//! Browser and page lifecycle.
//!
//! [`SessionManager`] owns the single shared browser instance and hands out
//! [`ScrapeSession`]s, each one page bound to one location parameter. A
//! session should be passed back to [`SessionManager::close`]; one that is
//! dropped instead (cancelled task, panic) closes its page in the background.

use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::browser::{Browser, BrowserLauncher, BrowserPage};
use crate::error::ScraperError;

/// Page type produced by a launcher's browser.
pub type PageOf<L> = <<L as BrowserLauncher>::Browser as Browser>::Page;

/// Per-location lifecycle.
///
/// Normal progression is `Idle → SessionOpen → Navigated → Harvested →
/// SessionClosed`; any stage may jump straight to `SessionClosed` on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    Idle,
    SessionOpen,
    Navigated,
    Harvested,
    SessionClosed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::SessionOpen => write!(f, "session_open"),
            SessionState::Navigated => write!(f, "navigated"),
            SessionState::Harvested => write!(f, "harvested"),
            SessionState::SessionClosed => write!(f, "session_closed"),
        }
    }
}

/// Builds search URLs of the form `<base>/s?k=<keyword>&pincode=<location>`.
#[derive(Debug, Clone)]
pub struct SearchTarget {
    base: url::Url,
    keyword: String,
}

impl SearchTarget {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSearchUrl`] if `base_url` is not an
    /// absolute http(s) URL.
    pub fn new(base_url: &str, keyword: &str) -> Result<Self, ScraperError> {
        let invalid = |reason: String| ScraperError::InvalidSearchUrl {
            base_url: base_url.to_owned(),
            reason,
        };
        let mut base = url::Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme \"{}\"", base.scheme())));
        }
        base.set_path("/s");
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self {
            base,
            keyword: keyword.to_owned(),
        })
    }

    /// Search URL for one location parameter.
    ///
    /// Query values are form-encoded; numeric pincodes come through unchanged.
    #[must_use]
    pub fn url_for(&self, location: &str) -> String {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("k", &self.keyword)
            .append_pair("pincode", location);
        url.to_string()
    }
}

/// One page bound to one location.
///
/// Owns the page until [`SessionManager::close`] takes it. If the session is
/// dropped while still holding the page, the close is spawned on the runtime
/// that opened it.
pub struct ScrapeSession<P: BrowserPage + 'static> {
    page: Option<P>,
    location: String,
    state: SessionState,
    runtime: Option<Handle>,
}

impl<P: BrowserPage + 'static> ScrapeSession<P> {
    /// # Errors
    ///
    /// Returns [`ScraperError::SessionReleased`] once the page has been
    /// handed back for closing.
    pub fn page(&self) -> Result<&P, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::SessionReleased {
                location: self.location.clone(),
            })
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Records that the page has been harvested.
    pub fn mark_harvested(&mut self) {
        self.state = SessionState::Harvested;
    }
}

impl<P: BrowserPage + 'static> Drop for ScrapeSession<P> {
    fn drop(&mut self) {
        let Some(page) = self.page.take() else {
            return;
        };
        let location = std::mem::take(&mut self.location);
        let Some(runtime) = self.runtime.take() else {
            tracing::warn!(
                location = %location,
                "session dropped outside a runtime; page left open"
            );
            return;
        };
        tracing::warn!(
            location = %location,
            last_state = %self.state,
            "session dropped before close; closing page in background"
        );
        runtime.spawn(async move {
            if let Err(e) = page.close().await {
                tracing::warn!(location = %location, error = %e, "background page close failed");
            }
        });
    }
}

pub struct SessionManager<L: BrowserLauncher> {
    launcher: L,
    browser: Option<L::Browser>,
    target: SearchTarget,
    navigation_timeout: Option<Duration>,
}

impl<L: BrowserLauncher> SessionManager<L> {
    #[must_use]
    pub fn new(launcher: L, target: SearchTarget) -> Self {
        Self {
            launcher,
            browser: None,
            target,
            navigation_timeout: None,
        }
    }

    /// Bounds each navigation; `None` waits for the engine's own load signal
    /// however long it takes.
    #[must_use]
    pub fn with_navigation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.browser.is_some()
    }

    /// Starts the shared browser. Does nothing if one is already running.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::BrowserLaunch`] if the engine cannot start.
    pub async fn launch_browser(&mut self) -> Result<(), ScraperError> {
        if self.browser.is_some() {
            tracing::debug!("browser already running");
            return Ok(());
        }
        let browser = self.launcher.launch().await.map_err(|e| match e {
            ScraperError::BrowserLaunch { .. } => e,
            other => ScraperError::BrowserLaunch {
                reason: other.to_string(),
            },
        })?;
        self.browser = Some(browser);
        Ok(())
    }

    /// Closes the shared browser. Does nothing if none is running.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::BrowserClose`] if the engine reports a close
    /// failure. The instance is released either way.
    pub async fn shutdown_browser(&mut self) -> Result<(), ScraperError> {
        let Some(browser) = self.browser.take() else {
            return Ok(());
        };
        browser.close().await?;
        tracing::info!("browser shut down");
        Ok(())
    }

    /// Opens a new page for `location`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::BrowserNotRunning`] before `launch_browser`,
    /// or the engine's page-creation error.
    pub async fn open(&self, location: &str) -> Result<ScrapeSession<PageOf<L>>, ScraperError> {
        let browser = self.browser.as_ref().ok_or(ScraperError::BrowserNotRunning)?;
        let page = browser.new_page().await?;
        tracing::debug!(location, "session opened");
        Ok(ScrapeSession {
            page: Some(page),
            location: location.to_owned(),
            state: SessionState::SessionOpen,
            runtime: Handle::try_current().ok(),
        })
    }

    /// Navigates the session's page to the search URL for its location.
    ///
    /// # Errors
    ///
    /// Returns the engine's navigation error, or
    /// [`ScraperError::NavigationTimeout`] when the configured bound elapses.
    pub async fn navigate(
        &self,
        session: &mut ScrapeSession<PageOf<L>>,
    ) -> Result<String, ScraperError> {
        let url = self.target.url_for(&session.location);
        tracing::info!(location = %session.location, url = %url, "navigating");
        let page = session.page()?;
        match self.navigation_timeout {
            Some(limit) => tokio::time::timeout(limit, page.goto(&url))
                .await
                .map_err(|_| ScraperError::NavigationTimeout {
                    url: url.clone(),
                    timeout_secs: limit.as_secs(),
                })??,
            None => page.goto(&url).await?,
        }
        session.state = SessionState::Navigated;
        Ok(url)
    }

    /// Releases the session's page.
    ///
    /// # Errors
    ///
    /// Returns the engine's page-close error. The session is consumed
    /// regardless, so a page can never be closed twice.
    pub async fn close(&self, mut session: ScrapeSession<PageOf<L>>) -> Result<(), ScraperError> {
        let Some(page) = session.page.take() else {
            return Ok(());
        };
        let result = page.close().await;
        tracing::debug!(
            location = %session.location,
            last_state = %session.state,
            "session closed"
        );
        result
    }
}
