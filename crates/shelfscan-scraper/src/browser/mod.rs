//! Browser capability consumed by the scraper.
//!
//! The engine itself is opaque: it can start, hand out pages, navigate a page,
//! run a function inside the page and hand back its JSON result, and close.
//! [`ChromiumLauncher`] drives a real Chrome over CDP; tests plug in fakes.

mod chromium;

use async_trait::async_trait;

use crate::error::ScraperError;

pub use chromium::{ChromiumBrowser, ChromiumLauncher, ChromiumPage};

/// Starts a browser engine instance.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Browser: Browser;

    /// # Errors
    ///
    /// Returns [`ScraperError::BrowserLaunch`] if the engine cannot start.
    async fn launch(&self) -> Result<Self::Browser, ScraperError>;
}

/// A running browser instance, shared by every in-flight scrape.
///
/// `new_page` takes `&self` so several tasks can open pages concurrently.
#[async_trait]
pub trait Browser: Send + Sync {
    type Page: BrowserPage + 'static;

    async fn new_page(&self) -> Result<Self::Page, ScraperError>;

    async fn close(self) -> Result<(), ScraperError>;
}

/// One page, exclusively owned by a single scrape task.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigates and resolves once the engine reports the load complete.
    async fn goto(&self, url: &str) -> Result<(), ScraperError>;

    /// Runs `function` (a JS function declaration taking no arguments) in
    /// the page and returns its JSON-serializable result.
    ///
    /// The function must not capture anything from outside the page: only
    /// its source crosses into the page, only JSON comes back.
    async fn evaluate(&self, function: &str) -> Result<serde_json::Value, ScraperError>;

    async fn close(self) -> Result<(), ScraperError>;
}
