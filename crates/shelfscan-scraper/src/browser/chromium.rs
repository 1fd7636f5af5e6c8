//! Chrome/Chromium implementation of the browser capability over CDP.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::BrowserConfig;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::ScraperError;

use super::{Browser, BrowserLauncher, BrowserPage};

/// Timeout for individual CDP requests (not for page loads).
const CDP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Launches a local Chrome/Chromium through `chromiumoxide`.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    headless: bool,
    no_sandbox: bool,
    executable: Option<PathBuf>,
}

impl ChromiumLauncher {
    #[must_use]
    pub fn new(headless: bool, no_sandbox: bool, executable: Option<PathBuf>) -> Self {
        Self {
            headless,
            no_sandbox,
            executable,
        }
    }

    #[must_use]
    pub fn from_app_config(config: &shelfscan_core::AppConfig) -> Self {
        Self::new(
            config.browser_headless,
            config.browser_no_sandbox,
            config.chrome_executable.clone(),
        )
    }

    fn browser_config(&self) -> Result<BrowserConfig, ScraperError> {
        let mut builder = BrowserConfig::builder().request_timeout(CDP_REQUEST_TIMEOUT);
        if !self.headless {
            builder = builder.with_head();
        }
        if self.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder
            .build()
            .map_err(|reason| ScraperError::BrowserLaunch { reason })
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Browser = ChromiumBrowser;

    async fn launch(&self) -> Result<ChromiumBrowser, ScraperError> {
        let config = self.browser_config()?;
        let (browser, mut handler) = chromiumoxide::Browser::launch(config)
            .await
            .map_err(|e| ScraperError::BrowserLaunch {
                reason: e.to_string(),
            })?;

        // The CDP connection only makes progress while its handler is polled.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::warn!(error = %e, "chromium handler event error");
                }
            }
            tracing::debug!("chromium handler stream ended");
        });

        tracing::info!(headless = self.headless, "browser launched");
        Ok(ChromiumBrowser {
            browser,
            handler_task,
        })
    }
}

pub struct ChromiumBrowser {
    browser: chromiumoxide::Browser,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl Browser for ChromiumBrowser {
    type Page = ChromiumPage;

    async fn new_page(&self) -> Result<ChromiumPage, ScraperError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::PageOpen {
                reason: e.to_string(),
            })?;
        Ok(ChromiumPage { page })
    }

    async fn close(mut self) -> Result<(), ScraperError> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| ScraperError::BrowserClose {
                reason: e.to_string(),
            });
        if closed.is_ok() {
            if let Err(e) = self.browser.wait().await {
                tracing::warn!(error = %e, "browser process did not exit cleanly");
            }
        }
        self.handler_task.abort();
        closed
    }
}

pub struct ChromiumPage {
    page: chromiumoxide::Page,
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<(), ScraperError> {
        self.page
            .goto(url)
            .await
            .map(|_| ())
            .map_err(|e| ScraperError::Navigation {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    async fn evaluate(&self, function: &str) -> Result<serde_json::Value, ScraperError> {
        // Invoke the declaration in place so the page only ever sees a
        // self-contained expression.
        let expression = format!("({function})()");
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|e| ScraperError::Evaluation {
                reason: e.to_string(),
            })?;
        result
            .into_value::<serde_json::Value>()
            .map_err(|e| ScraperError::Evaluation {
                reason: e.to_string(),
            })
    }

    async fn close(self) -> Result<(), ScraperError> {
        self.page
            .close()
            .await
            .map_err(|e| ScraperError::PageClose {
                reason: e.to_string(),
            })
    }
}
