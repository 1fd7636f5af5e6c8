//! In-memory browser used by the integration tests.
//!
//! Pages learn their location from the `pincode` query value of the URL they
//! are sent to, then answer `evaluate` from the script registered for it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use shelfscan_scraper::{
    Browser, BrowserLauncher, BrowserPage, ContainerSnapshot, PageHarvester, ScrapeOrchestrator,
    ScraperError, SearchTarget, SessionManager,
};

#[derive(Debug, Clone)]
pub enum Navigation {
    Loads,
    Fails,
    Hangs,
}

#[derive(Debug, Clone)]
pub enum Evaluation {
    Returns(Value),
    Fails,
}

#[derive(Debug, Clone)]
pub struct PageScript {
    pub navigation: Navigation,
    pub evaluation: Evaluation,
    pub close_fails: bool,
    pub delay: Duration,
}

impl PageScript {
    pub fn with_containers(containers: Vec<ContainerSnapshot>) -> Self {
        Self {
            navigation: Navigation::Loads,
            evaluation: Evaluation::Returns(serde_json::to_value(containers).unwrap()),
            close_fails: false,
            delay: Duration::ZERO,
        }
    }

    pub fn navigation_fails() -> Self {
        Self {
            navigation: Navigation::Fails,
            ..Self::with_containers(Vec::new())
        }
    }
}

#[derive(Default)]
pub struct FakeState {
    pub scripts: Mutex<HashMap<String, PageScript>>,
    pub launches: AtomicUsize,
    pub pages_opened: AtomicUsize,
    pub pages_closed: AtomicUsize,
    pub browsers_closed: AtomicUsize,
    pub visited: Mutex<Vec<String>>,
    pub evaluated: Mutex<Vec<String>>,
    pub fail_launch: bool,
    pub fail_new_page: bool,
}

impl FakeState {
    pub fn opened(&self) -> usize {
        self.pages_opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.pages_closed.load(Ordering::SeqCst)
    }

    fn script_for(&self, url: &str) -> PageScript {
        let location = url
            .split_once("pincode=")
            .map(|(_, rest)| rest.split('&').next().unwrap_or(rest).to_owned())
            .unwrap_or_default();
        self.scripts
            .lock()
            .unwrap()
            .get(&location)
            .cloned()
            .unwrap_or_else(|| PageScript::with_containers(Vec::new()))
    }
}

#[derive(Clone)]
pub struct FakeLauncher {
    pub state: Arc<FakeState>,
}

impl FakeLauncher {
    pub fn new(scripts: Vec<(&str, PageScript)>) -> Self {
        Self::from_state(FakeState {
            scripts: Mutex::new(
                scripts
                    .into_iter()
                    .map(|(loc, script)| (loc.to_owned(), script))
                    .collect(),
            ),
            ..FakeState::default()
        })
    }

    pub fn from_state(state: FakeState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    type Browser = FakeBrowser;

    async fn launch(&self) -> Result<FakeBrowser, ScraperError> {
        self.state.launches.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_launch {
            return Err(ScraperError::BrowserLaunch {
                reason: "no chrome binary".to_owned(),
            });
        }
        Ok(FakeBrowser {
            state: Arc::clone(&self.state),
        })
    }
}

pub struct FakeBrowser {
    state: Arc<FakeState>,
}

#[async_trait]
impl Browser for FakeBrowser {
    type Page = FakePage;

    async fn new_page(&self) -> Result<FakePage, ScraperError> {
        if self.state.fail_new_page {
            return Err(ScraperError::PageOpen {
                reason: "target crashed".to_owned(),
            });
        }
        self.state.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakePage {
            state: Arc::clone(&self.state),
            script: Mutex::new(None),
        })
    }

    async fn close(self) -> Result<(), ScraperError> {
        self.state.browsers_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakePage {
    state: Arc<FakeState>,
    script: Mutex<Option<PageScript>>,
}

impl FakePage {
    fn current_script(&self) -> PageScript {
        self.script
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| PageScript::with_containers(Vec::new()))
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(&self, url: &str) -> Result<(), ScraperError> {
        self.state.visited.lock().unwrap().push(url.to_owned());
        let script = self.state.script_for(url);
        *self.script.lock().unwrap() = Some(script.clone());
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        match script.navigation {
            Navigation::Loads => Ok(()),
            Navigation::Fails => Err(ScraperError::Navigation {
                url: url.to_owned(),
                reason: "net::ERR_CONNECTION_RESET".to_owned(),
            }),
            Navigation::Hangs => std::future::pending().await,
        }
    }

    async fn evaluate(&self, function: &str) -> Result<Value, ScraperError> {
        self.state
            .evaluated
            .lock()
            .unwrap()
            .push(function.to_owned());
        match self.current_script().evaluation {
            Evaluation::Returns(value) => Ok(value),
            Evaluation::Fails => Err(ScraperError::Evaluation {
                reason: "Execution context was destroyed".to_owned(),
            }),
        }
    }

    async fn close(self) -> Result<(), ScraperError> {
        self.state.pages_closed.fetch_add(1, Ordering::SeqCst);
        if self.current_script().close_fails {
            return Err(ScraperError::PageClose {
                reason: "target already gone".to_owned(),
            });
        }
        Ok(())
    }
}

/// Listing card markup with optional price block.
pub fn card(asin: &str, name: &str, prices: Option<(&str, &str)>) -> String {
    let price_html = prices
        .map(|(sell, mrp)| {
            format!(
                r#"<span class="a-price"><span class="a-offscreen">{sell}</span></span><span class="a-price a-text-price"><span class="a-offscreen">{mrp}</span></span>"#
            )
        })
        .unwrap_or_default();
    format!(
        r#"<div class="s-result-item" data-asin="{asin}">
  <h2><a class="a-link-normal" href="/dp/{asin}"><span>{name}</span></a></h2>
  <span class="a-size-base">{name} description</span>
  {price_html}
  <div class="a-text-bold"><span>1.8 kg</span></div>
  <img class="s-image" src="https://m.media-amazon.com/images/I/{asin}.jpg" />
  <ul class="a-unordered-list"><li>16 GB RAM</li><li>512 GB SSD</li></ul>
</div>"#
    )
}

pub fn snapshots(cards: &[String]) -> Vec<ContainerSnapshot> {
    cards.iter().map(ContainerSnapshot::from_html).collect()
}

pub fn orchestrator(launcher: FakeLauncher) -> ScrapeOrchestrator<FakeLauncher> {
    let target = SearchTarget::new("https://www.amazon.in", "laptops").unwrap();
    let sessions = SessionManager::new(launcher, target);
    ScrapeOrchestrator::new(sessions, PageHarvester::new().unwrap())
}
