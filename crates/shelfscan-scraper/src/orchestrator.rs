//! Multi-location scrape coordination.
//!
//! Failures are isolated at the smallest unit that keeps the batch moving:
//! a bad container is skipped by the harvester, a bad location contributes
//! zero records here, and only a browser that cannot launch stops the batch.

use futures::stream::{self, StreamExt};
use shelfscan_core::{ListingRecord, ResultSet};

use crate::browser::BrowserLauncher;
use crate::error::ScraperError;
use crate::harvest::PageHarvester;
use crate::session::{PageOf, ScrapeSession, SessionManager, SessionState};

/// Outcome of scraping one location.
#[derive(Debug)]
pub struct LocationReport {
    pub location: String,
    /// Furthest state reached before the session was closed. Every report
    /// is produced after the close, so the current state is always
    /// [`SessionState::SessionClosed`].
    pub furthest: SessionState,
    pub records_added: usize,
    /// Open, navigation or harvest failure, if any. Page-close failures are
    /// logged and never replace this.
    pub error: Option<ScraperError>,
}

impl LocationReport {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

pub struct ScrapeOrchestrator<L: BrowserLauncher> {
    sessions: SessionManager<L>,
    harvester: PageHarvester,
    results: ResultSet,
    max_concurrent: usize,
}

impl<L: BrowserLauncher> ScrapeOrchestrator<L> {
    #[must_use]
    pub fn new(sessions: SessionManager<L>, harvester: PageHarvester) -> Self {
        Self {
            sessions,
            harvester,
            results: ResultSet::new(),
            max_concurrent: 1,
        }
    }

    /// Number of locations scraped at once by [`Self::scrape_locations`].
    /// Values below 1 are treated as 1.
    #[must_use]
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Launches the shared browser.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::BrowserLaunch`]; the batch cannot proceed.
    pub async fn start(&mut self) -> Result<(), ScraperError> {
        self.sessions.launch_browser().await
    }

    /// Closes the shared browser. Safe to call when it was never started.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::BrowserClose`] if the engine fails to close.
    pub async fn shutdown(&mut self) -> Result<(), ScraperError> {
        self.sessions.shutdown_browser().await
    }

    /// Scrapes one location and appends its records.
    ///
    /// Never fails: errors are logged and carried in the report.
    pub async fn scrape_for_location(&mut self, location: &str) -> LocationReport {
        let (report, records) = self.run_location(location).await;
        self.results.extend(records);
        report
    }

    /// Scrapes several locations, up to `max_concurrent` at a time.
    ///
    /// Each task owns its page; only this method appends to the result set,
    /// in the order `locations` were given, regardless of completion order.
    pub async fn scrape_locations<S>(&mut self, locations: &[S]) -> Vec<LocationReport>
    where
        S: AsRef<str>,
    {
        let this = &*self;
        let outcomes: Vec<(LocationReport, Vec<ListingRecord>)> = stream::iter(locations)
            .map(|location| this.run_location(location.as_ref()))
            .buffered(this.max_concurrent)
            .collect()
            .await;

        let mut reports = Vec::with_capacity(outcomes.len());
        for (report, records) in outcomes {
            self.results.extend(records);
            reports.push(report);
        }

        let failed = reports.iter().filter(|r| !r.succeeded()).count();
        if failed > 0 {
            tracing::warn!(
                failed,
                total = reports.len(),
                "some locations failed during scrape"
            );
        }
        reports
    }

    #[must_use]
    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Hands over the accumulated records, leaving an empty set behind.
    pub fn take_results(&mut self) -> ResultSet {
        std::mem::take(&mut self.results)
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionManager<L> {
        &self.sessions
    }

    async fn run_location(&self, location: &str) -> (LocationReport, Vec<ListingRecord>) {
        tracing::info!(location, "scraping location");

        let mut session = match self.sessions.open(location).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(location, error = %e, "failed to open session");
                let report = LocationReport {
                    location: location.to_owned(),
                    furthest: SessionState::Idle,
                    records_added: 0,
                    error: Some(e),
                };
                return (report, Vec::new());
            }
        };

        // Nothing between open and close may return early. If this future is
        // dropped mid-flight the session's own drop closes the page.
        let harvested = self.navigate_and_harvest(&mut session).await;
        let furthest = session.state();
        let closed = self.sessions.close(session).await;

        let (records, error) = match harvested {
            Ok(records) => {
                if let Err(e) = &closed {
                    tracing::warn!(location, error = %e, "failed to close page after harvest");
                }
                (records, None)
            }
            Err(e) => {
                tracing::error!(location, stage = %furthest, error = %e, "scrape failed");
                if let Err(close_err) = &closed {
                    tracing::warn!(
                        location,
                        error = %close_err,
                        "failed to close page after scrape failure"
                    );
                }
                (Vec::new(), Some(e))
            }
        };

        tracing::info!(location, records = records.len(), "location done");
        let report = LocationReport {
            location: location.to_owned(),
            furthest,
            records_added: records.len(),
            error,
        };
        (report, records)
    }

    async fn navigate_and_harvest(
        &self,
        session: &mut ScrapeSession<PageOf<L>>,
    ) -> Result<Vec<ListingRecord>, ScraperError> {
        self.sessions.navigate(session).await?;
        let records = self.harvester.harvest(session.page()?).await?;
        session.mark_harvested();
        Ok(records)
    }
}
