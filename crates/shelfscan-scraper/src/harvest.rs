//! Page-level harvesting: snapshot every listing container in the rendered
//! page, then run field extraction over each snapshot in document order.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use shelfscan_core::ListingRecord;

use crate::browser::BrowserPage;
use crate::error::{ExtractError, ScraperError};
use crate::extract::FieldExtractor;

/// Selector identifying one result-item container on the search page.
pub const CONTAINER_SELECTOR: &str = ".s-result-item";

/// What the in-page function reports for one container.
///
/// Exactly one of `html` and `error` is set: either the container's
/// `outerHTML`, or the message thrown while reading it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ContainerSnapshot {
    #[must_use]
    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            html: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug)]
pub struct PageHarvester {
    container_css: String,
    container: Selector,
    extractor: FieldExtractor,
}

impl PageHarvester {
    /// Builds a harvester for the standard result-item containers.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if a built-in selector fails
    /// to compile.
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_container_selector(CONTAINER_SELECTOR)
    }

    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if `css` (or a field
    /// selector) does not parse.
    pub fn with_container_selector(css: &str) -> Result<Self, ScraperError> {
        let container = Selector::parse(css).map_err(|e| ScraperError::InvalidSelector {
            selector: css.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            container_css: css.to_owned(),
            container,
            extractor: FieldExtractor::new()?,
        })
    }

    /// Source of the function evaluated inside the page.
    ///
    /// It closes over nothing: the selector is inlined as a JSON string
    /// literal, and the result is a plain array of [`ContainerSnapshot`]s.
    #[must_use]
    pub fn snapshot_function(&self) -> String {
        let selector = serde_json::Value::String(self.container_css.clone()).to_string();
        format!(
            r"() => Array.from(document.querySelectorAll({selector}), (element) => {{
  try {{
    return {{ html: element.outerHTML, error: null }};
  }} catch (err) {{
    return {{ html: null, error: String(err) }};
  }}
}})"
        )
    }

    /// Harvests every listing on an already-rendered page.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Evaluation`] if the in-page function fails and
    /// [`ScraperError::HarvestShape`] if its result is not a snapshot array.
    /// Individual containers that fail are skipped, not returned as errors.
    pub async fn harvest<P>(&self, page: &P) -> Result<Vec<ListingRecord>, ScraperError>
    where
        P: BrowserPage + ?Sized,
    {
        let value = page.evaluate(&self.snapshot_function()).await?;
        let snapshots: Vec<ContainerSnapshot> = serde_json::from_value(value)
            .map_err(|source| ScraperError::HarvestShape { source })?;
        Ok(self.extract_snapshots(&snapshots))
    }

    /// Runs field extraction over each snapshot, preserving order and
    /// skipping (with a warning) any container that cannot be read.
    #[must_use]
    pub fn extract_snapshots(&self, snapshots: &[ContainerSnapshot]) -> Vec<ListingRecord> {
        let mut records = Vec::with_capacity(snapshots.len());
        for (index, snapshot) in snapshots.iter().enumerate() {
            match self.extract_snapshot(snapshot) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping listing container");
                }
            }
        }
        tracing::debug!(
            containers = snapshots.len(),
            records = records.len(),
            "harvested listing containers"
        );
        records
    }

    fn extract_snapshot(
        &self,
        snapshot: &ContainerSnapshot,
    ) -> Result<ListingRecord, ExtractError> {
        let html = match (&snapshot.html, &snapshot.error) {
            (_, Some(error)) => return Err(ExtractError::Snapshot(error.clone())),
            (Some(html), None) => html,
            (None, None) => return Err(ExtractError::Snapshot("empty snapshot".to_owned())),
        };
        let fragment = Html::parse_fragment(html);
        let element = fragment
            .select(&self.container)
            .next()
            .ok_or_else(|| ExtractError::MissingContainer {
                selector: self.container_css.clone(),
            })?;
        self.extractor.extract(&element)
    }
}
