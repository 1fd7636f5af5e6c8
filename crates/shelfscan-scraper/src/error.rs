use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("failed to launch browser: {reason}")]
    BrowserLaunch { reason: String },

    #[error("browser is not running")]
    BrowserNotRunning,

    #[error("failed to open page: {reason}")]
    PageOpen { reason: String },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("navigation to {url} did not complete within {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    #[error("in-page evaluation failed: {reason}")]
    Evaluation { reason: String },

    #[error("unexpected harvest result shape: {source}")]
    HarvestShape {
        #[source]
        source: serde_json::Error,
    },

    #[error("page for {location} has already been released")]
    SessionReleased { location: String },

    #[error("failed to close page: {reason}")]
    PageClose { reason: String },

    #[error("failed to close browser: {reason}")]
    BrowserClose { reason: String },

    #[error("invalid search URL \"{base_url}\": {reason}")]
    InvalidSearchUrl { base_url: String, reason: String },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Failure while reading one listing container. Scoped to that container:
/// the harvester logs it and moves on to the next one.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("container could not be captured in page: {0}")]
    Snapshot(String),

    #[error("container snapshot has no element matching {selector}")]
    MissingContainer { selector: String },

    #[error("failed to read {field}: {reason}")]
    Field { field: &'static str, reason: String },
}
