pub mod browser;
pub mod error;
pub mod extract;
pub mod harvest;
pub mod orchestrator;
pub mod session;

pub use browser::{Browser, BrowserLauncher, BrowserPage, ChromiumLauncher};
pub use error::{ExtractError, ScraperError};
pub use extract::{Field, FieldExtractor, FieldQuery, ListingElement};
pub use harvest::{ContainerSnapshot, PageHarvester, CONTAINER_SELECTOR};
pub use orchestrator::{LocationReport, ScrapeOrchestrator};
pub use session::{ScrapeSession, SearchTarget, SessionManager, SessionState};
