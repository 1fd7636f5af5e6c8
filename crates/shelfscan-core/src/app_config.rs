use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    /// Scheme and host of the search endpoint, e.g. `"https://www.amazon.in"`.
    pub search_base_url: String,
    /// Static `k=` keyword sent with every search.
    pub search_keyword: String,
    pub output_path: PathBuf,
    /// Location parameters used when none are passed on the command line.
    pub locations: Vec<String>,
    pub browser_headless: bool,
    pub browser_no_sandbox: bool,
    pub chrome_executable: Option<PathBuf>,
    /// `0` disables the navigation bound.
    pub navigation_timeout_secs: u64,
    pub max_concurrent_locations: usize,
    pub gzip_level: u32,
}

impl AppConfig {
    /// Returns the navigation bound, or `None` when it is disabled.
    #[must_use]
    pub fn navigation_timeout(&self) -> Option<Duration> {
        (self.navigation_timeout_secs > 0)
            .then_some(Duration::from_secs(self.navigation_timeout_secs))
    }
}
