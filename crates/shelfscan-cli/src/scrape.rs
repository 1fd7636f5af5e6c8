//! `scrape` command: one browser, one page per location, one output file.

use std::path::PathBuf;

use shelfscan_core::AppConfig;
use shelfscan_scraper::{
    ChromiumLauncher, PageHarvester, ScrapeOrchestrator, SearchTarget, SessionManager,
};
use shelfscan_store::ResultSink;

/// Chooses the locations to scrape: command-line values win, otherwise the
/// configured defaults. Blank entries are dropped.
pub(crate) fn resolve_locations(cli: Vec<String>, config: &AppConfig) -> Vec<String> {
    let chosen = if cli.is_empty() {
        config.locations.clone()
    } else {
        cli
    };
    chosen
        .into_iter()
        .map(|l| l.trim().to_owned())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Runs a scrape batch and saves the results.
///
/// # Errors
///
/// Returns an error if no location is given, the browser cannot launch, or
/// the dataset cannot be written. Per-location failures are logged and
/// counted, not propagated.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    pincodes: Vec<String>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let locations = resolve_locations(pincodes, config);
    if locations.is_empty() {
        anyhow::bail!("no locations given; pass --pincode or set SHELFSCAN_LOCATIONS");
    }

    let target = SearchTarget::new(&config.search_base_url, &config.search_keyword)?;
    let sessions = SessionManager::new(ChromiumLauncher::from_app_config(config), target)
        .with_navigation_timeout(config.navigation_timeout());
    let mut orchestrator = ScrapeOrchestrator::new(sessions, PageHarvester::new()?)
        .with_max_concurrent(config.max_concurrent_locations);

    orchestrator.start().await?;
    let reports = orchestrator.scrape_locations(locations.as_slice()).await;
    if let Err(e) = orchestrator.shutdown().await {
        tracing::warn!(error = %e, "browser did not shut down cleanly");
    }

    let results = orchestrator.take_results();
    let sink = ResultSink::new(output.unwrap_or_else(|| config.output_path.clone()))
        .with_compression(config.gzip_level);
    let summary = tokio::task::spawn_blocking(move || sink.save(&results)).await??;

    let failed = reports.iter().filter(|r| !r.succeeded()).count();
    for report in &reports {
        match &report.error {
            None => println!("{}: {} records", report.location, report.records_added),
            Some(e) => println!("{}: failed at {} ({e})", report.location, report.furthest),
        }
    }
    println!(
        "saved {} records from {} locations ({failed} failed) to {}",
        summary.records,
        reports.len(),
        summary.path.display()
    );
    Ok(())
}
