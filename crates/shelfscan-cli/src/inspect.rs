//! `inspect` command: read back a saved dataset.

use std::path::Path;

/// Prints the record count and the first `limit` records as JSON lines.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a line is malformed.
pub(crate) fn run_inspect(path: &Path, limit: usize) -> anyhow::Result<()> {
    let records = shelfscan_store::load(path)?;
    println!("{}: {} records", path.display(), records.len());
    for record in records.iter().take(limit) {
        println!("{}", serde_json::to_string(record)?);
    }
    if records.len() > limit {
        println!("... {} more", records.len() - limit);
    }
    Ok(())
}
