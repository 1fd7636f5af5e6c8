use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use shelfscan_core::ListingRecord;

use crate::error::StoreError;

/// Decompresses `reader` and parses one record per line. Blank lines are
/// skipped; line numbers in errors are 1-based.
///
/// # Errors
///
/// Returns [`StoreError::Stream`] if the stream is not valid gzip and
/// [`StoreError::Parse`] for a line that is not a record.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ListingRecord>, StoreError> {
    let lines = BufReader::new(GzDecoder::new(reader)).lines();
    let mut records = Vec::new();
    for (index, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| StoreError::Parse {
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Reads a dataset written by [`crate::ResultSink`].
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be opened, otherwise as
/// [`read_records`].
pub fn load(path: &Path) -> Result<Vec<ListingRecord>, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_records(file)
}
