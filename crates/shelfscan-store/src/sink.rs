use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use shelfscan_core::{ListingRecord, ResultSet};

use crate::error::StoreError;
use crate::ndjson::NdjsonWriter;

/// File name used when no destination is configured.
pub const DEFAULT_OUTPUT_FILE: &str = "scraped_data.ndjson.gz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub path: PathBuf,
    pub records: usize,
}

/// Streams a [`ResultSet`] to a gzip-compressed NDJSON file.
///
/// The pipeline is `NdjsonWriter -> GzEncoder -> BufWriter -> File`; records
/// enter one at a time in set order and each stage is finalized explicitly,
/// head first, so nothing buffered is left behind.
#[derive(Debug, Clone)]
pub struct ResultSink {
    path: PathBuf,
    compression: Compression,
}

impl ResultSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            compression: Compression::default(),
        }
    }

    /// Gzip level, clamped to 0-9.
    #[must_use]
    pub fn with_compression(mut self, level: u32) -> Self {
        self.compression = Compression::new(level.min(9));
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes every record to the destination, replacing any existing file.
    ///
    /// Records are streamed into a temporary file next to the destination,
    /// which only replaces it once fully written and synced. A failed save
    /// leaves the previous dataset in place. An empty set still produces a
    /// valid (empty) gzip stream.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be created, synced or
    /// moved into place, and any error raised while streaming records
    /// through the pipeline.
    pub fn save(&self, results: &ResultSet) -> Result<SaveSummary, StoreError> {
        let records =
            self.replace_with(|writer| write_records_with(results, writer, self.compression))?;

        tracing::info!(
            path = %self.path.display(),
            records,
            "scraped data saved"
        );
        Ok(SaveSummary {
            path: self.path.clone(),
            records,
        })
    }

    fn replace_with<F>(&self, write: F) -> Result<usize, StoreError>
    where
        F: FnOnce(BufWriter<File>) -> Result<(BufWriter<File>, usize), StoreError>,
    {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let (file, temp_path) = tempfile::Builder::new()
            .prefix(".shelfscan-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(io_err)?
            .into_parts();
        let (writer, records) = write(BufWriter::new(file))?;
        let file = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
        file.sync_all().map_err(io_err)?;
        drop(file);
        temp_path.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(records)
    }
}

/// Runs `records` through the NDJSON and gzip stages into `writer`, returning
/// `writer` once the gzip trailer has been written.
///
/// # Errors
///
/// Returns [`StoreError::Serialize`] or [`StoreError::Stream`] on failure.
pub fn write_records<'a, I, W>(records: I, writer: W) -> Result<W, StoreError>
where
    I: IntoIterator<Item = &'a ListingRecord>,
    W: Write,
{
    write_records_with(records, writer, Compression::default()).map(|(inner, _)| inner)
}

/// Same as [`write_records`], also returning how many records went out.
fn write_records_with<'a, I, W>(
    records: I,
    writer: W,
    compression: Compression,
) -> Result<(W, usize), StoreError>
where
    I: IntoIterator<Item = &'a ListingRecord>,
    W: Write,
{
    let mut lines = NdjsonWriter::new(GzEncoder::new(writer, compression));
    for record in records {
        lines.write_record(record)?;
    }
    let written = lines.written();
    let gzip = lines.finish()?;
    let mut inner = gzip.finish()?;
    inner.flush()?;
    Ok((inner, written))
}
