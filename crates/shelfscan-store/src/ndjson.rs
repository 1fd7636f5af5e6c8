use std::io::Write;

use serde::Serialize;

use crate::error::StoreError;

/// Head stage of the output pipeline: one JSON document per line.
///
/// Wraps any writer (typically a compressor) and writes each record as soon
/// as it arrives. [`NdjsonWriter::finish`] flushes and hands back the inner
/// writer so the next stage can be finalized in turn.
pub struct NdjsonWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Serializes `record` followed by `\n`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialize`] if the record cannot be encoded and
    /// [`StoreError::Stream`] if the inner writer fails.
    pub fn write_record<T: Serialize>(&mut self, record: &T) -> Result<(), StoreError> {
        serde_json::to_writer(&mut self.inner, record).map_err(|source| {
            if source.is_io() {
                StoreError::Stream(source.into())
            } else {
                StoreError::Serialize {
                    index: self.written,
                    source,
                }
            }
        })?;
        self.inner.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flushes this stage and returns the inner writer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Stream`] if the flush fails.
    pub fn finish(mut self) -> Result<W, StoreError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}
