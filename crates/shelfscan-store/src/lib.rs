//! Persistence for harvested listings: gzip-compressed NDJSON.
//!
//! One record per line, in result-set order, inside a single gzip stream.
//! Consumers decompress and parse line by line.

pub mod error;
pub mod ndjson;
pub mod reader;
pub mod sink;

pub use error::StoreError;
pub use ndjson::NdjsonWriter;
pub use reader::{load, read_records};
pub use sink::{write_records, ResultSink, SaveSummary, DEFAULT_OUTPUT_FILE};
