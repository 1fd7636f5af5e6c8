use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stream error: {0}")]
    Stream(#[from] std::io::Error),

    #[error("failed to serialize record {index}: {source}")]
    Serialize {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
