use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing an output table.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("write csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("write json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("flush output: {0}")]
    Flush(#[source] std::io::Error),

    #[error("write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
