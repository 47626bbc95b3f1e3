//! Error types for ingestion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading input or reference tables. Always fatal.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse csv {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: column {column:?} not found (available: {})", path.display(), available.join(", "))]
    MissingColumn {
        path: PathBuf,
        column: String,
        available: Vec<String>,
    },

    #[error("{}: no slot columns named {prefix}1, {prefix}2, ...", path.display())]
    NoSlotColumns { path: PathBuf, prefix: String },

    #[error(
        "{}: {configured} slot columns configured but only {found} present ({prefix}1..{prefix}{found})",
        path.display()
    )]
    SlotColumnsMissing {
        path: PathBuf,
        prefix: String,
        configured: usize,
        found: usize,
    },

    #[error("{}: column {column:?} lists no values", path.display())]
    EmptyVocabulary { path: PathBuf, column: String },
}
