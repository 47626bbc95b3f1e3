//! Error types for matching operations.

use thiserror::Error;

/// Errors raised while building a matcher or matching one query.
///
/// A failure for a single query is isolated by the pipelines: the record is
/// emitted with empty results and the batch continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("vocabulary is empty after removing blank entries")]
    EmptyVocabulary,

    #[error("query has {tokens} tokens, more than the limit of {limit}")]
    QueryTooLong { tokens: usize, limit: usize },

    #[error("matcher failed: {0}")]
    Backend(String),
}
