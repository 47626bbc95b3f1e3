use onco_map::MatchError;
use onco_model::{OptionsError, RecordId};
use thiserror::Error;

/// Fatal pipeline errors. No output is produced when one is returned.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Options(#[from] OptionsError),

    #[error("build matcher: {0}")]
    Matcher(#[from] MatchError),

    #[error(
        "output does not cover the input exactly once: {missing} missing, {duplicated} duplicated, {unexpected} unexpected (first offending id: {first})"
    )]
    Completeness {
        missing: usize,
        duplicated: usize,
        unexpected: usize,
        first: RecordId,
    },
}
