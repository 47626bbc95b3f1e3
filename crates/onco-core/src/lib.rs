//! Batch pipelines for oncomatch.
//!
//! A run assigns record ids, normalizes every record, resolves the records
//! (in parallel by default), checks that the output covers every input id
//! exactly once and reports [`RunStats`]. A matcher failure for one record
//! empties that record only.

pub mod error;
pub mod executor;
pub mod guard;
pub mod protocol;
pub mod stats;
pub mod substance;

pub use error::PipelineError;
pub use executor::ProgressHook;
pub use guard::check_completeness;
pub use protocol::{ProtocolPipeline, ProtocolRun};
pub use stats::RunStats;
pub use substance::{SubstancePipeline, SubstanceRecords, SubstanceRun};
