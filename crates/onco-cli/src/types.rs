use std::path::PathBuf;
use std::time::Duration;

use onco_core::RunStats;
use onco_map::ReferenceIssue;
use onco_model::OutputMode;
use onco_output::OutputFormat;

/// What a batch command did, for the summary table.
#[derive(Debug)]
pub struct RunSummary {
    pub command: &'static str,
    /// Substance output mode; `None` for protocol runs.
    pub mode: Option<OutputMode>,
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub stats: RunStats,
    /// Reference rows left out of the lookup.
    pub reference_issues: Vec<ReferenceIssue>,
    pub elapsed: Duration,
}
