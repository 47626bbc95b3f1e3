//! Protocol pipeline: code extraction, substance-set extraction and lookup.

use onco_map::{FuzzyMatcher, ProtocolResolver, ProtocolTable, ReferenceIssue, VocabularyIndex};
use onco_model::{
    FreeTextRecord, MatcherOptions, ProtocolOptions, ProtocolRecord, ProtocolReferenceEntry,
};
use onco_normalization::prepare_records;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::executor::{ProgressHook, map_records};
use crate::guard::check_completeness;
use crate::stats::RunStats;

/// Output of [`ProtocolPipeline::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolRun {
    pub records: Vec<ProtocolRecord>,
    pub stats: RunStats,
}

/// Resolves protocol free text against a protocol reference table.
pub struct ProtocolPipeline<M = VocabularyIndex> {
    resolver: ProtocolResolver<M>,
    parallel: bool,
    progress: Option<ProgressHook>,
}

impl ProtocolPipeline<VocabularyIndex> {
    /// Canonicalizes the reference rows and indexes their codes and
    /// substances.
    ///
    /// Malformed rows are returned as issues and left out of the lookup.
    pub fn from_reference(
        entries: Vec<ProtocolReferenceEntry>,
        width: usize,
        options: ProtocolOptions,
        matcher: &MatcherOptions,
    ) -> Result<(Self, Vec<ReferenceIssue>), PipelineError> {
        options.validate()?;
        matcher.validate()?;
        let (table, issues) = ProtocolTable::build(entries, width);
        info!(
            rows = table.rows().len(),
            keys = table.key_count(),
            excluded = issues.len(),
            slots = width,
            "protocol reference indexed"
        );
        let resolver = ProtocolResolver::from_table(table, options, matcher)?;
        Ok((Self::new(resolver), issues))
    }
}

impl<M: FuzzyMatcher> ProtocolPipeline<M> {
    pub fn new(resolver: ProtocolResolver<M>) -> Self {
        Self {
            resolver,
            parallel: true,
            progress: None,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_progress(mut self, progress: ProgressHook) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn resolver(&self) -> &ProtocolResolver<M> {
        &self.resolver
    }

    /// Assigns ids 1..N to `inputs`, normalizes them and resolves every record.
    pub fn run<S: AsRef<str>>(&self, inputs: &[Option<S>]) -> Result<ProtocolRun, PipelineError> {
        let records = prepare_records(inputs);
        self.run_records(&records)
    }

    /// Resolves already prepared records.
    pub fn run_records(&self, records: &[FreeTextRecord]) -> Result<ProtocolRun, PipelineError> {
        info!(records = records.len(), "protocol run started");
        let resolved = map_records(records, self.parallel, self.progress.as_ref(), |record| {
            match self.resolver.resolve(record) {
                Ok(resolved) => resolved,
                Err(error) => {
                    warn!(record = record.id.get(), %error, "matching failed, record left empty");
                    self.resolver.failed_record(record)
                }
            }
        });
        check_completeness(records, resolved.iter().map(|record| record.id))?;

        let mut stats = RunStats::default();
        for record in &resolved {
            stats.record(
                record.failed,
                record.code.is_some(),
                record.slots.names().count(),
            );
        }
        let overflow = resolved.iter().filter(|record| record.overflow).count();
        info!(
            records = stats.records,
            matched = stats.matched,
            unmatched = stats.unmatched,
            failed = stats.failed,
            substances = stats.candidates,
            overflow,
            "protocol run finished"
        );
        Ok(ProtocolRun {
            records: resolved,
            stats,
        })
    }
}
