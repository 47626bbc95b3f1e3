//! Substance pipeline: normalize, match, select or collapse.

use onco_map::{Collapser, FuzzyMatcher, VocabularyIndex, filter_threshold, select_candidates};
use onco_model::{
    CollapsedRecord, FreeTextRecord, MatcherOptions, OutputMode, ResolvedSubstanceRecord,
    SubstanceOptions,
};
use onco_normalization::prepare_records;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::executor::{ProgressHook, map_records};
use crate::guard::check_completeness;
use crate::stats::RunStats;

/// Result rows of a substance run, shaped by the output mode.
#[derive(Debug, Clone, PartialEq)]
pub enum SubstanceRecords {
    /// Atomic and multi-hit modes.
    Resolved(Vec<ResolvedSubstanceRecord>),
    /// Legacy collapsed mode.
    Collapsed(Vec<CollapsedRecord>),
}

impl SubstanceRecords {
    pub fn len(&self) -> usize {
        match self {
            Self::Resolved(records) => records.len(),
            Self::Collapsed(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Output of [`SubstancePipeline::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubstanceRun {
    pub mode: OutputMode,
    pub records: SubstanceRecords,
    pub stats: RunStats,
}

/// Resolves substance free text against one vocabulary.
pub struct SubstancePipeline<M = VocabularyIndex> {
    matcher: M,
    options: SubstanceOptions,
    collapser: Collapser,
    parallel: bool,
    progress: Option<ProgressHook>,
}

impl SubstancePipeline<VocabularyIndex> {
    /// Builds the default index over `vocabulary`.
    pub fn from_vocabulary<I, S>(
        vocabulary: I,
        options: SubstanceOptions,
        matcher: &MatcherOptions,
    ) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        matcher.validate()?;
        let index = VocabularyIndex::build(vocabulary, matcher)?;
        info!(entries = index.len(), "substance vocabulary indexed");
        Self::new(index, options)
    }
}

impl<M: FuzzyMatcher> SubstancePipeline<M> {
    /// Validates `options` and compiles the split pattern.
    pub fn new(matcher: M, options: SubstanceOptions) -> Result<Self, PipelineError> {
        options.validate()?;
        let collapser = Collapser::new(&options.split_pattern)?;
        Ok(Self {
            matcher,
            options,
            collapser,
            parallel: true,
            progress: None,
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_progress(mut self, progress: ProgressHook) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn options(&self) -> &SubstanceOptions {
        &self.options
    }

    /// Assigns ids 1..N to `inputs`, normalizes them and resolves every record.
    pub fn run<S: AsRef<str>>(&self, inputs: &[Option<S>]) -> Result<SubstanceRun, PipelineError> {
        let records = prepare_records(inputs);
        self.run_records(&records)
    }

    /// Resolves already prepared records.
    pub fn run_records(&self, records: &[FreeTextRecord]) -> Result<SubstanceRun, PipelineError> {
        let mode = self.options.mode;
        info!(records = records.len(), mode = mode.as_str(), "substance run started");

        let (records_out, stats) = match mode {
            OutputMode::Collapsed => {
                let collapsed = map_records(records, self.parallel, self.progress.as_ref(), |r| {
                    self.collapse_one(r)
                });
                check_completeness(records, collapsed.iter().map(|r| r.id))?;
                let mut stats = RunStats::default();
                for record in &collapsed {
                    stats.record(
                        record.failed,
                        !record.matched_to.is_empty(),
                        record.matched_to.len(),
                    );
                }
                (SubstanceRecords::Collapsed(collapsed), stats)
            }
            OutputMode::Atomic | OutputMode::MultiHit => {
                let resolved = map_records(records, self.parallel, self.progress.as_ref(), |r| {
                    self.resolve_one(r)
                });
                check_completeness(records, resolved.iter().map(|r| r.id))?;
                let mut stats = RunStats::default();
                for record in &resolved {
                    stats.record(record.failed, !record.hits.is_empty(), record.hits.len());
                }
                (SubstanceRecords::Resolved(resolved), stats)
            }
        };

        info!(
            records = stats.records,
            matched = stats.matched,
            unmatched = stats.unmatched,
            failed = stats.failed,
            candidates = stats.candidates,
            "substance run finished"
        );
        Ok(SubstanceRun {
            mode,
            records: records_out,
            stats,
        })
    }

    fn resolve_one(&self, record: &FreeTextRecord) -> ResolvedSubstanceRecord {
        let selected = select_candidates(
            record,
            &self.matcher,
            self.options.threshold,
            self.options.max_per_entry,
        );
        match selected {
            Ok(candidates) => {
                let resolved = ResolvedSubstanceRecord::from_candidates(record, &candidates);
                if self.options.mode == OutputMode::Atomic {
                    resolved.into_atomic()
                } else {
                    resolved
                }
            }
            Err(error) => {
                warn!(record = record.id.get(), %error, "matching failed, record left empty");
                ResolvedSubstanceRecord::failed(record)
            }
        }
    }

    fn collapse_one(&self, record: &FreeTextRecord) -> CollapsedRecord {
        if record.is_missing() {
            return CollapsedRecord::aggregate(record, &[], None);
        }
        match self.matcher.find(&record.preprocessed) {
            Ok(raw) => {
                let candidates = filter_threshold(record.id, raw, self.options.threshold);
                self.collapser.collapse_record(record, &candidates)
            }
            Err(error) => {
                warn!(record = record.id.get(), %error, "matching failed, record left empty");
                CollapsedRecord::failed(record)
            }
        }
    }
}
