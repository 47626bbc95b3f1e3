//! Legacy single-winner resolution.
//!
//! Records whose preprocessed text looks like a list of substances (it matches
//! the split pattern) keep every candidate. Other records with more than one
//! candidate are reduced to one by the tie-break rules, evaluated in
//! [`TIE_BREAK_ORDER`] until one yields a winner.

use onco_model::{CollapsedRecord, FreeTextRecord, MatchCandidate, OptionsError, TieBreakRule};
use rapidfuzz::distance::levenshtein;
use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Rules in the order they are tried.
pub const TIE_BREAK_ORDER: [TieBreakRule; 3] = [
    TieBreakRule::Exact,
    TieBreakRule::Substring,
    TieBreakRule::MinEditDistance,
];

/// Index of the candidate `rule` selects, if any.
fn evaluate(rule: TieBreakRule, text: &str, candidates: &[MatchCandidate]) -> Option<usize> {
    match rule {
        TieBreakRule::Exact => candidates
            .iter()
            .position(|candidate| candidate.canonical_entry == text),
        TieBreakRule::Substring => {
            let needle = text.to_lowercase();
            candidates
                .iter()
                .position(|candidate| candidate.canonical_entry.to_lowercase().contains(&needle))
        }
        TieBreakRule::MinEditDistance => candidates
            .iter()
            .enumerate()
            .min_by_key(|(_, candidate)| {
                levenshtein::distance(text.chars(), candidate.canonical_entry.chars())
            })
            .map(|(index, _)| index),
    }
}

/// Picks one candidate for `text`.
///
/// Returns the index of the winner and the rule that decided it, or `None`
/// for an empty candidate list. On equal edit distance the first candidate
/// wins.
pub fn resolve_tie(text: &str, candidates: &[MatchCandidate]) -> Option<(usize, TieBreakRule)> {
    TIE_BREAK_ORDER
        .iter()
        .find_map(|&rule| evaluate(rule, text, candidates).map(|index| (index, rule)))
}

/// Applies the legacy collapsing policy record by record.
#[derive(Debug, Clone)]
pub struct Collapser {
    split: Regex,
}

impl Collapser {
    /// Compiles the split-indicator pattern (matched case-insensitively).
    pub fn new(split_pattern: &str) -> Result<Self, OptionsError> {
        let split = RegexBuilder::new(split_pattern)
            .case_insensitive(true)
            .build()
            .map_err(|error| OptionsError::InvalidSplitPattern {
                pattern: split_pattern.to_string(),
                message: error.to_string(),
            })?;
        Ok(Self { split })
    }

    /// Whether `text` may name several substances.
    pub fn is_split_candidate(&self, text: &str) -> bool {
        self.split.is_match(text)
    }

    /// Collapses the threshold-filtered candidates of one record.
    ///
    /// `candidates` are in matcher order; that order decides "first" for
    /// every rule.
    pub fn collapse_record(
        &self,
        record: &FreeTextRecord,
        candidates: &[MatchCandidate],
    ) -> CollapsedRecord {
        if candidates.len() <= 1 || self.is_split_candidate(&record.preprocessed) {
            return CollapsedRecord::aggregate(record, candidates, None);
        }

        match resolve_tie(&record.preprocessed, candidates) {
            Some((index, rule)) => {
                debug!(
                    record = record.id.get(),
                    rule = rule.as_str(),
                    entry = %candidates[index].canonical_entry,
                    "resolved tie"
                );
                CollapsedRecord::aggregate(record, &candidates[index..=index], Some(rule))
            }
            None => CollapsedRecord::aggregate(record, candidates, None),
        }
    }
}
