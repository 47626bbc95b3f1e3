//! Fuzzy match candidates and ranked candidate sets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::RecordId;

/// Tolerance used when comparing a score against a fractional threshold.
const THRESHOLD_EPSILON: f64 = 1e-9;

/// Similarity score on the 0–100 scale.
///
/// All scores inside the engine use this scale. Thresholds in the
/// configuration are fractions in `[0, 1]` and are converted with
/// [`Score::meets`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    pub const MAX: Score = Score(100.0);

    /// Creates a score, clamping to `[0, 100]`. NaN becomes zero.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 100.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Whether this score reaches a threshold given as a fraction in `[0, 1]`.
    pub fn meets(self, threshold: f64) -> bool {
        self.0 + THRESHOLD_EPSILON >= threshold * 100.0
    }
}

impl fmt::Display for Score {
    /// Renders at most two decimals with trailing zeros trimmed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = format!("{:.2}", self.0);
        let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
        f.write_str(trimmed)
    }
}

/// A single fuzzy hit for a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub source_id: RecordId,
    /// The part of the preprocessed text that matched.
    pub matched_span: String,
    /// Reference vocabulary key the span resolved to.
    pub canonical_entry: String,
    pub similarity: Score,
}

/// Bounded, ranked candidates for one record.
///
/// Candidates are ordered by similarity descending. The same canonical entry
/// appears at most `max_per_entry` times; distinct entries are not capped
/// against each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidateSet {
    pub source_id: RecordId,
    pub candidates: Vec<MatchCandidate>,
}

impl RankedCandidateSet {
    pub fn empty(source_id: RecordId) -> Self {
        Self {
            source_id,
            candidates: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchCandidate> {
        self.candidates.iter()
    }

    /// Number of kept candidates resolving to `entry`.
    pub fn count_for(&self, entry: &str) -> usize {
        self.candidates
            .iter()
            .filter(|c| c.canonical_entry == entry)
            .count()
    }
}

impl<'a> IntoIterator for &'a RankedCandidateSet {
    type Item = &'a MatchCandidate;
    type IntoIter = std::slice::Iter<'a, MatchCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}
