//! Per-record substance resolution results.

use serde::{Deserialize, Serialize};

use crate::candidate::{MatchCandidate, RankedCandidateSet, Score};
use crate::record::{FreeTextRecord, RecordId};

/// Separator used when several values share one output cell.
pub const JOIN_SEPARATOR: &str = "; ";

/// One numbered hit of a resolved substance record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstanceHit {
    /// Span of the preprocessed text that matched.
    pub hit: String,
    /// Canonical substance name.
    pub mapped_to: String,
    pub similarity: Score,
}

impl From<&MatchCandidate> for SubstanceHit {
    fn from(candidate: &MatchCandidate) -> Self {
        Self {
            hit: candidate.matched_span.clone(),
            mapped_to: candidate.canonical_entry.clone(),
            similarity: candidate.similarity,
        }
    }
}

/// Result row for one input record in atomic or multi-hit mode.
///
/// Records without any candidate keep an empty `hits` list; they are still
/// part of the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSubstanceRecord {
    pub id: RecordId,
    pub original: String,
    pub preprocessed: String,
    pub hits: Vec<SubstanceHit>,
    /// Set when matching failed for this record and its results were nulled.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

impl ResolvedSubstanceRecord {
    pub fn from_candidates(record: &FreeTextRecord, candidates: &RankedCandidateSet) -> Self {
        Self {
            id: record.id,
            original: record.original.clone(),
            preprocessed: record.preprocessed.clone(),
            hits: candidates.iter().map(SubstanceHit::from).collect(),
            failed: false,
        }
    }

    pub fn failed(record: &FreeTextRecord) -> Self {
        Self {
            id: record.id,
            original: record.original.clone(),
            preprocessed: record.preprocessed.clone(),
            hits: Vec::new(),
            failed: true,
        }
    }

    /// Atomic view: the best hit only.
    pub fn best(&self) -> Option<&SubstanceHit> {
        self.hits.first()
    }

    /// Keeps only the first hit.
    pub fn into_atomic(mut self) -> Self {
        self.hits.truncate(1);
        self
    }
}

/// Rule that decided a collapsed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakRule {
    /// Preprocessed text equals the canonical entry verbatim.
    Exact,
    /// Lower-cased text is contained in the lower-cased canonical entry.
    Substring,
    /// Smallest character edit distance.
    MinEditDistance,
}

impl TieBreakRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Substring => "substring",
            Self::MinEditDistance => "min_edit_distance",
        }
    }
}

/// Result row of the legacy single-winner mode.
///
/// `matches` holds every surviving span; `matched_to` and `similarity` are
/// aligned with each other and de-duplicated by canonical entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollapsedRecord {
    pub id: RecordId,
    pub original: String,
    pub preprocessed: String,
    pub matches: Vec<String>,
    pub matched_to: Vec<String>,
    pub similarity: Vec<Score>,
    /// Tie-break rule applied, if the record went through tie-breaking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<TieBreakRule>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}

impl CollapsedRecord {
    /// Aggregates candidates of one record.
    ///
    /// All spans are kept in order; canonical entries are de-duplicated with
    /// the first occurrence winning, and the similarity list follows them.
    pub fn aggregate(
        record: &FreeTextRecord,
        candidates: &[MatchCandidate],
        rule: Option<TieBreakRule>,
    ) -> Self {
        let mut matches = Vec::with_capacity(candidates.len());
        let mut matched_to: Vec<String> = Vec::new();
        let mut similarity = Vec::new();
        for candidate in candidates {
            matches.push(candidate.matched_span.clone());
            if !matched_to.contains(&candidate.canonical_entry) {
                matched_to.push(candidate.canonical_entry.clone());
                similarity.push(candidate.similarity);
            }
        }
        Self {
            id: record.id,
            original: record.original.clone(),
            preprocessed: record.preprocessed.clone(),
            matches,
            matched_to,
            similarity,
            rule,
            failed: false,
        }
    }

    pub fn failed(record: &FreeTextRecord) -> Self {
        Self {
            failed: true,
            ..Self::aggregate(record, &[], None)
        }
    }

    pub fn joined_matches(&self) -> String {
        self.matches.join(JOIN_SEPARATOR)
    }

    pub fn joined_matched_to(&self) -> String {
        self.matched_to.join(JOIN_SEPARATOR)
    }

    pub fn joined_similarity(&self) -> String {
        self.similarity
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(JOIN_SEPARATOR)
    }
}
