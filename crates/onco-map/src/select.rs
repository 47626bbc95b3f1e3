//! Candidate selection for multi-hit substance extraction.

use std::collections::HashMap;

use onco_model::{FreeTextRecord, MatchCandidate, RankedCandidateSet, RecordId};
use tracing::debug;

use crate::error::MatchError;
use crate::index::{FuzzyMatcher, RawMatch};

/// Queries `matcher` with the preprocessed text of `record` and ranks the hits.
///
/// Missing records short-circuit to an empty set without touching the
/// matcher.
pub fn select_candidates<M>(
    record: &FreeTextRecord,
    matcher: &M,
    threshold: f64,
    max_per_entry: usize,
) -> Result<RankedCandidateSet, MatchError>
where
    M: FuzzyMatcher + ?Sized,
{
    if record.is_missing() {
        return Ok(RankedCandidateSet::empty(record.id));
    }
    let raw = matcher.find(&record.preprocessed)?;
    let ranked = rank_candidates(record.id, raw, threshold, max_per_entry);
    debug!(
        record = record.id.get(),
        kept = ranked.len(),
        "selected substance candidates"
    );
    Ok(ranked)
}

/// Hits reaching `threshold`, converted to candidates, in matcher order.
pub fn filter_threshold(
    source_id: RecordId,
    raw: Vec<RawMatch>,
    threshold: f64,
) -> Vec<MatchCandidate> {
    raw.into_iter()
        .filter(|hit| hit.score.meets(threshold))
        .map(|hit| MatchCandidate {
            source_id,
            matched_span: hit.span,
            canonical_entry: hit.entry,
            similarity: hit.score,
        })
        .collect()
}

/// Filters, sorts and caps raw hits.
///
/// Sorting is stable, so equal scores keep the matcher's order. The walk keeps
/// a running count per canonical entry and skips a hit once its entry has
/// reached `max_per_entry`.
pub fn rank_candidates(
    source_id: RecordId,
    raw: Vec<RawMatch>,
    threshold: f64,
    max_per_entry: usize,
) -> RankedCandidateSet {
    let mut sorted = filter_threshold(source_id, raw, threshold);
    sorted.sort_by(|a, b| b.similarity.value().total_cmp(&a.similarity.value()));

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut candidates = Vec::with_capacity(sorted.len());
    for candidate in sorted {
        let count = counts.entry(candidate.canonical_entry.clone()).or_default();
        if *count >= max_per_entry {
            continue;
        }
        *count += 1;
        candidates.push(candidate);
    }

    RankedCandidateSet {
        source_id,
        candidates,
    }
}
