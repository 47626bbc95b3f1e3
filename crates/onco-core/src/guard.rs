//! Completeness guard: every input id appears in the output exactly once.

use std::collections::HashSet;

use onco_model::{FreeTextRecord, RecordId};

use crate::error::PipelineError;

/// Checks that `output` covers the ids of `input` exactly once each.
pub fn check_completeness<I>(input: &[FreeTextRecord], output: I) -> Result<(), PipelineError>
where
    I: IntoIterator<Item = RecordId>,
{
    let expected: HashSet<RecordId> = input.iter().map(|record| record.id).collect();
    let mut seen = HashSet::with_capacity(expected.len());
    let mut duplicated = Vec::new();
    let mut unexpected = Vec::new();
    for id in output {
        if !expected.contains(&id) {
            unexpected.push(id);
        } else if !seen.insert(id) {
            duplicated.push(id);
        }
    }

    let mut missing: Vec<RecordId> = expected.difference(&seen).copied().collect();
    missing.sort();
    let first = missing
        .first()
        .or(duplicated.first())
        .or(unexpected.first())
        .copied();

    match first {
        None => Ok(()),
        Some(first) => Err(PipelineError::Completeness {
            missing: missing.len(),
            duplicated: duplicated.len(),
            unexpected: unexpected.len(),
            first,
        }),
    }
}
