//! Record preparation: id assignment and per-record normalization.

use onco_model::{FreeTextRecord, MISSING_SENTINEL, RecordId};
use tracing::debug;

use crate::normalize::normalize;

/// Builds one [`FreeTextRecord`] per input value.
///
/// Ids run 1..N in the order the values are given. Missing or blank values
/// keep [`MISSING_SENTINEL`] as their original text.
pub fn prepare_records<S: AsRef<str>>(values: &[Option<S>]) -> Vec<FreeTextRecord> {
    let records: Vec<FreeTextRecord> = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let original = match value.as_ref().map(|v| AsRef::<str>::as_ref(v).trim()) {
                Some(text) if !text.is_empty() => text.to_string(),
                _ => MISSING_SENTINEL.to_string(),
            };
            let preprocessed = normalize(&original);
            FreeTextRecord::new(RecordId(index + 1), original, preprocessed)
        })
        .collect();

    let missing = records.iter().filter(|r| r.is_missing()).count();
    debug!(records = records.len(), missing, "prepared free-text records");
    records
}
