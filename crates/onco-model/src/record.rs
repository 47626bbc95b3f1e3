//! Free-text input records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Literal that stands in for a missing or empty free-text value.
pub const MISSING_SENTINEL: &str = "NA";

/// Stable record identity, assigned 1..N in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub usize);

impl RecordId {
    /// Returns the numeric value of the id.
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One input row of free text.
///
/// `original` is the trimmed raw value (or [`MISSING_SENTINEL`]) and is never
/// changed after creation. `preprocessed` is the normalized text used for
/// matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTextRecord {
    pub id: RecordId,
    pub original: String,
    pub preprocessed: String,
}

impl FreeTextRecord {
    pub fn new(id: RecordId, original: impl Into<String>, preprocessed: impl Into<String>) -> Self {
        Self {
            id,
            original: original.into(),
            preprocessed: preprocessed.into(),
        }
    }

    /// True when the preprocessed text carries no matchable content.
    pub fn is_missing(&self) -> bool {
        self.preprocessed.is_empty() || self.preprocessed == MISSING_SENTINEL
    }
}
