//! Protocol records and the canonical substance slot key.

use serde::{Deserialize, Serialize};

use crate::candidate::Score;
use crate::record::RecordId;

/// Fixed-width, canonicalized sequence of substance names.
///
/// Names are sorted ascending, left-packed, and the remaining slots are
/// `None`. Both protocol records and reference entries build their key through
/// [`SlotKey::canonicalize`], so equal substance sets always produce equal
/// keys regardless of discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotKey(Vec<Option<String>>);

impl SlotKey {
    /// A key of `width` empty slots.
    pub fn empty(width: usize) -> Self {
        Self(vec![None; width])
    }

    /// Sorts and packs `names` into `width` slots.
    ///
    /// Blank names are dropped. Names beyond `width` are cut off after
    /// sorting; callers that care check [`SlotKey::overflows`] first.
    pub fn canonicalize<I, S>(names: I, width: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        values.sort();
        values.truncate(width);
        let mut slots: Vec<Option<String>> = values.into_iter().map(Some).collect();
        slots.resize(width, None);
        Self(slots)
    }

    /// Whether `count` names would not fit into `width` slots.
    pub fn overflows(count: usize, width: usize) -> bool {
        count > width
    }

    pub fn width(&self) -> usize {
        self.0.len()
    }

    pub fn slots(&self) -> &[Option<String>] {
        &self.0
    }

    /// Filled slots in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|slot| slot.as_deref())
    }

    /// True when every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// First repeated name, if any (keys are sorted, so repeats are adjacent).
    pub fn duplicate_name(&self) -> Option<&str> {
        self.0
            .windows(2)
            .find_map(|pair| match (&pair[0], &pair[1]) {
                (Some(left), Some(right)) if left == right => Some(left.as_str()),
                _ => None,
            })
    }
}

/// One row of the protocol reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolReferenceEntry {
    pub code: String,
    pub slots: SlotKey,
}

impl ProtocolReferenceEntry {
    /// Builds an entry, canonicalizing the raw slot cells.
    pub fn new(code: impl Into<String>, raw_slots: Vec<Option<String>>) -> Self {
        let width = raw_slots.len();
        Self {
            code: code.into().trim().to_string(),
            slots: SlotKey::canonicalize(raw_slots.into_iter().flatten(), width),
        }
    }
}

/// Result row for one protocol free-text record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolRecord {
    pub id: RecordId,
    pub original: String,
    pub preprocessed: String,
    /// Best protocol code matched directly against the raw text.
    pub extracted_code: Option<String>,
    pub code_similarity: Option<Score>,
    pub slots: SlotKey,
    /// Protocol code looked up from the canonical slot key.
    pub code: Option<String>,
    /// More substances were found than there are slots.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub overflow: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
}
