//! Protocol resolution: code extraction, substance-set extraction and lookup.

use std::collections::{HashMap, HashSet};
use std::fmt;

use onco_model::{
    FreeTextRecord, MISSING_SENTINEL, MatcherOptions, PROTOCOL_MAX_PER_ENTRY, ProtocolOptions,
    ProtocolRecord, ProtocolReferenceEntry, SlotKey,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::MatchError;
use crate::index::{FuzzyMatcher, VocabularyIndex};
use crate::select::select_candidates;

/// Why a reference row was left out of the lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceIssueKind {
    EmptyCode,
    EmptyKey,
    DuplicateSubstance { name: String },
    DuplicateKey { first_code: String },
    WidthMismatch { expected: usize, found: usize },
}

/// A malformed reference row. Excluded from the lookup, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceIssue {
    /// 1-based data row of the reference table.
    pub row: usize,
    pub code: String,
    #[serde(flatten)]
    pub kind: ReferenceIssueKind,
}

impl fmt::Display for ReferenceIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCode => write!(f, "empty protocol code"),
            Self::EmptyKey => write!(f, "no substances listed"),
            Self::DuplicateSubstance { name } => write!(f, "substance {name:?} listed twice"),
            Self::DuplicateKey { first_code } => {
                write!(f, "same substances as protocol {first_code:?}")
            }
            Self::WidthMismatch { expected, found } => {
                write!(f, "{found} slots, expected {expected}")
            }
        }
    }
}

impl fmt::Display for ReferenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reference row {} ({:?}): {}", self.row, self.code, self.kind)
    }
}

/// Canonicalized protocol reference table.
#[derive(Debug, Clone)]
pub struct ProtocolTable {
    width: usize,
    rows: Vec<ProtocolReferenceEntry>,
    lookup: HashMap<SlotKey, String>,
}

impl ProtocolTable {
    /// Builds the lookup keyed by canonical slot tuple.
    ///
    /// Rows with an empty code, no substances, a repeated substance, the wrong
    /// width, or a key already taken by an earlier row are excluded and
    /// reported.
    pub fn build(rows: Vec<ProtocolReferenceEntry>, width: usize) -> (Self, Vec<ReferenceIssue>) {
        let mut lookup: HashMap<SlotKey, String> = HashMap::new();
        let mut issues = Vec::new();

        for (index, entry) in rows.iter().enumerate() {
            let issue = |kind| ReferenceIssue {
                row: index + 1,
                code: entry.code.clone(),
                kind,
            };

            if entry.slots.width() != width {
                issues.push(issue(ReferenceIssueKind::WidthMismatch {
                    expected: width,
                    found: entry.slots.width(),
                }));
                continue;
            }
            if entry.code.is_empty() {
                issues.push(issue(ReferenceIssueKind::EmptyCode));
                continue;
            }
            if entry.slots.is_empty() {
                issues.push(issue(ReferenceIssueKind::EmptyKey));
                continue;
            }
            if let Some(name) = entry.slots.duplicate_name() {
                issues.push(issue(ReferenceIssueKind::DuplicateSubstance {
                    name: name.to_string(),
                }));
                continue;
            }
            if let Some(first_code) = lookup.get(&entry.slots) {
                issues.push(issue(ReferenceIssueKind::DuplicateKey {
                    first_code: first_code.clone(),
                }));
                continue;
            }
            lookup.insert(entry.slots.clone(), entry.code.clone());
        }

        for issue in &issues {
            warn!(row = issue.row, code = %issue.code, "excluded reference row: {issue}");
        }
        debug!(
            rows = rows.len(),
            keys = lookup.len(),
            excluded = issues.len(),
            "built protocol table"
        );
        (
            Self {
                width,
                rows,
                lookup,
            },
            issues,
        )
    }

    /// Number of slot columns.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> &[ProtocolReferenceEntry] {
        &self.rows
    }

    /// Number of rows usable for lookup.
    pub fn key_count(&self) -> usize {
        self.lookup.len()
    }

    /// Non-empty codes of all rows, in row order, de-duplicated.
    pub fn codes(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|row| row.code.as_str())
            .filter(|code| !code.is_empty() && seen.insert(*code))
            .collect()
    }

    /// Union of the substance names of all rows, row-major, de-duplicated.
    pub fn substance_vocabulary(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .flat_map(|row| row.slots.names())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Code of the protocol with exactly these substances.
    ///
    /// An all-empty key never matches.
    pub fn lookup(&self, key: &SlotKey) -> Option<&str> {
        if key.is_empty() {
            return None;
        }
        self.lookup.get(key).map(String::as_str)
    }
}

/// Resolves protocol free text against a [`ProtocolTable`].
pub struct ProtocolResolver<M = VocabularyIndex> {
    table: ProtocolTable,
    codes: M,
    substances: M,
    options: ProtocolOptions,
}

impl ProtocolResolver<VocabularyIndex> {
    /// Builds both indexes from the table: one over its codes, one over its
    /// substance union.
    pub fn from_table(
        table: ProtocolTable,
        options: ProtocolOptions,
        matcher: &MatcherOptions,
    ) -> Result<Self, MatchError> {
        let codes = VocabularyIndex::build(table.codes(), matcher)?;
        let substances = VocabularyIndex::build(table.substance_vocabulary(), matcher)?;
        Ok(Self::new(table, codes, substances, options))
    }
}

impl<M: FuzzyMatcher> ProtocolResolver<M> {
    pub fn new(table: ProtocolTable, codes: M, substances: M, options: ProtocolOptions) -> Self {
        Self {
            table,
            codes,
            substances,
            options,
        }
    }

    pub fn table(&self) -> &ProtocolTable {
        &self.table
    }

    /// Resolves one record.
    ///
    /// The code candidate comes from the raw text; substances come from the
    /// preprocessed text. The looked-up code is `None` when no substance was
    /// found or when more substances were found than there are slots.
    pub fn resolve(&self, record: &FreeTextRecord) -> Result<ProtocolRecord, MatchError> {
        let width = self.table.width();

        let code_hit = if record.original.is_empty() || record.original == MISSING_SENTINEL {
            None
        } else {
            self.codes
                .best_match(&record.original)?
                .filter(|hit| hit.score.meets(self.options.code_cutoff))
        };

        let candidates = select_candidates(
            record,
            &self.substances,
            self.options.substance_threshold,
            PROTOCOL_MAX_PER_ENTRY,
        )?;
        let names: Vec<&str> = candidates
            .iter()
            .map(|candidate| candidate.canonical_entry.as_str())
            .collect();

        let overflow = SlotKey::overflows(names.len(), width);
        let slots = SlotKey::canonicalize(names.iter().copied(), width);
        let code = if overflow {
            None
        } else {
            self.table.lookup(&slots).map(str::to_string)
        };
        debug!(
            record = record.id.get(),
            substances = names.len(),
            overflow,
            code = code.as_deref().unwrap_or(""),
            "built protocol key"
        );

        Ok(ProtocolRecord {
            id: record.id,
            original: record.original.clone(),
            preprocessed: record.preprocessed.clone(),
            extracted_code: code_hit.as_ref().map(|hit| hit.entry.clone()),
            code_similarity: code_hit.map(|hit| hit.score),
            slots,
            code,
            overflow,
            failed: false,
        })
    }

    /// Row for a record whose matching failed: everything derived is empty.
    pub fn failed_record(&self, record: &FreeTextRecord) -> ProtocolRecord {
        ProtocolRecord {
            id: record.id,
            original: record.original.clone(),
            preprocessed: record.preprocessed.clone(),
            extracted_code: None,
            code_similarity: None,
            slots: SlotKey::empty(self.table.width()),
            code: None,
            overflow: false,
            failed: true,
        }
    }
}
