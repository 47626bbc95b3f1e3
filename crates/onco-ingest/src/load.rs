//! Loaders for the three input tables of a run.

use std::collections::HashSet;
use std::path::Path;

use onco_model::{ProtocolOptions, ProtocolReferenceEntry};
use tracing::info;

use crate::csv_table::{BlankRows, read_csv_table};
use crate::error::IngestError;

/// Default column of the substance reference list.
pub const DEFAULT_VOCABULARY_COLUMN: &str = "substanz";

/// Cell spellings treated as an empty slot in reference tables.
const NULL_TOKENS: [&str; 7] = ["", "nan", "NaN", "NA", "NULL", "null", "None"];

/// Maps every null spelling to `None`.
pub fn normalize_null(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if NULL_TOKENS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// One value per data row of `column`, in file order. Blank cells are `None`.
///
/// Blank rows are kept so record ids follow the file.
pub fn load_free_text_column(
    path: &Path,
    column: &str,
    delimiter: Option<u8>,
) -> Result<Vec<Option<String>>, IngestError> {
    let table = read_csv_table(path, delimiter, BlankRows::Keep)?;
    let index = table.require_column(path, column)?;
    let values: Vec<Option<String>> = table
        .column(index)
        .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
        .collect();
    info!(
        path = %path.display(),
        column,
        rows = values.len(),
        "loaded free-text column"
    );
    Ok(values)
}

/// Canonical substance names of `column`, in file order.
///
/// Null cells are skipped. A column without any name is an error.
pub fn load_substance_vocabulary(
    path: &Path,
    column: &str,
    delimiter: Option<u8>,
) -> Result<Vec<String>, IngestError> {
    let table = read_csv_table(path, delimiter, BlankRows::Skip)?;
    let index = table.require_column(path, column)?;
    let names: Vec<String> = table.column(index).filter_map(normalize_null).collect();
    if names.is_empty() {
        return Err(IngestError::EmptyVocabulary {
            path: path.to_path_buf(),
            column: column.to_string(),
        });
    }
    info!(path = %path.display(), entries = names.len(), "loaded substance vocabulary");
    Ok(names)
}

/// A loaded protocol reference table.
#[derive(Debug, Clone)]
pub struct ProtocolReference {
    /// Slot column names in slot order.
    pub slot_columns: Vec<String>,
    /// Rows with canonicalized slot keys, in file order.
    pub entries: Vec<ProtocolReferenceEntry>,
}

impl ProtocolReference {
    pub fn width(&self) -> usize {
        self.slot_columns.len()
    }
}

/// Reads the code column and the slot columns `<prefix>1 ..= <prefix>N`.
///
/// `N` comes from `options.slot_count` or, when unset, from the number of
/// consecutive slot columns in the header. Other columns are ignored. A row
/// with substances in detected slot columns past `N` keeps its full width,
/// so [`ProtocolReferenceEntry::slots`] no longer has `N` slots.
pub fn load_protocol_reference(
    path: &Path,
    options: &ProtocolOptions,
    delimiter: Option<u8>,
) -> Result<ProtocolReference, IngestError> {
    let table = read_csv_table(path, delimiter, BlankRows::Skip)?;
    let code_index = table.require_column(path, &options.code_column)?;

    let headers: HashSet<&str> = table.headers.iter().map(String::as_str).collect();
    let detected = (1..)
        .take_while(|slot| headers.contains(format!("{}{slot}", options.slot_prefix).as_str()))
        .count();

    let width = match options.slot_count {
        Some(configured) if configured > detected => {
            return Err(IngestError::SlotColumnsMissing {
                path: path.to_path_buf(),
                prefix: options.slot_prefix.clone(),
                configured,
                found: detected,
            });
        }
        Some(configured) => configured,
        None if detected == 0 => {
            return Err(IngestError::NoSlotColumns {
                path: path.to_path_buf(),
                prefix: options.slot_prefix.clone(),
            });
        }
        None => detected,
    };

    let slot_columns = options.slot_columns(width);
    let slot_indices = options
        .slot_columns(detected)
        .iter()
        .map(|column| table.require_column(path, column))
        .collect::<Result<Vec<_>, _>>()?;

    let entries: Vec<ProtocolReferenceEntry> = table
        .rows
        .iter()
        .map(|row| {
            let cell = |index: usize| row.get(index).map(String::as_str).unwrap_or("");
            let mut slots: Vec<Option<String>> = slot_indices
                .iter()
                .map(|&index| normalize_null(cell(index)))
                .collect();
            // Rows naming substances past slot N keep every column so the
            // table build reports them as too wide instead of truncating.
            if slots[width..].iter().all(Option::is_none) {
                slots.truncate(width);
            }
            let code = normalize_null(cell(code_index)).unwrap_or_default();
            ProtocolReferenceEntry::new(code, slots)
        })
        .collect();

    info!(
        path = %path.display(),
        rows = entries.len(),
        slots = width,
        "loaded protocol reference"
    );
    Ok(ProtocolReference {
        slot_columns,
        entries,
    })
}
