//! Result records → wide output tables.
//!
//! The schema is computed after all records are known: the multi-hit width
//! is the largest number of kept hits of any record in the batch.

use onco_model::{
    CollapsedRecord, OutputMode, ProtocolRecord, RecordId, ResolvedSubstanceRecord, Score,
    SubstanceHit,
};

use crate::table::OutputTable;

const BASE_HEADERS: [&str; 3] = ["ID", "Original", "Preprocessed"];

fn base_headers() -> Vec<String> {
    BASE_HEADERS.iter().map(ToString::to_string).collect()
}

fn base_cells(id: RecordId, original: &str, preprocessed: &str) -> Vec<Option<String>> {
    vec![
        Some(id.to_string()),
        Some(original.to_string()),
        Some(preprocessed.to_string()),
    ]
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn hit_cells(hit: Option<&SubstanceHit>) -> [Option<String>; 3] {
    match hit {
        Some(hit) => [
            Some(hit.hit.clone()),
            Some(hit.mapped_to.clone()),
            Some(hit.similarity.to_string()),
        ],
        None => [None, None, None],
    }
}

/// Renders atomic or multi-hit substance results.
///
/// Atomic: `ID, Original, Preprocessed, Hit, Mapped_to, Similarity`.
/// Multi-hit: numbered `Hit{i}, Mapped_to{i}, Similarity{i}` for
/// `i = 1..=K`. Collapsed mode has its own record type, see
/// [`render_collapsed`]; here it renders like multi-hit.
pub fn render_substances(records: &[ResolvedSubstanceRecord], mode: OutputMode) -> OutputTable {
    let mut headers = base_headers();
    if mode == OutputMode::Atomic {
        headers.extend(["Hit", "Mapped_to", "Similarity"].map(String::from));
        let mut table = OutputTable::new(headers);
        for record in records {
            let mut row = base_cells(record.id, &record.original, &record.preprocessed);
            row.extend(hit_cells(record.best()));
            table.push_row(row);
        }
        return table;
    }

    let width = records.iter().map(|r| r.hits.len()).max().unwrap_or(0);
    for index in 1..=width {
        headers.push(format!("Hit{index}"));
        headers.push(format!("Mapped_to{index}"));
        headers.push(format!("Similarity{index}"));
    }
    let mut table = OutputTable::new(headers);
    for record in records {
        let mut row = base_cells(record.id, &record.original, &record.preprocessed);
        for hit in &record.hits {
            row.extend(hit_cells(Some(hit)));
        }
        table.push_row(row);
    }
    table
}

/// Renders legacy collapsed results with `; `-joined cells.
pub fn render_collapsed(records: &[CollapsedRecord]) -> OutputTable {
    let mut headers = base_headers();
    headers.extend(["match", "matched_to", "similarity"].map(String::from));
    let mut table = OutputTable::new(headers);
    for record in records {
        let mut row = base_cells(record.id, &record.original, &record.preprocessed);
        row.push(non_empty(record.joined_matches()));
        row.push(non_empty(record.joined_matched_to()));
        row.push(non_empty(record.joined_similarity()));
        table.push_row(row);
    }
    table
}

/// Renders protocol results.
///
/// Columns: `ID, Original, Preprocessed, Extracted_Codes, Similarity_Score`,
/// the slot columns, then `code`.
pub fn render_protocols(records: &[ProtocolRecord], slot_columns: &[String]) -> OutputTable {
    let mut headers = base_headers();
    headers.push("Extracted_Codes".to_string());
    headers.push("Similarity_Score".to_string());
    headers.extend(slot_columns.iter().cloned());
    headers.push("code".to_string());

    let mut table = OutputTable::new(headers);
    for record in records {
        let mut row = base_cells(record.id, &record.original, &record.preprocessed);
        row.push(record.extracted_code.clone());
        row.push(record.code_similarity.as_ref().map(Score::to_string));
        let mut slots: Vec<Option<String>> = record.slots.slots().to_vec();
        slots.resize(slot_columns.len(), None);
        row.extend(slots);
        row.push(record.code.clone());
        table.push_row(row);
    }
    table
}
