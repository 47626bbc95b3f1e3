//! Delimited-text tables.

use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::IngestError;

/// Delimiters considered when none is given, in order of preference on ties.
const SNIFF_CANDIDATES: [u8; 3] = [b';', b',', b'\t'];

/// What to do with data rows whose cells are all blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankRows {
    /// Drop them; used for reference tables.
    Skip,
    /// Keep them as rows of empty cells, so row positions match the file.
    Keep,
}

/// An in-memory CSV table with trimmed headers and cells.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Cells of column `index`; short rows yield empty cells.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }

    /// Index of `name`, or a [`IngestError::MissingColumn`] for `path`.
    pub fn require_column(&self, path: &Path, name: &str) -> Result<usize, IngestError> {
        self.column_index(name)
            .ok_or_else(|| IngestError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
                available: self.headers.clone(),
            })
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().to_string()
}

/// Picks the most frequent candidate delimiter in `header_line`.
///
/// Falls back to `,` when none of the candidates occurs.
pub fn sniff_delimiter(header_line: &str) -> u8 {
    let mut best = (b',', 0usize);
    for candidate in SNIFF_CANDIDATES {
        let count = header_line.bytes().filter(|&byte| byte == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Reads a delimited file with a header row.
///
/// The delimiter is sniffed from the first line when `delimiter` is `None`.
/// Rows may be ragged. Fully blank rows follow `blank_rows`; lines with no
/// bytes at all are never records.
pub fn read_csv_table(
    path: &Path,
    delimiter: Option<u8>,
    blank_rows: BlankRows,
) -> Result<CsvTable, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let delimiter = delimiter.unwrap_or_else(|| {
        let text = String::from_utf8_lossy(&bytes);
        sniff_delimiter(text.lines().next().unwrap_or(""))
    });

    let csv_error = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes.as_slice());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if blank_rows == BlankRows::Skip && row.iter().all(String::is_empty) {
            continue;
        }
        rows.push(row);
    }

    debug!(
        path = %path.display(),
        delimiter = %char::from(delimiter).escape_default(),
        columns = headers.len(),
        rows = rows.len(),
        "read csv table"
    );
    Ok(CsvTable { headers, rows })
}
