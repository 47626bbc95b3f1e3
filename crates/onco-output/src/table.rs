//! The rendered output table and its writers.

use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::OutputError;

/// File format of a written table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// A rectangular table of optional text cells.
///
/// Every row has exactly `headers.len()` cells; `None` is written as an empty
/// CSV field or a JSON `null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl OutputTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding or cutting it to the header width.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `row` in the column named `header`.
    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        let column = self.headers.iter().position(|h| h == header)?;
        self.rows.get(row)?.get(column)?.as_deref()
    }

    /// Writes the table as delimited text.
    pub fn write_csv<W: Write>(&self, writer: W, delimiter: u8) -> Result<(), OutputError> {
        let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        writer.flush().map_err(OutputError::Flush)?;
        Ok(())
    }

    /// Writes the table as a pretty-printed JSON array of objects.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), OutputError> {
        let records: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = self
                    .headers
                    .iter()
                    .zip(row)
                    .map(|(header, cell)| {
                        let value = cell.clone().map_or(Value::Null, Value::String);
                        (header.clone(), value)
                    })
                    .collect();
                Value::Object(object)
            })
            .collect();
        serde_json::to_writer_pretty(writer, &records)?;
        Ok(())
    }

    /// Renders the whole table in memory.
    pub fn render(&self, format: OutputFormat, delimiter: u8) -> Result<Vec<u8>, OutputError> {
        let mut buffer = Vec::new();
        match format {
            OutputFormat::Csv => self.write_csv(&mut buffer, delimiter)?,
            OutputFormat::Json => {
                self.write_json(&mut buffer)?;
                buffer.push(b'\n');
            }
        }
        Ok(buffer)
    }

    /// Renders the table completely, writes it to a temporary file next to
    /// `path` and renames that into place. A failed run never leaves a
    /// partial file at `path`.
    pub fn write_to_path(
        &self,
        path: &Path,
        format: OutputFormat,
        delimiter: u8,
    ) -> Result<(), OutputError> {
        let bytes = self.render(format, delimiter)?;
        let io_error = |source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp_file = NamedTempFile::new_in(dir).map_err(io_error)?;
        temp_file.write_all(&bytes).map_err(io_error)?;
        temp_file.flush().map_err(io_error)?;
        temp_file
            .persist(path)
            .map_err(|error| io_error(error.error))?;
        info!(
            path = %path.display(),
            format = format.as_str(),
            rows = self.rows.len(),
            columns = self.headers.len(),
            "wrote output table"
        );
        Ok(())
    }
}
