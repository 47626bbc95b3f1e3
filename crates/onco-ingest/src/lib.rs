//! Tabular input for oncomatch: free-text columns, the substance vocabulary
//! and the protocol reference table.

pub mod csv_table;
pub mod error;
pub mod load;

pub use csv_table::{BlankRows, CsvTable, read_csv_table, sniff_delimiter};
pub use error::IngestError;
pub use load::{
    DEFAULT_VOCABULARY_COLUMN, ProtocolReference, load_free_text_column, load_protocol_reference,
    load_substance_vocabulary, normalize_null,
};
