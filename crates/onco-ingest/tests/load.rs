use std::fs;
use std::path::PathBuf;

use onco_ingest::{
    BlankRows, IngestError, load_free_text_column, load_protocol_reference,
    load_substance_vocabulary, read_csv_table,
};
use onco_model::{ProtocolOptions, SlotKey};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

const PROTOCOLS: &str = "\
code;substanz_1;substanz_2;substanz_3;therapieart
GemCis;Gemcitabin;Cisplatin;;CH
FOLFOX;Oxaliplatin;Fluorouracil;Folinsäure;CH
Leer;nan;NA;None;CH
";

#[test]
fn free_text_column_keeps_row_order_and_blanks() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(
        &dir,
        "input.csv",
        "\u{feff}ID,Bezeichnung\n1, Cisplatin \n2,\n3,\"5-FU, Folinsäure\"\n",
    );
    let values = load_free_text_column(&path, "Bezeichnung", None).expect("load column");
    assert_eq!(
        values,
        vec![
            Some("Cisplatin".to_string()),
            None,
            Some("5-FU, Folinsäure".to_string())
        ]
    );
}

#[test]
fn single_column_input_keeps_blank_rows_as_missing() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(
        &dir,
        "input.csv",
        "Bezeichnung\nCisplatin\n\"\"\n   \nGemcitabin\n",
    );
    let values = load_free_text_column(&path, "Bezeichnung", None).expect("load column");
    assert_eq!(
        values,
        vec![
            Some("Cisplatin".to_string()),
            None,
            None,
            Some("Gemcitabin".to_string())
        ]
    );
}

#[test]
fn reference_tables_skip_blank_rows() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(
        &dir,
        "substanzen.csv",
        "substanz\nCisplatin\n\"\"\n   \nGemcitabin\n",
    );
    let table = read_csv_table(&path, None, BlankRows::Skip).expect("read table");
    assert_eq!(table.rows.len(), 2);
    let kept = read_csv_table(&path, None, BlankRows::Keep).expect("read table");
    assert_eq!(kept.rows.len(), 4);
}

#[test]
fn missing_column_lists_available_headers() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "input.csv", "ID;Text\n1;Cisplatin\n");
    let error = load_free_text_column(&path, "Bezeichnung", None).unwrap_err();
    match error {
        IngestError::MissingColumn {
            column, available, ..
        } => {
            assert_eq!(column, "Bezeichnung");
            assert_eq!(available, vec!["ID", "Text"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn vocabulary_skips_null_cells() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(
        &dir,
        "substanzen.csv",
        "substanz;gruppe\nCisplatin;Platin\nNA;x\n;y\nGemcitabin;Antimetabolit\n",
    );
    let names = load_substance_vocabulary(&path, "substanz", None).expect("load vocabulary");
    assert_eq!(names, vec!["Cisplatin", "Gemcitabin"]);
}

#[test]
fn empty_vocabulary_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "substanzen.csv", "substanz\nNA\n\n");
    let error = load_substance_vocabulary(&path, "substanz", None).unwrap_err();
    assert!(matches!(error, IngestError::EmptyVocabulary { .. }));
}

#[test]
fn protocol_reference_detects_slot_count() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "protokolle.csv", PROTOCOLS);
    let reference =
        load_protocol_reference(&path, &ProtocolOptions::default(), None).expect("load reference");

    assert_eq!(reference.width(), 3);
    assert_eq!(
        reference.slot_columns,
        vec!["substanz_1", "substanz_2", "substanz_3"]
    );
    assert_eq!(reference.entries.len(), 3);
    assert_eq!(reference.entries[0].code, "GemCis");
    assert_eq!(
        reference.entries[0].slots,
        SlotKey::canonicalize(["Cisplatin", "Gemcitabin"], 3)
    );
    assert!(reference.entries[2].slots.is_empty());
}

#[test]
fn narrower_slot_count_keeps_rows_with_later_substances_wide() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "protokolle.csv", PROTOCOLS);
    let options = ProtocolOptions::default().with_slot_count(2);
    let reference = load_protocol_reference(&path, &options, None).expect("load reference");

    assert_eq!(reference.width(), 2);
    assert_eq!(reference.slot_columns, vec!["substanz_1", "substanz_2"]);
    assert_eq!(
        reference.entries[0].slots,
        SlotKey::canonicalize(["Cisplatin", "Gemcitabin"], 2)
    );
    // FOLFOX lists a third substance, so it is not cut down to two slots.
    assert_eq!(reference.entries[1].slots.width(), 3);
    assert_eq!(
        reference.entries[1].slots,
        SlotKey::canonicalize(["Fluorouracil", "Folinsäure", "Oxaliplatin"], 3)
    );
    assert_eq!(reference.entries[2].slots.width(), 2);
}

#[test]
fn configured_slot_count_beyond_header_is_fatal() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "protokolle.csv", PROTOCOLS);
    let options = ProtocolOptions::default().with_slot_count(7);
    let error = load_protocol_reference(&path, &options, None).unwrap_err();
    assert!(matches!(
        error,
        IngestError::SlotColumnsMissing {
            configured: 7,
            found: 3,
            ..
        }
    ));
}

#[test]
fn reference_without_slot_columns_is_fatal() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "protokolle.csv", "code;stoff\nGemCis;Cisplatin\n");
    let error = load_protocol_reference(&path, &ProtocolOptions::default(), None).unwrap_err();
    assert!(matches!(error, IngestError::NoSlotColumns { .. }));
}

#[test]
fn explicit_delimiter_overrides_sniffing() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "input.txt", "a|b\n1|x;y\n");
    let table = read_csv_table(&path, Some(b'|'), BlankRows::Skip).expect("read table");
    assert_eq!(table.headers, vec!["a", "b"]);
    assert_eq!(table.rows, vec![vec!["1".to_string(), "x;y".to_string()]]);
}

#[test]
fn unreadable_file_reports_path() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("missing.csv");
    let error = read_csv_table(&path, None, BlankRows::Skip).unwrap_err();
    assert!(matches!(error, IngestError::Io { .. }));
    assert!(error.to_string().contains("missing.csv"));
}
