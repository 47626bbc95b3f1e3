use onco_model::{
    CollapsedRecord, FreeTextRecord, MatchCandidate, OutputMode, ProtocolRecord, RecordId,
    ResolvedSubstanceRecord, Score, SlotKey, SubstanceHit, TieBreakRule,
};
use onco_output::{
    OutputFormat, OutputTable, render_collapsed, render_protocols, render_substances,
};
use tempfile::TempDir;

fn hit(text: &str, entry: &str, score: f64) -> SubstanceHit {
    SubstanceHit {
        hit: text.to_string(),
        mapped_to: entry.to_string(),
        similarity: Score::new(score),
    }
}

fn substance_records() -> Vec<ResolvedSubstanceRecord> {
    vec![
        ResolvedSubstanceRecord {
            id: RecordId(1),
            original: "Cisplatin und Gemcitabin".to_string(),
            preprocessed: "Cisplatin und Gemcitabin".to_string(),
            hits: vec![
                hit("Cisplatin", "Cisplatin", 100.0),
                hit("Gemcitabin", "Gemcitabin", 100.0),
            ],
            failed: false,
        },
        ResolvedSubstanceRecord::failed(&FreeTextRecord::new(RecordId(2), "NA", "NA")),
        ResolvedSubstanceRecord {
            id: RecordId(3),
            original: "Carboplatn".to_string(),
            preprocessed: "Carboplatn".to_string(),
            hits: vec![hit("Carboplatn", "Carboplatin", 95.238_095)],
            failed: false,
        },
    ]
}

fn csv(table: &OutputTable, delimiter: u8) -> String {
    String::from_utf8(table.render(OutputFormat::Csv, delimiter).unwrap()).unwrap()
}

#[test]
fn multi_hit_table() {
    let table = render_substances(&substance_records(), OutputMode::MultiHit);
    insta::assert_snapshot!(csv(&table, b','), @r"
    ID,Original,Preprocessed,Hit1,Mapped_to1,Similarity1,Hit2,Mapped_to2,Similarity2
    1,Cisplatin und Gemcitabin,Cisplatin und Gemcitabin,Cisplatin,Cisplatin,100,Gemcitabin,Gemcitabin,100
    2,NA,NA,,,,,,
    3,Carboplatn,Carboplatn,Carboplatn,Carboplatin,95.24,,,
    ");
}

#[test]
fn atomic_table() {
    let table = render_substances(&substance_records(), OutputMode::Atomic);
    insta::assert_snapshot!(csv(&table, b','), @r"
    ID,Original,Preprocessed,Hit,Mapped_to,Similarity
    1,Cisplatin und Gemcitabin,Cisplatin und Gemcitabin,Cisplatin,Cisplatin,100
    2,NA,NA,,,
    3,Carboplatn,Carboplatn,Carboplatn,Carboplatin,95.24
    ");
}

#[test]
fn collapsed_table() {
    let candidate = |entry: &str, score: f64| MatchCandidate {
        source_id: RecordId(1),
        matched_span: entry.to_string(),
        canonical_entry: entry.to_string(),
        similarity: Score::new(score),
    };
    let listed = FreeTextRecord::new(
        RecordId(1),
        "Cisplatin/Carboplatin",
        "Cisplatin/Carboplatin",
    );
    let single = FreeTextRecord::new(RecordId(2), "Cisplatin", "Cisplatin");
    let records = vec![
        CollapsedRecord::aggregate(
            &listed,
            &[candidate("Cisplatin", 100.0), candidate("Carboplatin", 100.0)],
            None,
        ),
        CollapsedRecord::aggregate(
            &single,
            &[candidate("Cisplatin", 80.0)],
            Some(TieBreakRule::Exact),
        ),
        CollapsedRecord::failed(&FreeTextRecord::new(RecordId(3), "NA", "NA")),
    ];
    let table = render_collapsed(&records);
    insta::assert_snapshot!(csv(&table, b','), @r"
    ID,Original,Preprocessed,match,matched_to,similarity
    1,Cisplatin/Carboplatin,Cisplatin/Carboplatin,Cisplatin; Carboplatin,Cisplatin; Carboplatin,100; 100
    2,Cisplatin,Cisplatin,Cisplatin,Cisplatin,80
    3,NA,NA,,,
    ");
}

#[test]
fn protocol_table_with_semicolons() {
    let records = vec![
        ProtocolRecord {
            id: RecordId(1),
            original: "Gemcitabin + Cisplatin".to_string(),
            preprocessed: "Gemcitabin Cisplatin".to_string(),
            extracted_code: None,
            code_similarity: None,
            slots: SlotKey::canonicalize(["Gemcitabin", "Cisplatin"], 2),
            code: Some("GemCis".to_string()),
            overflow: false,
            failed: false,
        },
        ProtocolRecord {
            id: RecordId(2),
            original: "FOLFOX".to_string(),
            preprocessed: "FOLFOX".to_string(),
            extracted_code: Some("FOLFOX".to_string()),
            code_similarity: Some(Score::MAX),
            slots: SlotKey::empty(2),
            code: None,
            overflow: false,
            failed: false,
        },
    ];
    let columns = vec!["substanz_1".to_string(), "substanz_2".to_string()];
    let table = render_protocols(&records, &columns);
    insta::assert_snapshot!(csv(&table, b';'), @r"
    ID;Original;Preprocessed;Extracted_Codes;Similarity_Score;substanz_1;substanz_2;code
    1;Gemcitabin + Cisplatin;Gemcitabin Cisplatin;;;Cisplatin;Gemcitabin;GemCis
    2;FOLFOX;FOLFOX;FOLFOX;100;;;
    ");
}

#[test]
fn json_keeps_column_order_and_nulls() {
    let table = render_substances(&substance_records(), OutputMode::Atomic);
    let bytes = table.render(OutputFormat::Json, b',').unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    let first = value[0].as_object().unwrap();
    let keys: Vec<&str> = first.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["ID", "Original", "Preprocessed", "Hit", "Mapped_to", "Similarity"]
    );
    assert_eq!(value[1]["Hit"], serde_json::Value::Null);
    assert_eq!(value[2]["Similarity"], "95.24");
}

#[test]
fn write_to_path_creates_complete_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    let table = render_substances(&substance_records(), OutputMode::Atomic);
    table.write_to_path(&path, OutputFormat::Csv, b',').unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 4);
    assert!(written.starts_with("ID,Original,Preprocessed,Hit"));
}

#[test]
fn write_to_missing_directory_fails_without_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("out.csv");
    let table = render_substances(&substance_records(), OutputMode::Atomic);
    let error = table.write_to_path(&path, OutputFormat::Csv, b',').unwrap_err();
    assert!(error.to_string().contains("out.csv"));
    assert!(!path.exists());
}

#[test]
fn write_to_path_replaces_existing_file_without_leftovers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    std::fs::write(&path, "stale\n").unwrap();
    let table = render_substances(&substance_records(), OutputMode::Atomic);
    table.write_to_path(&path, OutputFormat::Csv, b',').unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(!written.contains("stale"));
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn failed_rename_leaves_no_temporary_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.csv");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("keep.txt"), "keep").unwrap();
    let table = render_substances(&substance_records(), OutputMode::Atomic);

    assert!(table.write_to_path(&path, OutputFormat::Csv, b',').is_err());
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert!(path.join("keep.txt").exists());
}
