use onco_model::{
    CollapsedRecord, EngineOptions, FreeTextRecord, MatchCandidate, OptionsError, OutputMode,
    RecordId, ResolvedSubstanceRecord, Score, SlotKey, SubstanceOptions,
};
use proptest::prelude::*;

fn candidate(id: usize, span: &str, entry: &str, score: f64) -> MatchCandidate {
    MatchCandidate {
        source_id: RecordId(id),
        matched_span: span.to_string(),
        canonical_entry: entry.to_string(),
        similarity: Score::new(score),
    }
}

#[test]
fn partial_toml_config_uses_defaults() {
    let options: EngineOptions = toml::from_str(
        r#"
        parallel = false

        [substances]
        threshold = 0.9
        mode = "atomic"

        [protocols]
        slot_count = 7
        "#,
    )
    .expect("parse config");

    assert!(!options.parallel);
    assert_eq!(options.substances.threshold, 0.9);
    assert_eq!(options.substances.max_per_entry, 2);
    assert_eq!(options.substances.mode, OutputMode::Atomic);
    assert_eq!(options.protocols.slot_count, Some(7));
    assert_eq!(options.protocols.code_cutoff, 0.9);
    assert_eq!(options.protocols.slot_prefix, "substanz_");
    assert_eq!(options.matcher.min_score, 75.0);
    assert!(options.validate().is_ok());
}

#[test]
fn invalid_options_are_rejected() {
    let options = SubstanceOptions::default().with_threshold(1.5);
    assert_eq!(
        options.validate(),
        Err(OptionsError::FractionOutOfRange {
            name: "substances.threshold",
            value: 1.5
        })
    );

    let options = SubstanceOptions::default().with_max_per_entry(0);
    assert!(matches!(
        options.validate(),
        Err(OptionsError::ZeroCount { .. })
    ));

    let mut engine = EngineOptions::default();
    engine.protocols.slot_count = Some(0);
    assert!(engine.validate().is_err());

    let mut engine = EngineOptions::default();
    engine.matcher.min_score = 120.0;
    assert!(matches!(
        engine.validate(),
        Err(OptionsError::ScoreOutOfRange { .. })
    ));
}

#[test]
fn slot_column_names_follow_prefix() {
    let options = EngineOptions::default().protocols;
    assert_eq!(
        options.slot_columns(3),
        vec!["substanz_1", "substanz_2", "substanz_3"]
    );
}

#[test]
fn collapsed_record_dedupes_entries_but_keeps_spans() {
    let record = FreeTextRecord::new(RecordId(4), "Cis / Cis", "Cis Cis");
    let candidates = vec![
        candidate(4, "Cis", "Cisplatin", 90.0),
        candidate(4, "Cis", "Cisplatin", 88.0),
        candidate(4, "Carbo", "Carboplatin", 86.0),
    ];
    let collapsed = CollapsedRecord::aggregate(&record, &candidates, None);

    assert_eq!(collapsed.joined_matches(), "Cis; Cis; Carbo");
    assert_eq!(collapsed.joined_matched_to(), "Cisplatin; Carboplatin");
    assert_eq!(collapsed.joined_similarity(), "90; 86");
}

#[test]
fn resolved_record_serializes_without_default_flags() {
    let record = FreeTextRecord::new(RecordId(1), "Cisplatin", "Cisplatin");
    let resolved = ResolvedSubstanceRecord {
        id: record.id,
        original: record.original.clone(),
        preprocessed: record.preprocessed.clone(),
        hits: Vec::new(),
        failed: false,
    };
    let json = serde_json::to_string(&resolved).expect("serialize");
    assert!(!json.contains("failed"));
    let round: ResolvedSubstanceRecord = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(round, resolved);

    let failed = ResolvedSubstanceRecord::failed(&record);
    let json = serde_json::to_string(&failed).expect("serialize");
    assert!(json.contains("\"failed\":true"));
}

proptest! {
    #[test]
    fn canonical_key_ignores_discovery_order(
        names in prop::collection::vec("[A-Z][a-z]{2,8}", 0..6),
        rotate in 0usize..6,
    ) {
        let mut shuffled = names.clone();
        if !shuffled.is_empty() {
            let by = rotate % shuffled.len();
            shuffled.rotate_left(by);
            shuffled.reverse();
        }
        let width = 7;
        prop_assert_eq!(
            SlotKey::canonicalize(names, width),
            SlotKey::canonicalize(shuffled, width)
        );
    }
}
