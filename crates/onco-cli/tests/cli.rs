//! End-to-end runs of the batch commands over temporary CSV files.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use onco_cli::cli::{Cli, Command, IoArgs};
use onco_cli::commands::{output_path, run_normalize, run_protocols, run_substances};
use onco_cli::config::load_options;
use onco_model::{EngineOptions, OutputMode};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("oncomatch").chain(args.iter().copied())).unwrap()
}

fn substance_fixture(dir: &TempDir) -> (PathBuf, PathBuf) {
    let input = write(
        dir,
        "therapien.csv",
        "ID;Bezeichnung\n1;Cisplatin und Gemcitabin\n2;\n3;5-FU\n",
    );
    let reference = write(
        dir,
        "substanzen.csv",
        "substanz\nCisplatin\nGemcitabin\nFluorouracil\n",
    );
    (input, reference)
}

fn fields(line: &str) -> Vec<&str> {
    line.split(',').collect()
}

#[test]
fn substances_multi_hit_writes_numbered_columns() {
    let dir = TempDir::new().unwrap();
    let (input, reference) = substance_fixture(&dir);
    let cli = parse(&["substances", arg(&input), "--reference", arg(&reference)]);
    let Command::Substances(args) = &cli.command else {
        panic!("expected substances");
    };

    let summary = run_substances(args, &EngineOptions::default(), false).unwrap();
    assert_eq!(summary.mode, Some(OutputMode::MultiHit));
    assert_eq!(summary.stats.records, 3);
    assert_eq!(summary.stats.matched, 2);
    assert_eq!(summary.stats.unmatched, 1);
    assert_eq!(summary.stats.candidates, 3);
    assert_eq!(summary.output, dir.path().join("therapien_substances.csv"));

    let written = fs::read_to_string(&summary.output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines[0],
        "ID,Original,Preprocessed,Hit1,Mapped_to1,Similarity1,Hit2,Mapped_to2,Similarity2"
    );
    let first = fields(lines[1]);
    assert_eq!(first[4], "Cisplatin");
    assert_eq!(first[7], "Gemcitabin");
    assert_eq!(first[8], "100");
    assert_eq!(fields(lines[2])[..4], ["2", "NA", "NA", ""]);
    assert_eq!(
        lines[3],
        "3,5-FU,fluorouracil,fluorouracil,Fluorouracil,100,,,"
    );
}

#[test]
fn substances_atomic_json_keeps_best_hit() {
    let dir = TempDir::new().unwrap();
    let (input, reference) = substance_fixture(&dir);
    let output = dir.path().join("result.json");
    let cli = parse(&[
        "substances",
        arg(&input),
        "--reference",
        arg(&reference),
        "--mode",
        "atomic",
        "--format",
        "json",
        "--output",
        arg(&output),
    ]);
    let Command::Substances(args) = &cli.command else {
        panic!("expected substances");
    };

    let summary = run_substances(args, &EngineOptions::default(), false).unwrap();
    assert_eq!(summary.output, output);
    assert_eq!(summary.stats.candidates, 2);

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.trim_start().starts_with('['));
    assert!(written.contains(r#""Mapped_to": "Cisplatin""#));
    assert!(!written.contains(r#""Mapped_to": "Gemcitabin""#));
    assert!(written.contains(r#""Hit": null"#));
}

#[test]
fn config_file_selects_collapsed_mode() {
    let dir = TempDir::new().unwrap();
    let (input, reference) = substance_fixture(&dir);
    let config = write(&dir, "oncomatch.toml", "[substances]\nmode = \"collapsed\"\n");
    let cli = parse(&[
        "--config",
        arg(&config),
        "substances",
        arg(&input),
        "--reference",
        arg(&reference),
    ]);
    let options = load_options(cli.config.as_deref()).unwrap();
    let Command::Substances(args) = &cli.command else {
        panic!("expected substances");
    };

    let summary = run_substances(args, &options, false).unwrap();
    assert_eq!(summary.mode, Some(OutputMode::Collapsed));

    let written = fs::read_to_string(&summary.output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "ID,Original,Preprocessed,match,matched_to,similarity");
    assert!(lines[1].contains("Cisplatin; Gemcitabin"));
}

#[test]
fn missing_input_column_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let (input, reference) = substance_fixture(&dir);
    let cli = parse(&[
        "substances",
        arg(&input),
        "--reference",
        arg(&reference),
        "--column",
        "Therapie",
    ]);
    let Command::Substances(args) = &cli.command else {
        panic!("expected substances");
    };

    let error = run_substances(args, &EngineOptions::default(), false).unwrap_err();
    assert!(format!("{error:#}").contains("Therapie"));
    assert!(!dir.path().join("therapien_substances.csv").exists());
}

#[test]
fn invalid_threshold_flag_is_fatal() {
    let dir = TempDir::new().unwrap();
    let (input, reference) = substance_fixture(&dir);
    let cli = parse(&[
        "substances",
        arg(&input),
        "--reference",
        arg(&reference),
        "--threshold",
        "85",
    ]);
    let Command::Substances(args) = &cli.command else {
        panic!("expected substances");
    };

    assert!(run_substances(args, &EngineOptions::default(), false).is_err());
    assert!(!dir.path().join("therapien_substances.csv").exists());
}

#[test]
fn protocols_resolve_codes_and_report_reference_issues() {
    let dir = TempDir::new().unwrap();
    let input = write(
        &dir,
        "protokolle.csv",
        "Bezeichnung\nCisplatin + Gemcitabin\nFOLFOX\n",
    );
    let reference = write(
        &dir,
        "referenz.csv",
        "code;substanz_1;substanz_2;substanz_3;therapieart\n\
         GemCis;Gemcitabin;Cisplatin;;Chemo\n\
         FOLFOX;Fluorouracil;Folinsäure;Oxaliplatin;Chemo\n\
         ;Paclitaxel;;;Chemo\n",
    );
    let cli = parse(&["protocols", arg(&input), "--reference", arg(&reference)]);
    let Command::Protocols(args) = &cli.command else {
        panic!("expected protocols");
    };

    let summary = run_protocols(args, &EngineOptions::default(), false).unwrap();
    assert_eq!(summary.mode, None);
    assert_eq!(summary.stats.records, 2);
    assert_eq!(summary.stats.matched, 1);
    assert_eq!(summary.reference_issues.len(), 1);
    assert_eq!(summary.reference_issues[0].row, 3);

    let written = fs::read_to_string(&summary.output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines[0],
        "ID,Original,Preprocessed,Extracted_Codes,Similarity_Score,\
         substanz_1,substanz_2,substanz_3,code"
    );
    let first = fields(lines[1]);
    assert_eq!(first[3], "");
    assert_eq!(first[5..], ["Cisplatin", "Gemcitabin", "", "GemCis"]);
    let second = fields(lines[2]);
    assert_eq!(second[3], "FOLFOX");
    assert_eq!(second[4], "100");
    assert_eq!(second[8], "");
}

#[test]
fn protocols_reject_more_slots_than_the_reference_has() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "protokolle.csv", "Bezeichnung\nGemCis\n");
    let reference = write(
        &dir,
        "referenz.csv",
        "code;substanz_1;substanz_2\nGemCis;Gemcitabin;Cisplatin\n",
    );
    let cli = parse(&[
        "protocols",
        arg(&input),
        "--reference",
        arg(&reference),
        "--slot-count",
        "7",
    ]);
    let Command::Protocols(args) = &cli.command else {
        panic!("expected protocols");
    };

    assert!(run_protocols(args, &EngineOptions::default(), false).is_err());
}

#[test]
fn protocols_with_fewer_slots_exclude_wider_reference_rows() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "protokolle.csv", "Bezeichnung\n5-FU + Oxaliplatin\n");
    let reference = write(
        &dir,
        "referenz.csv",
        "code;substanz_1;substanz_2;substanz_3\n\
         FOLFOX;Oxaliplatin;Fluorouracil;Folinsäure\n\
         GemCis;Gemcitabin;Cisplatin;\n",
    );
    let cli = parse(&[
        "protocols",
        arg(&input),
        "--reference",
        arg(&reference),
        "--slot-count",
        "2",
    ]);
    let Command::Protocols(args) = &cli.command else {
        panic!("expected protocols");
    };

    let summary = run_protocols(args, &EngineOptions::default(), false).unwrap();
    assert_eq!(summary.reference_issues.len(), 1);
    assert_eq!(summary.reference_issues[0].code, "FOLFOX");
    assert_eq!(summary.stats.matched, 0);

    let written = fs::read_to_string(&summary.output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert!(lines[0].ends_with("substanz_1,substanz_2,code"));
    assert_eq!(fields(lines[1]).last(), Some(&""));
}

#[test]
fn normalize_prints_one_line_per_argument() {
    let cli = parse(&["normalize", "5-FU", "Cisplatin 75 mg/m² wöchentlich", ""]);
    let Command::Normalize(args) = &cli.command else {
        panic!("expected normalize");
    };
    assert_eq!(run_normalize(args), vec!["fluorouracil", "Cisplatin", "NA"]);
}

#[test]
fn default_output_follows_input_name_and_format() {
    let cli = parse(&[
        "protocols",
        "/data/protokolle.csv",
        "--reference",
        "/data/referenz.csv",
        "--format",
        "json",
    ]);
    let Command::Protocols(args) = &cli.command else {
        panic!("expected protocols");
    };
    let io: &IoArgs = &args.io;
    assert_eq!(
        output_path(io, "protocols"),
        PathBuf::from("/data/protokolle_protocols.json")
    );
}
