// tests/settings.rs
use std::fs;
use std::path::PathBuf;

use grace_scan::config::{AnalysisOptions, ExportFormat, Settings};
use grace_scan::GraceError;

#[test]
fn defaults_when_file_is_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let s = Settings::load(&tmp.path().join("grace.toml")).unwrap();
    assert_eq!(s, Settings::default());

    let mut opts = AnalysisOptions::default();
    s.apply(&mut opts);
    assert_eq!(opts, AnalysisOptions::default());
    assert_eq!(opts.export.format, ExportFormat::Csv);
    assert!(opts.export.include_headers);
}

#[test]
fn file_values_fold_into_options() {
    let s = Settings::parse(
        r#"
        taxonomy = "ref/FAMILLE.csv"
        out_dir = "out/reports"
        format = "tsv"
        include_headers = false
        families = ["CABLE", "PBO"]
        "#,
    )
    .unwrap();
    assert_eq!(s.families, vec!["CABLE", "PBO"]);

    let mut opts = AnalysisOptions::default();
    s.apply(&mut opts);
    assert_eq!(opts.taxonomy_path, Some(PathBuf::from("ref/FAMILLE.csv")));
    assert_eq!(opts.export.out_dir, PathBuf::from("out/reports"));
    assert_eq!(opts.export.format, ExportFormat::Tsv);
    assert!(!opts.export.include_headers);
    assert!(opts.export.path_for("comparison").ends_with("out/reports/comparison.tsv"));
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(Settings::parse("colour = \"blue\"").is_err());
    assert!(Settings::parse("format = \"xlsx\"").is_err());
}

#[test]
fn malformed_file_is_a_config_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("grace.toml");
    fs::write(&path, "format = [").unwrap();
    assert!(matches!(Settings::load(&path), Err(GraceError::Config(_))));
}

#[test]
fn save_then_load() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("grace.toml");
    let s = Settings { format: Some(ExportFormat::Tsv), families: vec!["BPE".into()], ..Default::default() };
    s.save(&path).unwrap();
    assert_eq!(Settings::load(&path).unwrap(), s);
}
