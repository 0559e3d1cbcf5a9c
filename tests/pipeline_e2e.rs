// tests/pipeline_e2e.rs
mod common;

use std::fs;
use std::path::Path;

use common::{at, data_file, synthesis_name, HEADER};
use grace_scan::config::Selection;
use grace_scan::{Archive, ArchiveFile, ArchiveSource, DirArchive, GraceError, Session, Taxonomy};

fn write_run(root: &Path, dir: &str, element: &str, stamp: &str, data: String) -> DirArchive {
    let run = root.join(dir);
    fs::create_dir_all(run.join("export")).unwrap();
    fs::write(run.join(synthesis_name(element, stamp)), "Synthese\n").unwrap();
    fs::write(run.join("export").join("ANOMALIES.csv"), data).unwrap();
    fs::write(run.join("export").join("resume.csv"), "total;12\n").unwrap();
    fs::write(run.join("lisezmoi.txt"), "pas un tableau").unwrap();
    DirArchive::new(run)
}

fn cells(pairs: &[(usize, &str)], width: usize) -> String {
    let mut row = vec![""; width];
    for &(i, v) in pairs {
        row[i] = v;
    }
    row.join(";")
}

#[test]
fn dir_archive_lists_files_in_path_order() {
    let tmp = tempfile::tempdir().unwrap();
    let run = write_run(tmp.path(), "run1", "SRO-ABC-00123", "20250410094325", data_file("ABC", &[]));
    assert_eq!(run.name(), "run1");
    let archive = run.read().unwrap();
    let names: Vec<&str> = archive.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "RAPPORT_SYNTHESE_GV3_SRO_SRO-ABC-00123_20250410094325.txt",
            "export/ANOMALIES.csv",
            "export/resume.csv",
            "lisezmoi.txt",
        ]
    );
    assert_eq!(archive.data_files().count(), 2);
    assert!(archive.synthesis().is_some());
}

#[test]
fn analyze_run_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let runs = vec![
        write_run(tmp.path(), "a", "SRO-ABC-00123", "20250410094325", data_file("ABC", &[("ANO_CABLE_3", "x", 3)])),
        write_run(tmp.path(), "b", "SRO-ABC-00123", "20250423094325", data_file("ABC", &[("ANO_CABLE_3", "x", 5)])),
        write_run(tmp.path(), "c", "SRO-DEF-00001", "20250423094325", data_file("DEF", &[("BPE_126_A", "y", 2)])),
    ];
    let mut session = Session::new(Taxonomy::builtin());
    let summary = session.analyze(&runs, None);

    assert!(summary.is_clean());
    assert_eq!((summary.archives, summary.records, summary.elements), (3, 10, 2));
    assert_eq!(session.header().map(|h| h.join(";")), Some(HEADER.to_string()));

    let elements = session.elements();
    assert_eq!(elements[0].element_ref, "SRO-ABC-00123");
    assert_eq!((elements[0].periods, elements[0].records), (2, 8));
    assert_eq!((elements[1].periods, elements[1].records), (1, 2));

    let first = &session.corpus()[0];
    assert_eq!(first.operator_code, "ABC");
    assert_eq!(first.timestamp, at(2025, 4, 10, 9, 43, 25));
    assert_eq!(first.source_archive, "a");
    assert_eq!(first.source_file, "export/ANOMALIES.csv");
}

#[test]
fn rerun_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let runs = vec![
        write_run(tmp.path(), "a", "SRO-ABC-00123", "20250410094325", data_file("ABC", &[("ANO_CABLE_3", "x", 3), ("PBO_101_A", "p", 1)])),
        write_run(tmp.path(), "b", "SRO-ABC-00123", "20250423094325", data_file("ABC", &[("ANO_CABLE_3", "x", 5)])),
    ];
    let mut session = Session::new(Taxonomy::builtin());

    session.analyze(&runs, None);
    session.select_all();
    let first = session.diff().unwrap();
    let size = session.corpus().len();

    session.analyze(&runs, None);
    session.select_all();
    assert_eq!(session.corpus().len(), size);
    assert_eq!(session.diff().unwrap(), first);
}

#[test]
fn unreadable_archive_is_reported_and_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let good = write_run(tmp.path(), "ok", "SRO-ABC-00123", "20250410094325", data_file("ABC", &[("ANO_CABLE_3", "x", 2)]));
    let runs = vec![DirArchive::new(tmp.path().join("absent")), good];

    let mut session = Session::new(Taxonomy::builtin());
    let summary = session.analyze(&runs, None);

    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].archive, "absent");
    assert!(matches!(summary.failures[0].error, GraceError::ArchiveRead { .. }));
    assert_eq!(summary.records, 2);
}

#[test]
fn row_level_fallbacks() {
    let header = cells(&[(0, "A"), (3, "D"), (14, "O")], 15);
    let rows = [
        header,
        cells(&[(0, "ORG"), (3, "ANO_CABLE_3"), (6, "PM: SRO-QQQ-9 (x)"), (14, "exp 20250301")], 15),
        cells(&[(0, "ABCDE"), (3, "X"), (5, "pm-libre"), (15, "20250302103000")], 16),
        cells(&[(1, "SRO-B-2"), (3, "PBO_101_A")], 15),
        cells(&[(3, "ANO_CABLE_3")], 15),
        String::from("ORG;court;X"),
    ];
    let archive = Archive::new("lot_20250310.zip", vec![ArchiveFile::new("a.csv", rows.join("\n"))]);

    let mut session = Session::new(Taxonomy::builtin()).with_clock(at(2030, 1, 1, 8, 0, 0));
    assert_eq!(session.ingest(&archive).unwrap(), 4);
    let c = session.corpus();

    assert_eq!(c[0].element_ref, "SRO-QQQ-9");
    assert_eq!(c[0].timestamp, at(2025, 3, 1, 12, 0, 0));
    assert_eq!(c[0].operator_code, "ORG");

    assert_eq!(c[1].element_ref, "pm-libre");
    assert_eq!(c[1].timestamp, at(2025, 3, 2, 10, 30, 0));
    assert_eq!(c[1].operator_code, "UNKNOWN");
    assert_eq!(c[1].error_family, "AUTRES");
    assert_eq!(c[1].raw_fields.len(), 15);

    assert_eq!(c[2].element_ref, "SRO-B-2");
    assert_eq!(c[2].timestamp, at(2025, 3, 10, 12, 0, 0));
    assert_eq!(c[2].error_family, "PBO");

    assert_eq!(c[3].element_ref, "UNKNOWN");

    let undated = Archive::new("lot_sans_date", vec![ArchiveFile::new("a.csv", rows[..2].join("\n").replace("exp 20250301", ""))]);
    session.ingest(&undated).unwrap();
    assert_eq!(session.corpus()[4].timestamp, at(2030, 1, 1, 8, 0, 0));
}

#[test]
fn narrow_files_yield_no_records() {
    let archive = Archive::new(
        "lot",
        vec![
            ArchiveFile::new("RAPPORT_SYNTHESE_GV3_SRO-ABC-1_20250410094325.txt", ""),
            ArchiveFile::new("court.csv", "DSP;CODE\nABC;ANO_CABLE_3\n"),
        ],
    );
    let mut session = Session::new(Taxonomy::builtin());
    assert_eq!(session.ingest(&archive).unwrap(), 0);
    assert!(session.header().is_none());
}

#[test]
fn header_is_captured_once_and_reset_clears_everything() {
    let other_header = HEADER.replace("NATURE_ERREUR", "AUTRE");
    let first = common::run("SRO-ABC-00123", "20250410094325", data_file("ABC", &[("ANO_CABLE_3", "x", 1)]));
    let second = Archive::new(
        "run2",
        vec![ArchiveFile::new("b.csv", format!("{other_header}\n{}", common::data_row("ABC", "X", "y")))],
    );

    let mut session = Session::new(Taxonomy::builtin());
    session.analyze(&[first, second], None);
    assert_eq!(session.header().map(|h| h[4].as_str()), Some("NATURE_ERREUR"));

    session.select_all();
    session.reset();
    assert!(session.corpus().is_empty());
    assert!(session.header().is_none());
    assert!(session.index().is_empty());
    assert_eq!(session.selection(), &Selection::default());
    assert!(session.families().contains(&"CABLE".to_string()));
}

#[test]
fn inch_mark_in_description_keeps_following_rows() {
    let data = data_file(
        "ABC",
        &[("ANO_CABLE_3", "Gaine 3/4\" abimee", 1), ("BPE_126_A", "ok", 1), ("PBO_101_A", "ok", 1)],
    );
    let mut session = Session::new(Taxonomy::builtin());
    session.ingest(&common::run("SRO-ABC-00123", "20250410094325", data)).unwrap();

    let corpus = session.corpus();
    assert_eq!(corpus.len(), 3);
    assert_eq!(corpus[0].description(), "Gaine 3/4\" abimee");
    assert_eq!(corpus[2].error_code, "PBO_101_A");
}
