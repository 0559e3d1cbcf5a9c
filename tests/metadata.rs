// tests/metadata.rs
mod common;

use common::{at, data_file};
use grace_scan::metadata::{self, RunMetadata};
use grace_scan::{Archive, ArchiveFile};

fn archive(files: Vec<ArchiveFile>) -> Archive {
    Archive::new("lot.zip", files)
}

#[test]
fn element_from_bare_filename() {
    let meta = metadata::from_filename("SRO-ABC-00123");
    assert_eq!(meta.element_ref.as_deref(), Some("SRO-ABC-00123"));
    assert_eq!(meta.timestamp, None);
    assert_eq!(meta.operator_code, None);
}

#[test]
fn permissive_element_shape_in_filename() {
    let meta = metadata::from_filename("rapport_PMZ-NORD-42.txt");
    assert_eq!(meta.element_ref.as_deref(), Some("PMZ-NORD-42"));
}

#[test]
fn compact_stamp_in_filename() {
    let meta = metadata::from_filename("RAPPORT_SYNTHESE_GV3_SRO_20250410094325.txt");
    assert_eq!(meta.timestamp, Some(at(2025, 4, 10, 9, 43, 25)));

    let meta = metadata::from_filename("RAPPORT_SYNTHESE_GV3_SRO_20250423.txt");
    assert_eq!(meta.timestamp, Some(at(2025, 4, 23, 12, 0, 0)));
}

#[test]
fn synthesis_content_fills_what_the_name_lacks() {
    let text = "\
GRACE V3 - Rapport de synthese
Element controle : SRO-XYZ-00042
Genere le 20250410094325
DSP\tRef PM\tDate
ORG\tSRO-XYZ-00042\t20250410094325
";
    let a = archive(vec![ArchiveFile::new("RAPPORT_SYNTHESE_GV3_SRO.txt", text)]);
    let meta = metadata::extract(&a);
    assert_eq!(meta.element_ref.as_deref(), Some("SRO-XYZ-00042"));
    assert_eq!(meta.timestamp, Some(at(2025, 4, 10, 9, 43, 25)));
    assert_eq!(meta.operator_code.as_deref(), Some("ORG"));
}

#[test]
fn filename_wins_over_content() {
    let text = "Element SRO-OTHER-1\nDSP;Ref PM\nORG;SRO-OTHER-1\n";
    let a = archive(vec![ArchiveFile::new(
        "RAPPORT_SYNTHESE_GV3_SRO-ABC-00123_20250410094325.txt",
        text,
    )]);
    let meta = metadata::extract(&a);
    assert_eq!(meta.element_ref.as_deref(), Some("SRO-ABC-00123"));
    assert_eq!(meta.operator_code.as_deref(), Some("ORG"));
}

#[test]
fn data_row_split_on_space_runs() {
    let text = "DSP    Ref PM    Date\n  AXIO    SRO-ABC-00123    20250423101500.000  \n";
    let mut meta = RunMetadata::default();
    assert!(metadata::scan_synthesis(text, &mut meta));
    assert_eq!(meta.operator_code.as_deref(), Some("AXIO"));
    assert_eq!(meta.element_ref.as_deref(), Some("SRO-ABC-00123"));
    assert_eq!(meta.timestamp, Some(at(2025, 4, 23, 10, 15, 0)));
}

#[test]
fn lowercase_operator_is_rejected() {
    let text = "DSP;Date\norg;2025\n";
    let mut meta = RunMetadata::default();
    metadata::scan_synthesis(text, &mut meta);
    assert_eq!(meta.operator_code, None);
}

#[test]
fn header_needs_a_second_marker() {
    let text = "DSP seul\nORG\n";
    let mut meta = RunMetadata::default();
    metadata::scan_synthesis(text, &mut meta);
    assert_eq!(meta.operator_code, None);
}

#[test]
fn operator_from_data_file_column_when_synthesis_has_none() {
    let a = archive(vec![
        ArchiveFile::new("RAPPORT_SYNTHESE_GV3_SRO-ABC-00123.txt", "rien\n"),
        ArchiveFile::new("notes.csv", "texte libre\n"),
        ArchiveFile::new("ANOMALIES.csv", data_file("TLF", &[("ANO_CABLE_3", "x", 1)])),
    ]);
    let meta = metadata::extract(&a);
    assert_eq!(meta.operator_code.as_deref(), Some("TLF"));
}

#[test]
fn column_scan_accepts_any_header_case() {
    let text = "ref;dsp;code\nSRO-A-1;ORG;X\n";
    assert_eq!(metadata::operator_from_table(text).as_deref(), Some("ORG"));
    assert_eq!(metadata::operator_from_table("dsp;code\nOrange;X\n"), None);
    assert_eq!(metadata::operator_from_table("dsp;code\n"), None);
}

#[test]
fn nothing_found_is_not_an_error() {
    let a = archive(vec![ArchiveFile::new("readme.txt", "hello")]);
    assert_eq!(metadata::extract(&a), RunMetadata::default());
}
