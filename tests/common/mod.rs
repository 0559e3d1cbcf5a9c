// tests/common/mod.rs
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use grace_scan::{Archive, ArchiveFile};

pub const HEADER: &str =
    "DSP;REF_PM;ID;CODE_ERREUR;NATURE_ERREUR;TABLE;REF_ELEMENT;C8;C9;C10;C11;C12;C13;C14;C15";

/// A 15-column data row with the given operator, error code and description.
pub fn data_row(operator: &str, code: &str, description: &str) -> String {
    let mut cells = vec![""; 15];
    cells[0] = operator;
    cells[3] = code;
    cells[4] = description;
    cells.join(";")
}

/// Header plus `count` copies of each `(code, description)` pair.
pub fn data_file(operator: &str, errors: &[(&str, &str, usize)]) -> String {
    let mut lines = vec![HEADER.to_string()];
    for (code, description, count) in errors {
        for _ in 0..*count {
            lines.push(data_row(operator, code, description));
        }
    }
    lines.join("\n")
}

pub fn synthesis_name(element: &str, stamp: &str) -> String {
    format!("RAPPORT_SYNTHESE_GV3_SRO_{element}_{stamp}.txt")
}

/// One run: a synthesis file named after the element and stamp, plus one
/// data file.
pub fn run(element: &str, stamp: &str, data: String) -> Archive {
    Archive::new(
        format!("run_{element}_{stamp}.zip"),
        vec![
            ArchiveFile::new(synthesis_name(element, stamp), "Rapport de synthese\n"),
            ArchiveFile::new("export/ANOMALIES.csv", data),
        ],
    )
}

pub fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, mi, s))
        .expect("valid test date")
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
