// src/core/patterns.rs
//! Shapes recovered from filenames, free text and table cells: element
//! references (`SRO-ABC-00123`), compact timestamps (`20250410094325`) and
//! operator codes (`ABC`).
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::config::consts::DATE_ONLY_TIME;

static ELEMENT_STRICT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SRO-[A-Z]+-\d+").expect("static regex"));
static ELEMENT_LOOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{2,5}-[A-Z]+-\d+").expect("static regex"));
static STAMP_14: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{14}").expect("static regex"));
static STAMP_8: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{8}").expect("static regex"));
static STAMP_ANY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{8,14}").expect("static regex"));
static OPERATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{2,5}$").expect("static regex"));
static ROW_OPERATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{2,4}$").expect("static regex"));

/// `SRO-<letters>-<digits>` anywhere in `s`.
pub fn find_strict_element_ref(s: &str) -> Option<&str> {
    ELEMENT_STRICT.find(s).map(|m| m.as_str())
}

/// `<2-5 letters>-<letters>-<digits>` anywhere in `s`.
pub fn find_loose_element_ref(s: &str) -> Option<&str> {
    ELEMENT_LOOSE.find(s).map(|m| m.as_str())
}

/// Strict shape first, then the permissive one.
pub fn find_element_ref(s: &str) -> Option<&str> {
    find_strict_element_ref(s).or_else(|| find_loose_element_ref(s))
}

/// First run of 14 digits.
pub fn find_stamp14(s: &str) -> Option<&str> {
    STAMP_14.find(s).map(|m| m.as_str())
}

/// `YYYYMMDDhhmmss` (extra trailing characters ignored). Out-of-range
/// calendar values yield `None`.
pub fn parse_compact(stamp: &str) -> Option<NaiveDateTime> {
    let digits = stamp.get(..14)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let num = |r: std::ops::Range<usize>| digits[r].parse::<u32>().ok();
    let year = i32::try_from(num(0..4)?).ok()?;
    NaiveDate::from_ymd_opt(year, num(4..6)?, num(6..8)?)?
        .and_hms_opt(num(8..10)?, num(10..12)?, num(12..14)?)
}

/// Filename rule: a 14-digit stamp, else an 8-digit date at noon.
pub fn stamp_from_name(name: &str) -> Option<NaiveDateTime> {
    if let Some(full) = find_stamp14(name) {
        return parse_compact(full);
    }
    let date = STAMP_8.find(name)?.as_str();
    parse_compact(&join!(date, DATE_ONLY_TIME))
}

/// Cell / archive-name rule: the first digit run of exactly 8 or 14 digits
/// that forms a valid stamp. 14 digits carry the time, 8 digits are a date at
/// noon; runs of other lengths are skipped.
pub fn stamp_from_token(s: &str) -> Option<NaiveDateTime> {
    STAMP_ANY.find_iter(s).find_map(|m| {
        let run = m.as_str();
        match run.len() {
            14 => parse_compact(run),
            8 => parse_compact(&join!(run, DATE_ONLY_TIME)),
            _ => None,
        }
    })
}

/// 2–5 uppercase ASCII letters, whole string.
pub fn is_operator_code(s: &str) -> bool {
    OPERATOR.is_match(s)
}

/// 2–4 uppercase ASCII letters, whole string (first-column fallback).
pub fn is_row_operator_code(s: &str) -> bool {
    ROW_OPERATOR.is_match(s)
}
