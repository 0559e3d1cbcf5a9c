// src/metadata.rs
//! # Run metadata recovery
//!
//! Exports rarely carry the element reference, the run timestamp and the
//! operator code (DSP) in a structured field. They are recovered here with an
//! ordered chain of resolvers over one partially-filled [`RunMetadata`]:
//!
//! 1. [`SynthesisFileName`] – patterns in the synthesis file's name.
//! 2. [`SynthesisContent`] – line scan of the synthesis document, including the
//!    `DSP` header row / data row pair.
//! 3. [`DataFileColumn`] – a `DSP` column in the first data row of the run's
//!    tables, only while no operator code is known.
//!
//! A resolver only fills fields that are still empty; it never overwrites.
//! Nothing here fails: whatever stays unresolved is `None` and becomes
//! `UNKNOWN` further down the pipeline.
use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::archive::Archive;
use crate::config::consts::{ELEMENT_MARKER, HEADER_MARKERS, OPERATOR_HEADER, SYNTHESIS_SEPARATORS};
use crate::core::patterns::{
    find_element_ref, find_stamp14, find_strict_element_ref, is_operator_code, parse_compact,
    stamp_from_name,
};
use crate::core::sanitize::clean_cell;
use crate::csv::{sniff, SniffMode};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetadata {
    pub element_ref: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
    pub operator_code: Option<String>,
}

impl RunMetadata {
    pub fn fill_element(&mut self, value: &str) -> bool {
        fill(&mut self.element_ref, || s!(value))
    }

    pub fn fill_timestamp(&mut self, value: NaiveDateTime) -> bool {
        fill(&mut self.timestamp, || value)
    }

    pub fn fill_operator(&mut self, value: &str) -> bool {
        fill(&mut self.operator_code, || s!(value))
    }

    pub fn is_complete(&self) -> bool {
        self.element_ref.is_some() && self.timestamp.is_some() && self.operator_code.is_some()
    }
}

fn fill<T>(slot: &mut Option<T>, value: impl FnOnce() -> T) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value());
    true
}

/// One step of the recovery chain.
pub trait Resolver {
    fn name(&self) -> &'static str;

    /// Fill whatever `meta` still lacks from `archive`. Returns `true` when at
    /// least one field was filled.
    fn resolve(&self, archive: &Archive, meta: &mut RunMetadata) -> bool;
}

pub struct SynthesisFileName;
pub struct SynthesisContent;
pub struct DataFileColumn;

pub fn default_chain() -> [&'static dyn Resolver; 3] {
    [&SynthesisFileName, &SynthesisContent, &DataFileColumn]
}

/// Run the default chain over one archive.
pub fn extract(archive: &Archive) -> RunMetadata {
    run_chain(archive, &default_chain())
}

pub fn run_chain(archive: &Archive, chain: &[&dyn Resolver]) -> RunMetadata {
    let mut meta = RunMetadata::default();
    for resolver in chain {
        if meta.is_complete() {
            break;
        }
        if resolver.resolve(archive, &mut meta) {
            debug!(archive = %archive.name, resolver = resolver.name(), ?meta, "metadata filled");
        }
    }
    info!(
        archive = %archive.name,
        element = meta.element_ref.as_deref().unwrap_or("-"),
        timestamp = ?meta.timestamp,
        operator = meta.operator_code.as_deref().unwrap_or("-"),
        "run metadata"
    );
    meta
}

impl Resolver for SynthesisFileName {
    fn name(&self) -> &'static str { "synthesis-filename" }

    fn resolve(&self, archive: &Archive, meta: &mut RunMetadata) -> bool {
        let Some(file) = archive.synthesis() else { return false };
        fill_from_filename(&file.name, meta)
    }
}

impl Resolver for SynthesisContent {
    fn name(&self) -> &'static str { "synthesis-content" }

    fn resolve(&self, archive: &Archive, meta: &mut RunMetadata) -> bool {
        let Some(file) = archive.synthesis() else { return false };
        debug!(file = %file.name, "synthesis file found");
        scan_synthesis(&file.text, meta)
    }
}

impl Resolver for DataFileColumn {
    fn name(&self) -> &'static str { "data-file-column" }

    fn resolve(&self, archive: &Archive, meta: &mut RunMetadata) -> bool {
        if meta.operator_code.is_some() {
            return false;
        }
        for file in archive.data_files() {
            if let Some(code) = operator_from_table(&file.text) {
                debug!(file = %file.name, operator = %code, "operator code from DSP column");
                return meta.fill_operator(&code);
            }
        }
        false
    }
}

/* ---------------- Filename ---------------- */

/// Metadata recoverable from a file name alone.
pub fn from_filename(name: &str) -> RunMetadata {
    let mut meta = RunMetadata::default();
    fill_from_filename(name, &mut meta);
    meta
}

fn fill_from_filename(name: &str, meta: &mut RunMetadata) -> bool {
    let mut filled = false;
    if let Some(element) = find_element_ref(name) {
        filled |= meta.fill_element(element);
    }
    if let Some(ts) = stamp_from_name(name) {
        filled |= meta.fill_timestamp(ts);
    }
    filled
}

/* ---------------- Synthesis document ---------------- */

/// Line scan of the synthesis document. Fills element reference, timestamp
/// and operator code where still empty.
pub fn scan_synthesis(text: &str, meta: &mut RunMetadata) -> bool {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut filled = false;

    for (i, line) in lines.iter().enumerate() {
        if meta.element_ref.is_none() && line.contains(ELEMENT_MARKER) {
            if let Some(element) = find_strict_element_ref(line) {
                filled |= meta.fill_element(element);
            }
        }

        if meta.timestamp.is_none() {
            if let Some(ts) = find_stamp14(line).and_then(parse_compact) {
                filled |= meta.fill_timestamp(ts);
            }
        }

        if meta.operator_code.is_none() && is_operator_header(line) {
            debug!(line = i, "DSP header row");
            let Some(data) = lines.get(i + 1).map(|l| l.trim()) else { continue };
            if data.is_empty() {
                continue;
            }
            filled |= fill_from_data_row(data, meta);
        }
    }
    filled
}

fn is_operator_header(line: &str) -> bool {
    line.contains(OPERATOR_HEADER) && HEADER_MARKERS.iter().any(|m| line.contains(m))
}

/// Split the row under the `DSP` header with each separator in turn; the
/// first token that looks like an operator code wins. The same split then
/// offers the element reference (2nd token) and timestamp (3rd token).
fn fill_from_data_row(data: &str, meta: &mut RunMetadata) -> bool {
    for sep in SYNTHESIS_SEPARATORS {
        let parts: Vec<&str> = data.split(sep).map(str::trim).filter(|p| !p.is_empty()).collect();
        let Some(candidate) = parts.first() else { continue };
        if !is_operator_code(candidate) {
            continue;
        }
        debug!(separator = ?sep, operator = %candidate, "operator code from synthesis data row");
        let mut filled = meta.fill_operator(candidate);
        if let Some(element) = parts.get(1).filter(|p| p.contains(ELEMENT_MARKER)) {
            filled |= meta.fill_element(element);
        }
        if let Some(ts) = parts.get(2).and_then(|p| stamp_from_cell(p)) {
            filled |= meta.fill_timestamp(ts);
        }
        return filled;
    }

    // Last resort: first whitespace-delimited word.
    match data.split_whitespace().next() {
        Some(word) if is_operator_code(word) => {
            debug!(operator = %word, "operator code from first word");
            meta.fill_operator(word)
        }
        _ => false,
    }
}

/// `20250410094325.123` / `20250410094325,5` → the 14-digit stamp.
fn stamp_from_cell(cell: &str) -> Option<NaiveDateTime> {
    let head = cell.split([',', '.']).next().unwrap_or("").trim();
    if head.len() == 14 && head.bytes().all(|b| b.is_ascii_digit()) {
        parse_compact(head)
    } else {
        None
    }
}

/* ---------------- Data-file column ---------------- */

/// Value of the `DSP` column in the first data row of a table, if it is a
/// well-formed operator code.
pub fn operator_from_table(text: &str) -> Option<String> {
    let table = sniff(text, SniffMode::Probe)?;
    if table.rows.len() < 2 {
        return None;
    }
    let header = &table.rows[0];
    let col = header
        .iter()
        .position(|h| clean_cell(h).eq_ignore_ascii_case(OPERATOR_HEADER))?;
    let value = table.rows[1].get(col)?.trim();
    is_operator_code(value).then(|| s!(value))
}
