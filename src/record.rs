// src/record.rs
use chrono::{Local, NaiveDateTime};
use tracing::debug;

use crate::archive::ArchiveFile;
use crate::config::consts::{
    DESCRIPTION_COL, ELEMENT_COLS, ERROR_CODE_COL, NOT_AVAILABLE, OPERATOR_COL, RAW_FIELD_COUNT,
    TIMESTAMP_COLS, UNKNOWN,
};
use crate::core::patterns::{find_loose_element_ref, is_row_operator_code, stamp_from_token};
use crate::csv::{sniff, SniffMode};
use crate::metadata::RunMetadata;
use crate::period::Period;
use crate::taxonomy::Taxonomy;

/// One data row from one source file, fully resolved and classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub element_ref: String,
    pub timestamp: NaiveDateTime,
    pub operator_code: String,
    pub error_code: String,
    pub error_family: String,
    pub source_archive: String,
    pub source_file: String,
    /// Columns A..O verbatim, padded with empty strings.
    pub raw_fields: [String; RAW_FIELD_COUNT],
}

impl Record {
    pub fn period(&self) -> Period {
        Period::of(Some(self.timestamp))
    }

    /// Column E (error nature), `N/A` when blank.
    pub fn description(&self) -> &str {
        let d = self.raw_fields[DESCRIPTION_COL].as_str();
        if d.is_empty() { NOT_AVAILABLE } else { d }
    }
}

/// Records and header row from one accepted data file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecords {
    pub header: Vec<String>,
    pub records: Vec<Record>,
}

/// Turns the data files of one archive into records, using the archive's
/// metadata first and per-row fallbacks after that.
pub struct RecordBuilder<'a> {
    taxonomy: &'a Taxonomy,
    meta: &'a RunMetadata,
    archive_name: &'a str,
    archive_stamp: Option<NaiveDateTime>,
    now: NaiveDateTime,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(taxonomy: &'a Taxonomy, meta: &'a RunMetadata, archive_name: &'a str) -> Self {
        Self {
            taxonomy,
            meta,
            archive_name,
            archive_stamp: stamp_from_token(archive_name),
            now: Local::now().naive_local(),
        }
    }

    /// Pin the last-resort timestamp (the wall clock by default).
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    /// Parse one file. `None` when no delimiter yields a wide enough table;
    /// the caller skips the file.
    pub fn build_file(&self, file: &ArchiveFile) -> Option<FileRecords> {
        let Some(table) = sniff(&file.text, SniffMode::Data) else {
            debug!(archive = self.archive_name, file = %file.name, "unparsable data file skipped");
            return None;
        };
        let mut rows = table.rows.into_iter();
        let header = rows.next().unwrap_or_default();
        let records: Vec<Record> = rows.filter_map(|row| self.build_row(&file.name, &row)).collect();
        debug!(
            archive = self.archive_name,
            file = %file.name,
            delim = ?table.delim,
            records = records.len(),
            "data file parsed"
        );
        Some(FileRecords { header, records })
    }

    /// Rows narrower than `RAW_FIELD_COUNT` are dropped.
    pub fn build_row(&self, file_name: &str, row: &[String]) -> Option<Record> {
        if row.len() < RAW_FIELD_COUNT {
            return None;
        }
        let error_code = row[ERROR_CODE_COL].clone();
        let error_family = s!(self.taxonomy.classify(&error_code));
        Some(Record {
            element_ref: self.element_ref(row),
            timestamp: self.timestamp(row),
            operator_code: self.operator_code(row),
            error_code,
            error_family,
            source_archive: s!(self.archive_name),
            source_file: s!(file_name),
            raw_fields: std::array::from_fn(|i| row.get(i).cloned().unwrap_or_default()),
        })
    }

    fn element_ref(&self, row: &[String]) -> String {
        if let Some(element) = &self.meta.element_ref {
            return element.clone();
        }
        let candidate = ELEMENT_COLS
            .iter()
            .filter_map(|&c| row.get(c))
            .find(|cell| !cell.is_empty());
        match candidate {
            Some(cell) => s!(find_loose_element_ref(cell).unwrap_or(cell)),
            None => s!(UNKNOWN),
        }
    }

    fn timestamp(&self, row: &[String]) -> NaiveDateTime {
        if let Some(ts) = self.meta.timestamp {
            return ts;
        }
        let end = TIMESTAMP_COLS.end.min(row.len());
        let start = TIMESTAMP_COLS.start.min(end);
        row[start..end]
            .iter()
            .find_map(|cell| stamp_from_token(cell))
            .or(self.archive_stamp)
            .unwrap_or(self.now)
    }

    fn operator_code(&self, row: &[String]) -> String {
        if let Some(op) = &self.meta.operator_code {
            return op.clone();
        }
        match row.get(OPERATOR_COL).map(|c| c.trim()) {
            Some(c) if is_row_operator_code(c) => s!(c),
            _ => s!(UNKNOWN),
        }
    }
}
