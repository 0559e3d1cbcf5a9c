// src/config/consts.rs

// Record shape
pub const RAW_FIELD_COUNT: usize = 15;
pub const ERROR_CODE_COL: usize = 3;
pub const DESCRIPTION_COL: usize = 4;
pub const OPERATOR_COL: usize = 0;
/// Candidate columns for the element reference, in precedence order (G, F, B).
pub const ELEMENT_COLS: [usize; 3] = [6, 5, 1];
/// Columns scanned for an embedded timestamp (O..T).
pub const TIMESTAMP_COLS: std::ops::Range<usize> = 14..20;

// Sentinels
pub const UNKNOWN: &str = "UNKNOWN";
pub const FALLBACK_FAMILY: &str = "AUTRES";
pub const NOT_AVAILABLE: &str = "N/A";

// Archive layout
pub const SYNTHESIS_MARKER: &str = "RAPPORT_SYNTHESE_GV3_SRO";
pub const DATA_FILE_EXT: &str = ".csv";

// Synthesis document
pub const ELEMENT_MARKER: &str = "SRO-";
pub const OPERATOR_HEADER: &str = "DSP";
pub const HEADER_MARKERS: [&str; 3] = ["Ref PM", "Date", "PM"];
/// Separators tried on the synthesis data row, widest whitespace run first.
pub const SYNTHESIS_SEPARATORS: [&str; 7] = ["\t", "    ", "   ", "  ", " ", ";", ","];

// Delimited text
pub const DELIMITER_CANDIDATES: [char; 4] = [';', ',', '\t', '|'];
/// Rows parsed when probing a data file for the operator column.
pub const PROBE_PREVIEW_ROWS: usize = 5;

// Timestamps
/// Time of day assumed for date-only (8-digit) stamps.
pub const DATE_ONLY_TIME: &str = "120000";

// Taxonomy
pub const TAXONOMY_CODE_HEADER: &str = "CODE_ERREUR";
pub const TAXONOMY_FAMILY_HEADER: &str = "FAMILLE";
pub const TAXONOMY_KEYWORDS_HEADER: &str = "MOTS_CLES";
pub const TAXONOMY_SEP: char = ';';

// Local files
pub const SETTINGS_FILE: &str = "grace.toml";
pub const LOG_FILE: &str = ".store/debug.log";

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const RAW_DATA_FILE: &str = "raw_data";
pub const COMPARISON_FILE: &str = "comparison";
pub const CHARTS_FILE: &str = "charts";
