// src/csv.rs
use std::io::{self, Write};
use std::mem::take;

use tracing::trace;

use crate::config::consts::{DELIMITER_CANDIDATES, PROBE_PREVIEW_ROWS, RAW_FIELD_COUNT};

/* ---------------- Parsing ---------------- */

/// Minimal delimited-text parser (quotes + CRLF tolerant). Blank lines are skipped.
/// A quote only opens a quoted cell as the cell's first character; elsewhere it is literal.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    parse_rows_limit(text, sep, usize::MAX)
}

/// Same as [`parse_rows`] but stops after `limit` rows.
pub fn parse_rows_limit(text: &str, sep: char, limit: usize) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = s!();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut cell_start = true;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if rows.len() >= limit {
            return rows;
        }
        match ch {
            '"' if in_quotes => {
                if matches!(chars.peek(), Some('"')) {
                    chars.next(); // double-quote escape
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if cell_start => {
                in_quotes = true;
                cell_start = false;
            }
            c if c == sep && !in_quotes => {
                // move the field without cloning
                row.push(take(&mut field));
                cell_start = true;
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) { chars.next(); }
                row.push(take(&mut field));
                push_unless_blank(&mut rows, &mut row);
                cell_start = true;
            }
            _ => {
                field.push(ch);
                cell_start = false;
            }
        }
    }

    // Flush any trailing field/row even if quotes were unterminated.
    if rows.len() < limit {
        row.push(field);
        push_unless_blank(&mut rows, &mut row);
    }

    rows
}

fn push_unless_blank(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>) {
    if row.len() == 1 && row[0].is_empty() {
        row.clear();
    } else if !row.is_empty() {
        rows.push(take(row));
    }
}

/* ---------------- Delimiter sniffing ---------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SniffMode {
    /// Full parse; the first row must carry at least `RAW_FIELD_COUNT` columns.
    Data,
    /// Preview parse for metadata lookups; any non-empty result is accepted.
    Probe,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sniffed {
    pub delim: char,
    pub rows: Vec<Vec<String>>,
}

impl Sniffed {
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(|r| r.as_slice())
    }
}

/// Try each delimiter candidate in order and keep the first acceptable parse.
/// `None` means the text is not a usable table under `mode`.
pub fn sniff(text: &str, mode: SniffMode) -> Option<Sniffed> {
    for delim in DELIMITER_CANDIDATES {
        let rows = match mode {
            SniffMode::Data => parse_rows(text, delim),
            SniffMode::Probe => parse_rows_limit(text, delim, PROBE_PREVIEW_ROWS),
        };
        let Some(first) = rows.first() else { continue };
        let accepted = match mode {
            SniffMode::Data => first.len() >= RAW_FIELD_COUNT,
            SniffMode::Probe => true,
        };
        trace!(delim = ?delim, columns = first.len(), accepted, "delimiter candidate");
        if accepted {
            return Some(Sniffed { delim, rows });
        }
    }
    None
}

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV/TSV row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first { write!(w, "{}", sep)?; } else { first = false; }
        if needs_quotes(cell, sep) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Stringify a table. Blank rows (empty `Vec`) become empty lines, which is
/// how multi-section exports separate their blocks.
pub fn to_export_string(
    headers: &Option<Vec<String>>,
    rows: &[Vec<String>],
    include_headers: bool,
    sep: char,
) -> String {
    let mut buf: Vec<u8> = Vec::new();

    if include_headers {
        if let Some(h) = headers {
            let _ = write_row(&mut buf, h, sep);
        }
    }
    for r in rows {
        let _ = write_row(&mut buf, r, sep);
    }

    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}
