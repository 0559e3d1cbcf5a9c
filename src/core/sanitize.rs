// src/core/sanitize.rs

const BOM: char = '\u{feff}';

/// Drop a leading byte-order mark (spreadsheet exports often carry one).
pub fn strip_bom(s: &str) -> &str {
    s.strip_prefix(BOM).unwrap_or(s)
}

/// Trimmed cell text without BOM.
pub fn clean_cell(s: &str) -> &str {
    strip_bom(s).trim()
}

/// Spreadsheet-style column letters for the first `n` columns (A, B, …, Z, AA, …).
pub fn column_letters(n: usize) -> Vec<String> {
    (0..n)
        .map(|mut i| {
            let mut name = s!();
            loop {
                name.insert(0, (b'A' + (i % 26) as u8) as char);
                if i < 26 { break; }
                i = i / 26 - 1;
            }
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bom_and_blanks() {
        assert_eq!(clean_cell("\u{feff}  REF_PM "), "REF_PM");
        assert_eq!(strip_bom("DSP"), "DSP");
    }

    #[test]
    fn letters_follow_spreadsheet_order() {
        let letters = column_letters(28);
        assert_eq!(letters[0], "A");
        assert_eq!(letters[14], "O");
        assert_eq!(letters[26], "AA");
        assert_eq!(letters[27], "AB");
    }
}
