// src/taxonomy.rs
//! Error taxonomy: exact code → family table plus per-family keywords.
//!
//! Lookup order in [`Taxonomy::classify`]:
//! 1. exact code match (authoritative),
//! 2. first family, in table order, whose keyword occurs in the uppercased code,
//! 3. `AUTRES`.
//!
//! The table is read from a `CODE_ERREUR;FAMILLE[;MOTS_CLES]` resource. A copy
//! of the reference table is compiled in and used whenever the external
//! resource is missing or unusable.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::consts::{
    FALLBACK_FAMILY, TAXONOMY_CODE_HEADER, TAXONOMY_FAMILY_HEADER, TAXONOMY_KEYWORDS_HEADER,
    TAXONOMY_SEP,
};
use crate::core::sanitize::clean_cell;
use crate::csv::parse_rows;
use crate::{GraceError, Result};

const BUILTIN_TABLE: &str = include_str!("../data/famille.csv");

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaxonomySource {
    BuiltIn,
    File(PathBuf),
}

#[derive(Clone, Debug)]
pub struct Taxonomy {
    codes: HashMap<String, String>,
    /// Family → uppercase keywords, in first-seen order. `AUTRES` is last.
    families: IndexMap<String, Vec<String>>,
    source: TaxonomySource,
}

impl Taxonomy {
    /// Build from `(code, family)` pairs. Each family's own name is its
    /// default keyword.
    pub fn from_pairs<I, C, F>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, F)>,
        C: AsRef<str>,
        F: AsRef<str>,
    {
        let mut tax = Self::empty();
        for (code, family) in pairs {
            tax.insert(code.as_ref(), family.as_ref());
        }
        tax.seal();
        tax
    }

    /// The compiled-in reference table.
    pub fn builtin() -> Self {
        match Self::from_text(BUILTIN_TABLE) {
            Ok(tax) => tax,
            Err(e) => {
                // Only reachable if the embedded table is edited into a bad shape.
                warn!(error = %e, "built-in taxonomy unusable, classifying everything as {FALLBACK_FAMILY}");
                Self::from_pairs(std::iter::empty::<(&str, &str)>())
            }
        }
    }

    /// Parse a delimited taxonomy resource.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut rows = parse_rows(text, TAXONOMY_SEP).into_iter();
        let header = rows
            .next()
            .ok_or_else(|| GraceError::Taxonomy(s!("empty taxonomy resource")))?;
        let col = |name: &str| header.iter().position(|h| clean_cell(h).eq_ignore_ascii_case(name));
        let code_ix = col(TAXONOMY_CODE_HEADER)
            .ok_or_else(|| GraceError::Taxonomy(format!("missing column {TAXONOMY_CODE_HEADER}")))?;
        let family_ix = col(TAXONOMY_FAMILY_HEADER)
            .ok_or_else(|| GraceError::Taxonomy(format!("missing column {TAXONOMY_FAMILY_HEADER}")))?;
        let keywords_ix = col(TAXONOMY_KEYWORDS_HEADER);

        let mut tax = Self::empty();
        for row in rows {
            let cell = |ix: usize| row.get(ix).map(|c| clean_cell(c)).unwrap_or("");
            let (code, family) = (cell(code_ix), cell(family_ix));
            if code.is_empty() || family.is_empty() {
                continue;
            }
            tax.insert(code, family);
            if let Some(kx) = keywords_ix {
                tax.add_keywords(family, cell(kx));
            }
        }
        tax.seal();
        Ok(tax)
    }

    /// Read an external resource. An unreadable file or a table with no codes
    /// is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| GraceError::Taxonomy(format!("{}: {e}", path.display())))?;
        let mut tax = Self::from_text(&text)?;
        if tax.codes.is_empty() {
            return Err(GraceError::Taxonomy(format!("{}: no error codes", path.display())));
        }
        tax.source = TaxonomySource::File(path.to_path_buf());
        Ok(tax)
    }

    /// External resource when given and usable, built-in table otherwise.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let Some(path) = path else { return Self::builtin() };
        match Self::load(path) {
            Ok(tax) => {
                info!(path = %path.display(), codes = tax.code_count(), families = tax.families.len(), "taxonomy loaded");
                tax
            }
            Err(e) => {
                warn!(error = %e, "taxonomy resource unavailable, using built-in table");
                Self::builtin()
            }
        }
    }

    /// Map a raw error code to its family. Never fails; unknown codes land in `AUTRES`.
    pub fn classify(&self, raw_code: &str) -> &str {
        if let Some((_, family)) = self.codes.get_key_value(raw_code) {
            return family;
        }
        let upper = raw_code.to_uppercase();
        for (family, keywords) in &self.families {
            if let Some(kw) = keywords.iter().find(|kw| upper.contains(kw.as_str())) {
                debug!(code = raw_code, keyword = %kw, family = %family, "classified by keyword");
                return family;
            }
        }
        FALLBACK_FAMILY
    }

    /// Family names in iteration order, `AUTRES` last.
    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.keys().map(|f| f.as_str())
    }

    pub fn family_names(&self) -> Vec<String> {
        self.families.keys().cloned().collect()
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.families.contains_key(family)
    }

    pub fn keywords(&self, family: &str) -> &[String] {
        self.families.get(family).map(|k| k.as_slice()).unwrap_or(&[])
    }

    pub fn code_count(&self) -> usize {
        self.codes.len()
    }

    pub fn source(&self) -> &TaxonomySource {
        &self.source
    }

    /* ---------- building ---------- */

    fn empty() -> Self {
        Self { codes: HashMap::new(), families: IndexMap::new(), source: TaxonomySource::BuiltIn }
    }

    fn insert(&mut self, code: &str, family: &str) {
        self.codes.insert(s!(code), s!(family));
        if family != FALLBACK_FAMILY && !self.families.contains_key(family) {
            self.families.insert(s!(family), vec![family.to_uppercase()]);
        }
    }

    fn add_keywords(&mut self, family: &str, list: &str) {
        let Some(keywords) = self.families.get_mut(family) else { return };
        for kw in list.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            let kw = kw.to_uppercase();
            if !keywords.contains(&kw) {
                keywords.push(kw);
            }
        }
    }

    /// `AUTRES` always exists, comes last, and matches no keyword.
    fn seal(&mut self) {
        self.families.shift_remove(FALLBACK_FAMILY);
        self.families.insert(s!(FALLBACK_FAMILY), Vec::new());
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}
