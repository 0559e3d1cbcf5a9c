// src/config/options.rs
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::consts::*;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// External taxonomy resource; `None` means the built-in table.
    pub taxonomy_path: Option<PathBuf>,
    pub export: ExportOptions,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self { ExportFormat::Csv => "csv", ExportFormat::Tsv => "tsv" }
    }
    pub fn delim(&self) -> char {
        match self { ExportFormat::Csv => ',', ExportFormat::Tsv => '\t' }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub out_dir: PathBuf,
    pub include_headers: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            include_headers: true,
        }
    }
}

impl ExportOptions {
    /// `<out_dir>/<stem>.<ext>` for one report table.
    pub fn path_for(&self, stem: &str) -> PathBuf {
        self.out_dir.join(join!(stem, ".", self.format.ext()))
    }

    pub fn set_out_dir(&mut self, dir: &Path) {
        self.out_dir = dir.to_path_buf();
    }
}

/// Which elements and families a diff or report covers.
/// Both lists keep the caller's order, first occurrence wins; the diff emits
/// elements in this order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub elements: Vec<String>,
    pub families: Vec<String>,
}

impl Selection {
    pub fn new(elements: Vec<String>, families: Vec<String>) -> Self {
        Self { elements: dedup(elements), families: dedup(families) }
    }

    #[inline] pub fn has_element(&self, element: &str) -> bool { self.elements.iter().any(|e| e == element) }
    #[inline] pub fn has_family(&self, family: &str) -> bool { self.families.iter().any(|f| f == family) }

    /// Reject selections that would produce an empty comparison or report.
    pub fn validate(&self) -> crate::Result<()> {
        if self.elements.is_empty() {
            return Err(crate::GraceError::EmptySelection("select at least one element (PM)"));
        }
        if self.families.is_empty() {
            return Err(crate::GraceError::EmptySelection("select at least one error family"));
        }
        Ok(())
    }
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
