// src/config/settings.rs
//
// Optional `grace.toml`. Every key is optional; CLI flags override it.
//
//   taxonomy = "FAMILLE.csv"
//   out_dir = "out/reports"
//   format = "tsv"
//   include_headers = true
//   families = ["CABLE", "PBO"]
use std::{fs, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::options::{AnalysisOptions, ExportFormat};
use crate::{GraceError, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub taxonomy: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub format: Option<ExportFormat>,
    pub include_headers: Option<bool>,
    /// Default family selection when none is given on the command line.
    pub families: Vec<String>,
}

impl Settings {
    /// Missing file → defaults. Unreadable or malformed file → error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::parse(&text).map_err(|e| GraceError::Config(format!("{}: {e}", path.display())))
    }

    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).map_err(|e| GraceError::Config(e.to_string()))?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Fold the file values into options built from defaults.
    pub fn apply(&self, opts: &mut AnalysisOptions) {
        if let Some(p) = &self.taxonomy { opts.taxonomy_path = Some(p.clone()); }
        if let Some(d) = &self.out_dir { opts.export.set_out_dir(d); }
        if let Some(f) = self.format { opts.export.format = f; }
        if let Some(h) = self.include_headers { opts.export.include_headers = h; }
    }
}
