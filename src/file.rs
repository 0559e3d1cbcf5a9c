// src/file.rs

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::config::consts::{CHARTS_FILE, COMPARISON_FILE, RAW_DATA_FILE};
use crate::config::options::ExportOptions;
use crate::csv::to_export_string;
use crate::session::Session;
use crate::views::{self, TableData};
use crate::{GraceError, Result};

/// Files written by one report export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportPaths {
    pub raw_data: PathBuf,
    pub comparison: PathBuf,
    pub charts: PathBuf,
}

/// Write the three report tables for the session's selection into
/// `export.out_dir`. Every table is built before anything touches the disk,
/// so an empty selection leaves no partial report behind.
pub fn export_report(session: &Session, export: &ExportOptions) -> Result<ReportPaths> {
    let raw = views::raw_table(session)?;
    let comparison = views::comparison_table(session)?;
    let charts = views::charts_table(session)?;

    ensure_directory(&export.out_dir)?;
    let paths = ReportPaths {
        raw_data: write_table(export, RAW_DATA_FILE, &raw)?,
        comparison: write_table(export, COMPARISON_FILE, &comparison)?,
        charts: write_table(export, CHARTS_FILE, &charts)?,
    };
    info!(dir = %export.out_dir.display(), format = export.format.ext(), "report written");
    Ok(paths)
}

/// Write one table as `<out_dir>/<stem>.<ext>`. Returns the path written to.
pub fn write_table(export: &ExportOptions, stem: &str, table: &TableData) -> Result<PathBuf> {
    let path = export.path_for(stem);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    let contents = to_export_string(
        &table.headers,
        &table.rows,
        export.include_headers,
        export.format.delim(),
    );
    fs::write(&path, contents)?;
    Ok(path)
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(GraceError::Export(format!("path exists but is not a directory: {}", dir.display())));
    }
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
