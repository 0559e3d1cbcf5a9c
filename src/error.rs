// src/error.rs
use std::io;

use thiserror::Error;

/// Failures that stop an operation. Unparsable files and missing metadata are
/// not errors: they degrade to skipped files and `UNKNOWN` sentinels.
#[derive(Debug, Error)]
pub enum GraceError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("archive '{archive}' could not be read: {reason}")]
    ArchiveRead { archive: String, reason: String },
    #[error("taxonomy error: {0}")]
    Taxonomy(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    EmptySelection(&'static str),
    #[error("unknown element '{0}'")]
    UnknownElement(String),
    #[error("export failed: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, GraceError>;
