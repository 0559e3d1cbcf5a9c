// src/lib.rs

#[macro_use]
pub mod macros;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod log;

pub mod archive;
pub mod csv;
pub mod diff;
pub mod error;
pub mod file;
pub mod metadata;
pub mod period;
pub mod progress;
pub mod record;
pub mod session;
pub mod taxonomy;
pub mod views;

pub use archive::{Archive, ArchiveFile, ArchiveSource, DirArchive};
pub use diff::{DiffReport, DiffRow, Verdict};
pub use error::{GraceError, Result};
pub use record::Record;
pub use session::{AnalysisSummary, Session};
pub use taxonomy::Taxonomy;
