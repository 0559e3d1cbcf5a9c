// src/archive.rs
//! One measurement run as the pipeline sees it: an ordered list of named
//! text files. Decompression lives outside the crate; anything that can hand
//! over `(name, text)` pairs implements [`ArchiveSource`].
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::consts::{DATA_FILE_EXT, SYNTHESIS_MARKER};
use crate::{GraceError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveFile {
    /// Path inside the archive, `/`-separated.
    pub name: String,
    pub text: String,
}

impl ArchiveFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self { name: name.into(), text: text.into() }
    }

    pub fn is_data_file(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with(DATA_FILE_EXT)
    }

    pub fn is_synthesis(&self) -> bool {
        self.name.contains(SYNTHESIS_MARKER)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Archive {
    pub name: String,
    pub files: Vec<ArchiveFile>,
}

impl Archive {
    pub fn new(name: impl Into<String>, files: Vec<ArchiveFile>) -> Self {
        Self { name: name.into(), files }
    }

    /// The designated free-text summary, if the run has one (first match wins).
    pub fn synthesis(&self) -> Option<&ArchiveFile> {
        self.files.iter().find(|f| f.is_synthesis())
    }

    pub fn data_files(&self) -> impl Iterator<Item = &ArchiveFile> {
        self.files.iter().filter(|f| f.is_data_file())
    }
}

/// Anything that yields one run's files.
pub trait ArchiveSource {
    /// Display name; also feeds the archive-name timestamp fallback.
    fn name(&self) -> &str;
    fn read(&self) -> Result<Archive>;
}

/// An archive already held in memory.
impl ArchiveSource for Archive {
    fn name(&self) -> &str { &self.name }
    fn read(&self) -> Result<Archive> { Ok(self.clone()) }
}

/// An extracted run directory. Files are read recursively in path order and
/// decoded as UTF-8, lossily.
#[derive(Clone, Debug)]
pub struct DirArchive {
    root: PathBuf,
    name: String,
}

impl DirArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.to_string_lossy().into_owned());
        Self { root, name }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn fail(&self, reason: impl ToString) -> GraceError {
        GraceError::ArchiveRead { archive: self.name.clone(), reason: reason.to_string() }
    }
}

impl ArchiveSource for DirArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<Archive> {
        if !self.root.is_dir() {
            return Err(self.fail(format!("{} is not a directory", self.root.display())));
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| self.fail(e))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(&self.root).unwrap_or(entry.path());
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let bytes = fs::read(entry.path()).map_err(|e| self.fail(e))?;
            files.push(ArchiveFile::new(name, String::from_utf8_lossy(&bytes).into_owned()));
        }
        debug!(archive = %self.name, files = files.len(), "run directory read");
        Ok(Archive::new(self.name.clone(), files))
    }
}
