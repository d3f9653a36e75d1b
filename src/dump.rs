//! Stat dump loading
//!
//! A dump is read once into memory so the selector and the extractor can
//! both replay the same lines.

use crate::error::{Result, StatsError};
use std::fs;
use std::path::{Path, PathBuf};

/// The lines of one gem5 `stats.txt` dump
#[derive(Debug, Clone)]
pub struct StatDump {
    path: PathBuf,
    lines: Vec<String>,
}

impl StatDump {
    /// Read a dump from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let bytes = fs::read(path_ref).map_err(|source| StatsError::FileUnreadable {
            path: path_ref.to_path_buf(),
            source,
        })?;

        // gem5 dumps are ASCII; stray bytes in comments should not sink the file
        let contents = String::from_utf8_lossy(&bytes);
        let dump = Self::from_text(path_ref, &contents);
        tracing::debug!(
            "Loaded {} lines from {}",
            dump.lines.len(),
            path_ref.display()
        );
        Ok(dump)
    }

    /// Build a dump from in-memory text
    pub fn from_text<P: AsRef<Path>>(path: P, contents: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: contents.lines().map(str::to_string).collect(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Label for table headers: the path as given on the command line
    pub fn label(&self) -> String {
        label_for(&self.path)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Display label for a dump path
///
/// Comparisons usually pit `stats.txt` files from different run directories
/// against each other, so the whole path is kept.
pub fn label_for(path: &Path) -> String {
    path.display().to_string()
}
