//! ManifestEntry - A single source -> destination mapping

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One file the manifest publishes.
///
/// Both paths are stored exactly as written (root-relative, unresolved).
/// They are only joined onto a root when the entry is executed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the source repository root
    source: PathBuf,

    /// Path relative to the target root
    destination: PathBuf,
}

impl ManifestEntry {
    /// Create an entry whose destination differs from its source
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Create an entry published under the same relative path
    pub fn same_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            destination: path.clone(),
            source: path,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Whether the destination was given independently of the source
    pub fn is_remapped(&self) -> bool {
        self.source != self.destination
    }
}

/// A copy that a run performed (or planned, under dry run)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopiedFile {
    /// Source path as written in the manifest
    pub source: PathBuf,

    /// Normalized target-root-relative destination
    pub destination: PathBuf,
}
