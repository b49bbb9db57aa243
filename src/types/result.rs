//! SyncResult - What a single run did (or would do)

use super::CopiedFile;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of one sync run.
///
/// Built once at the end of a run and never mutated afterwards. Failures do
/// not appear here: any error aborts the run and is returned instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    /// Whether the run was a preview
    pub dry_run: bool,

    /// Number of entries loaded from the manifest
    pub entries_loaded: usize,

    /// Copies performed (or planned), in manifest order
    pub copied: Vec<CopiedFile>,

    /// Target-relative paths removed (or that would be removed), sorted
    pub removed: Vec<PathBuf>,

    /// Total bytes written to the target (always 0 under dry run)
    pub bytes_copied: u64,
}

impl SyncResult {
    /// Result of a run against an empty manifest
    pub fn empty(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn copy_count(&self) -> usize {
        self.copied.len()
    }

    pub fn remove_count(&self) -> usize {
        self.removed.len()
    }

    /// Whether the run changed (or would change) nothing at all
    pub fn is_noop(&self) -> bool {
        self.copied.is_empty() && self.removed.is_empty()
    }
}
