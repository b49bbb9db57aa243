//! Manifest source verification
//!
//! A read-only check that every source the manifest names exists in the
//! source repository. Unlike a sync run it does not stop at the first
//! problem: the point is to list everything that needs fixing.

use crate::guard::ensure_within;
use crate::types::{ManifestEntry, SyncError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of [`verify_sources`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// Number of entries checked
    pub checked: usize,

    /// Sources that do not exist, in manifest order
    pub missing: Vec<PathBuf>,

    /// Sources that resolve outside the source root, in manifest order
    pub escaping: Vec<PathBuf>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.escaping.is_empty()
    }
}

/// Check that every manifest source exists under `source_root`.
///
/// Missing and escaping sources are collected rather than returned as
/// errors. Only failures unrelated to individual entries (an unreadable
/// root, for instance) are propagated.
pub fn verify_sources(plan: &[ManifestEntry], source_root: &Path) -> Result<VerifyReport, SyncError> {
    let mut report = VerifyReport::default();

    for entry in plan {
        report.checked += 1;

        match ensure_within(source_root, entry.source()) {
            Ok(_) => {}
            Err(SyncError::PathEscapesRoot { .. }) => {
                warn!(source = %entry.source().display(), "source escapes repository root");
                report.escaping.push(entry.source().to_path_buf());
                continue;
            }
            Err(e) => return Err(e),
        }

        if source_root.join(entry.source()).exists() {
            debug!(source = %entry.source().display(), "source present");
        } else {
            warn!(source = %entry.source().display(), "missing source");
            report.missing.push(entry.source().to_path_buf());
        }
    }

    Ok(report)
}
