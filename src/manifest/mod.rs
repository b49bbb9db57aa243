//! Manifest loading and validation

mod parse;
pub mod verify;

pub use parse::{parse_entries, ParseOptions, RawEntry, FILES_KEY};
pub use verify::{verify_sources, VerifyReport};

use crate::guard::ensure_within;
use crate::types::{ManifestEntry, SyncError, SyncPlan};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Read, decode and parse a manifest file.
///
/// The path is used as given; resolving it against a working directory is
/// the caller's job.
pub fn load_manifest(path: &Path, options: &ParseOptions) -> Result<SyncPlan, SyncError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SyncError::ManifestNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(SyncError::Io(e)),
    };

    let document: toml::Value =
        toml::from_str(&text).map_err(|source| SyncError::ManifestDecode {
            path: path.to_path_buf(),
            source,
        })?;

    let plan = parse_entries(&document, options)?;
    debug!(manifest = %path.display(), entries = plan.len(), "manifest parsed");
    Ok(plan)
}

/// Check every entry's source against the source repository root.
///
/// Runs before anything is copied, so a single escaping entry stops the
/// whole run with the target untouched.
pub fn validate_sources(plan: &[ManifestEntry], source_root: &Path) -> Result<(), SyncError> {
    for entry in plan {
        ensure_within(source_root, entry.source())?;
    }
    Ok(())
}
