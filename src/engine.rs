//! Full sync run: validate, copy, reap

use crate::executor::execute;
use crate::manifest::validate_sources;
use crate::reaper::reap;
use crate::types::{ManifestEntry, SyncError, SyncResult};
use std::path::Path;
use tracing::{info, warn};

/// Mirror `entries` from `source_root` into `target_root`.
///
/// Both roots are taken as given; nothing here consults the working
/// directory. Every source is checked against the source root before the
/// first copy, the whole copy phase completes before any stale file is
/// considered, and the first error aborts the run.
///
/// An empty entry list is reported and treated as a successful no-op: the
/// target is left alone rather than emptied.
///
/// # Example
/// ```no_run
/// use pubsync::engine::sync;
/// use pubsync::ManifestEntry;
/// use std::path::Path;
///
/// let entries = vec![ManifestEntry::same_path("README.md")];
/// let result = sync(&entries, Path::new("/repo"), Path::new("/mirror"), true)?;
/// println!("would remove {} file(s)", result.remove_count());
/// # Ok::<(), pubsync::SyncError>(())
/// ```
pub fn sync(
    entries: &[ManifestEntry],
    source_root: &Path,
    target_root: &Path,
    dry_run: bool,
) -> Result<SyncResult, SyncError> {
    info!("Loaded {} entries from manifest.", entries.len());

    if entries.is_empty() {
        warn!("No files found in manifest; nothing to sync");
        return Ok(SyncResult::empty(dry_run));
    }

    validate_sources(entries, source_root)?;

    let outcome = execute(entries, source_root, target_root, dry_run)?;
    let removed = reap(target_root, &outcome.keep, dry_run)?;

    Ok(SyncResult {
        dry_run,
        entries_loaded: entries.len(),
        copied: outcome.copied,
        removed,
        bytes_copied: outcome.bytes_copied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_manifest_leaves_target_alone() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        fs::write(dst.path().join("existing.md"), "keep me").expect("write existing");

        let result = sync(&[], src.path(), dst.path(), false).expect("sync");

        assert!(result.is_noop());
        assert_eq!(result.entries_loaded, 0);
        assert!(dst.path().join("existing.md").exists());
    }

    #[test]
    fn test_escaping_source_fails_before_copy() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        fs::write(src.path().join("a.md"), "a").expect("write a");
        fs::write(dst.path().join("stale.md"), "old").expect("write stale");

        let entries = vec![
            ManifestEntry::same_path("a.md"),
            ManifestEntry::same_path("../secret.txt"),
        ];
        let result = sync(&entries, src.path(), dst.path(), false);

        assert!(matches!(result, Err(SyncError::PathEscapesRoot { .. })));
        assert!(!dst.path().join("a.md").exists());
        assert!(dst.path().join("stale.md").exists());
    }

    #[test]
    fn test_copy_failure_skips_reaping() {
        let src = TempDir::new().expect("create src tempdir");
        let dst = TempDir::new().expect("create dst tempdir");
        fs::write(dst.path().join("stale.md"), "old").expect("write stale");

        let entries = vec![ManifestEntry::same_path("missing.md")];
        let result = sync(&entries, src.path(), dst.path(), false);

        assert!(matches!(result, Err(SyncError::SourceNotFound { .. })));
        assert!(dst.path().join("stale.md").exists());
    }
}
