//! Stale-file removal
//!
//! After the copy phase has produced the complete keep-set, everything else
//! under the target root is stale. Removal runs in two passes over fully
//! materialized path lists: files first, then directories left empty,
//! deepest first. Version-control metadata (`.git`) is never touched.

use crate::executor::KeepSet;
use crate::types::SyncError;
use ignore::{DirEntry, WalkBuilder};
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory (or gitfile) names skipped during every walk
pub const VCS_METADATA_NAMES: &[&str] = &[".git"];

/// Remove every file under `target_root` that is not in `keep`.
///
/// Symbolic links are treated as files and never followed. Under `dry_run`
/// the stale files are only listed; nothing is deleted, not even empty
/// directories.
///
/// # Returns
/// * `Ok(Vec<PathBuf>)` - Target-relative paths removed (or that would be), sorted
/// * `Err(SyncError)` - The target tree could not be walked or modified
pub fn reap(target_root: &Path, keep: &KeepSet, dry_run: bool) -> Result<Vec<PathBuf>, SyncError> {
    let mut removed: Vec<PathBuf> = list_non_directories(target_root)?
        .into_iter()
        .filter(|relative| !keep.contains(relative))
        .collect();
    removed.sort();

    for relative in &removed {
        info!("deleting {}", relative.display());
        if !dry_run {
            remove_file_if_present(&target_root.join(relative))?;
        }
    }

    if !dry_run {
        remove_empty_directories(target_root)?;
    }

    Ok(removed)
}

/// Remove directories below `target_root` that are empty, deepest first.
///
/// The root itself is never removed. Returns the removed directories.
pub fn remove_empty_directories(target_root: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut directories = list_directories(target_root)?;
    directories.sort_by(|a, b| {
        b.components()
            .count()
            .cmp(&a.components().count())
            .then_with(|| b.cmp(a))
    });

    let mut removed = Vec::new();
    for relative in directories {
        let path = target_root.join(&relative);
        if fs::read_dir(&path)?.next().is_none() {
            debug!(directory = %relative.display(), "removing empty directory");
            fs::remove_dir(&path)?;
            removed.push(relative);
        }
    }

    Ok(removed)
}

/// Every non-directory entry below the root, relative to it.
fn list_non_directories(root: &Path) -> Result<Vec<PathBuf>, SyncError> {
    walk_relative(root, |entry| {
        entry.file_type().is_some_and(|file_type| !file_type.is_dir())
    })
}

/// Every directory strictly below the root, relative to it.
fn list_directories(root: &Path) -> Result<Vec<PathBuf>, SyncError> {
    walk_relative(root, |entry| {
        entry.file_type().is_some_and(|file_type| file_type.is_dir())
    })
}

/// Walk `root` without any ignore-file filtering, collecting the relative
/// paths of entries accepted by `select`.
fn walk_relative(
    root: &Path,
    select: impl Fn(&DirEntry) -> bool,
) -> Result<Vec<PathBuf>, SyncError> {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| !is_vcs_metadata(entry))
        .build();

    let mut paths = Vec::new();
    for result in walker {
        let entry = result.map_err(walk_error)?;
        if entry.depth() == 0 || !select(&entry) {
            continue;
        }

        let relative = entry.path().strip_prefix(root).map_err(|_| {
            SyncError::Io(Error::other(format!(
                "Walked outside target root: {}",
                entry.path().display()
            )))
        })?;
        paths.push(relative.to_path_buf());
    }

    Ok(paths)
}

fn is_vcs_metadata(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && VCS_METADATA_NAMES
            .iter()
            .any(|name| entry.file_name() == *name)
}

fn remove_file_if_present(path: &Path) -> Result<(), SyncError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SyncError::Io(e)),
    }
}

fn walk_error(error: ignore::Error) -> SyncError {
    let message = error.to_string();
    match error.into_io_error() {
        Some(io) => SyncError::Io(io),
        None => SyncError::Io(Error::other(message)),
    }
}
