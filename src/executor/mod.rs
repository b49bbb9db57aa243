//! Copy planning and execution

pub mod copy;

use crate::guard::ensure_within;
use crate::reaper::VCS_METADATA_NAMES;
use crate::types::{CopiedFile, ManifestEntry, SyncError};
use std::collections::BTreeSet;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

pub use copy::copy_file_atomic;

/// Target-root-relative paths a run intends to keep
pub type KeepSet = BTreeSet<PathBuf>;

/// Result of the copy phase, consumed by the reaper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyOutcome {
    /// Copies performed (or planned), in manifest order
    pub copied: Vec<CopiedFile>,

    /// Every normalized destination, dry run included
    pub keep: KeepSet,

    /// Bytes written to the target
    pub bytes_copied: u64,
}

/// Copy every manifest entry into the target root.
///
/// Entries are processed in manifest order. The first failing entry aborts
/// the run; copies already made by earlier entries stay in place.
///
/// Under `dry_run` every check still runs and every destination still lands
/// in the keep-set, but nothing is written.
///
/// # Errors
/// * `SourceNotFound` - the source does not exist
/// * `SourceIsDirectory` - the source is a directory
/// * `PathEscapesRoot` - the source resolves outside `source_root`
/// * `DestinationEscapesRoot` - the destination resolves outside `target_root`
/// * `DestinationIsDirectory` - the destination is the root or an existing directory
/// * `DestinationInVcsMetadata` - the destination lies inside `.git`
/// * `DestinationThroughSymlink` - an existing part of the destination is a symlink
/// * `DestinationBlocked` - an existing file sits where a parent directory belongs
pub fn execute(
    entries: &[ManifestEntry],
    source_root: &Path,
    target_root: &Path,
    dry_run: bool,
) -> Result<CopyOutcome, SyncError> {
    let mut outcome = CopyOutcome::default();

    for entry in entries {
        let source_path = check_source(entry, source_root)?;
        let dest_relative = check_destination(entry, target_root)?;

        info!(
            "copying {} -> {}",
            entry.source().display(),
            dest_relative.display()
        );

        if !outcome.keep.insert(dest_relative.clone()) {
            warn!(
                destination = %dest_relative.display(),
                "destination listed more than once; later entry wins"
            );
        }

        if !dry_run {
            outcome.bytes_copied += copy_file_atomic(&source_path, &target_root.join(&dest_relative))?;
        }

        outcome.copied.push(CopiedFile {
            source: entry.source().to_path_buf(),
            destination: dest_relative,
        });
    }

    Ok(outcome)
}

/// Resolve the entry's source and make sure it is a copyable file.
fn check_source(entry: &ManifestEntry, source_root: &Path) -> Result<PathBuf, SyncError> {
    ensure_within(source_root, entry.source())?;

    let source_path = source_root.join(entry.source());
    let metadata = match fs::metadata(&source_path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SyncError::SourceNotFound {
                path: entry.source().to_path_buf(),
            })
        }
        Err(e) => return Err(SyncError::Io(e)),
    };

    if metadata.is_dir() {
        return Err(SyncError::SourceIsDirectory {
            path: entry.source().to_path_buf(),
        });
    }

    if !metadata.is_file() {
        return Err(SyncError::Io(Error::other(format!(
            "Source is not a regular file: {}",
            entry.source().display()
        ))));
    }

    Ok(source_path)
}

/// Normalize the entry's destination inside the target root.
fn check_destination(entry: &ManifestEntry, target_root: &Path) -> Result<PathBuf, SyncError> {
    let dest_relative = ensure_within(target_root, entry.destination()).map_err(|e| match e {
        SyncError::PathEscapesRoot { root, path } => SyncError::DestinationEscapesRoot {
            root,
            destination: path,
        },
        other => other,
    })?;

    if dest_relative.as_os_str().is_empty() || target_root.join(&dest_relative).is_dir() {
        return Err(SyncError::DestinationIsDirectory {
            destination: entry.destination().to_path_buf(),
        });
    }

    if dest_relative
        .components()
        .any(|component| VCS_METADATA_NAMES.iter().any(|name| component.as_os_str() == *name))
    {
        return Err(SyncError::DestinationInVcsMetadata {
            destination: entry.destination().to_path_buf(),
        });
    }

    check_existing_prefix(entry, target_root)?;

    Ok(dest_relative)
}

/// Walk the part of the destination that already exists in the target.
///
/// The reaper never follows links, so a destination written through one
/// would be kept under a path the reaper cannot see. Every existing
/// component, the file itself included, must be a real entry, and every
/// component but the last must be a directory.
fn check_existing_prefix(entry: &ManifestEntry, target_root: &Path) -> Result<(), SyncError> {
    let components: Vec<Component> = entry.destination().components().collect();
    let mut current = target_root.to_path_buf();

    for (position, component) in components.iter().enumerate() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => {
                current.pop();
                continue;
            }
            Component::Normal(name) => current.push(name),
            Component::Prefix(_) | Component::RootDir => {
                current.push(component);
                continue;
            }
        }

        let metadata = match fs::symlink_metadata(&current) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(SyncError::Io(e)),
        };

        let relative = current
            .strip_prefix(target_root)
            .unwrap_or(current.as_path())
            .to_path_buf();

        if metadata.file_type().is_symlink() {
            return Err(SyncError::DestinationThroughSymlink {
                destination: entry.destination().to_path_buf(),
                link: relative,
            });
        }

        if !metadata.is_dir() && position + 1 < components.len() {
            return Err(SyncError::DestinationBlocked {
                destination: entry.destination().to_path_buf(),
                blocking: relative,
            });
        }
    }

    Ok(())
}
