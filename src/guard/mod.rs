//! Path containment checks
//!
//! Every path pubsync reads from or writes to passes through
//! [`ensure_within`] first. Resolution follows symbolic links and `..`
//! segments for the part of the path that exists on disk, and normalizes the
//! rest lexically, so destinations that have not been created yet can still
//! be checked before anything is written.

use crate::types::SyncError;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Upper bound on symlinks followed while resolving one path.
const MAX_SYMLINK_HOPS: usize = 40;

/// Ensure `candidate` resolves to `root` or a descendant of it.
///
/// Relative candidates are interpreted against `root`; absolute candidates
/// are checked as given. The root itself must exist.
///
/// # Returns
/// * `Ok(PathBuf)` - The resolved candidate relative to the resolved root
///   (empty when the candidate is the root itself)
/// * `Err(SyncError::PathEscapesRoot)` - The candidate resolves outside `root`
/// * `Err(SyncError::Io)` - The root cannot be canonicalized
///
/// # Example
/// ```no_run
/// use pubsync::guard::ensure_within;
/// use std::path::Path;
///
/// let relative = ensure_within(Path::new("/srv/mirror"), Path::new("docs/../a.md"))?;
/// assert_eq!(relative, Path::new("a.md"));
/// # Ok::<(), pubsync::SyncError>(())
/// ```
pub fn ensure_within(root: &Path, candidate: &Path) -> Result<PathBuf, SyncError> {
    let resolved_root = fs::canonicalize(root)?;
    let joined = resolved_root.join(candidate);
    let resolved = resolve_lenient(&joined)?;

    match resolved.strip_prefix(&resolved_root) {
        Ok(relative) => {
            debug!(
                candidate = %candidate.display(),
                resolved = %relative.display(),
                "path contained"
            );
            Ok(relative.to_path_buf())
        }
        Err(_) => Err(SyncError::PathEscapesRoot {
            root: root.to_path_buf(),
            path: candidate.to_path_buf(),
        }),
    }
}

/// Resolve an absolute path without requiring it to exist.
///
/// The longest existing prefix is canonicalized (symlinks followed), the
/// remaining components are applied lexically. Broken symlinks are followed
/// through their stored target.
pub fn resolve_lenient(path: &Path) -> Result<PathBuf, SyncError> {
    let mut hops_left = MAX_SYMLINK_HOPS;
    resolve_with_budget(path, &mut hops_left)
}

fn resolve_with_budget(path: &Path, hops_left: &mut usize) -> Result<PathBuf, SyncError> {
    let mut resolved = PathBuf::new();
    // False once `resolved` is missing or not a directory: nothing below it
    // can exist, so the remaining components are applied lexically.
    let mut on_disk = true;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                resolved.push(component);
                on_disk = true;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                // `resolved` never holds unresolved links, so a lexical pop is exact.
                resolved.pop();
                on_disk = resolved.is_dir();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if on_disk {
                    resolved = resolve_existing(resolved, hops_left)?;
                }
                on_disk = resolved.is_dir();
            }
        }
    }

    Ok(resolved)
}

/// Canonicalize `path` if it exists, follow it if it is a dangling link,
/// otherwise leave it untouched.
fn resolve_existing(path: PathBuf, hops_left: &mut usize) -> Result<PathBuf, SyncError> {
    let metadata = match fs::symlink_metadata(&path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(path),
        Err(e) => return Err(SyncError::Io(e)),
    };

    if !metadata.file_type().is_symlink() {
        return Ok(path);
    }

    match fs::canonicalize(&path) {
        Ok(canonical) => Ok(canonical),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if *hops_left == 0 {
                return Err(SyncError::Io(Error::other(format!(
                    "Too many levels of symbolic links while resolving {}",
                    path.display()
                ))));
            }
            *hops_left -= 1;

            let target = fs::read_link(&path)?;
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            resolve_with_budget(&base.join(target), hops_left)
        }
        Err(e) => Err(SyncError::Io(e)),
    }
}
