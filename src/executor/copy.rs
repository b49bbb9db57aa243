//! Atomic file copy implementation

use crate::types::SyncError;
use filetime::FileTime;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{Error, Read, Write};
use std::path::{Path, PathBuf};

/// Suffix of the scratch file written next to each destination.
pub const PART_SUFFIX: &str = ".pubsync-part";

/// Copy a file atomically using the write-then-rename strategy
///
/// 1. Create missing parent directories
/// 2. Stream bytes into a `<name>.pubsync-part` sibling and sync it to disk
/// 3. Copy permissions, access and modification times onto the scratch file
/// 4. Rename it over the destination
///
/// An existing destination file is replaced; readers never observe a
/// half-written file.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(SyncError)` - IO error or other failure
///
/// # Example
/// ```no_run
/// use pubsync::executor::copy_file_atomic;
/// use std::path::Path;
///
/// let bytes = copy_file_atomic(Path::new("repo/a.md"), Path::new("mirror/a.md"))?;
/// # Ok::<(), pubsync::SyncError>(())
/// ```
pub fn copy_file_atomic(src: &Path, dest: &Path) -> Result<u64, SyncError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let part_path = part_path_for(dest)?;
    let mut src_file = File::open(src)?;

    let result = write_part(&mut src_file, src, &part_path).and_then(|total_bytes| {
        fs::rename(&part_path, dest)?;
        Ok(total_bytes)
    });

    if result.is_err() {
        let _ = fs::remove_file(&part_path);
    }

    result
}

/// Stream `src_file` into `part_path`, then copy mode and times from `src`.
fn write_part(src_file: &mut File, src: &Path, part_path: &Path) -> Result<u64, SyncError> {
    let mut part_file = File::create(part_path)?;

    let mut buffer = vec![0u8; 128 * 1024];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src_file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }

        part_file.write_all(&buffer[0..bytes_read])?;
        total_bytes += bytes_read as u64;
    }

    part_file.sync_all()?;

    // Drop the file handle before rename (required on Windows)
    drop(part_file);

    let src_metadata = fs::metadata(src)?;
    fs::set_permissions(part_path, src_metadata.permissions())?;

    let atime = FileTime::from_last_access_time(&src_metadata);
    let mtime = FileTime::from_last_modification_time(&src_metadata);
    filetime::set_file_times(part_path, atime, mtime)?;

    Ok(total_bytes)
}

/// `docs/a.md` -> `docs/a.md.pubsync-part`
fn part_path_for(dest: &Path) -> Result<PathBuf, SyncError> {
    let file_name = dest.file_name().ok_or_else(|| {
        SyncError::Io(Error::other(format!(
            "Destination has no file name: {}",
            dest.display()
        )))
    })?;

    let mut part_name = OsString::from(file_name);
    part_name.push(PART_SUFFIX);
    Ok(dest.with_file_name(part_name))
}
