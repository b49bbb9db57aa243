//! Error types for pubsync

use std::path::PathBuf;
use thiserror::Error;

/// Error types for pubsync operations
///
/// Every variant aborts the run it occurs in. The only recoverable
/// condition, an empty manifest, is not an error at all.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Manifest file does not exist
    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// Manifest file is not valid TOML
    #[error("Failed to decode manifest {path}: {source}")]
    ManifestDecode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Top-level manifest has no `files` list
    #[error("Malformed manifest: {0}")]
    MalformedManifest(String),

    /// A `files` element is neither a path string nor a table
    #[error("Entry {index} in 'files' must be a string or table, found {found}")]
    InvalidEntryKind { index: usize, found: String },

    /// A table entry without a string `source`
    #[error("Entry {index} in 'files' must include a string 'source'")]
    MissingSource { index: usize },

    /// A table entry whose `dest` is present but not a string
    #[error("Entry {index} in 'files' has a non-string destination")]
    InvalidDestination { index: usize },

    /// Manifest paths must be root-relative
    #[error("Entries must use relative paths: {source_path} -> {destination}")]
    AbsolutePathRejected {
        source_path: PathBuf,
        destination: PathBuf,
    },

    /// Resolved path lies outside its root
    #[error("Path {path} is outside root {root}")]
    PathEscapesRoot { root: PathBuf, path: PathBuf },

    /// Manifest source does not exist under the source root
    #[error("Source not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Manifest source is a directory
    #[error("Directory copying is prohibited: {path}. List every file explicitly in the manifest.")]
    SourceIsDirectory { path: PathBuf },

    /// Destination resolves outside the target root
    #[error("Destination {destination} is outside target root {root}")]
    DestinationEscapesRoot { root: PathBuf, destination: PathBuf },

    /// Destination names the target root or an existing directory
    #[error("Destination {destination} is a directory, not a file path")]
    DestinationIsDirectory { destination: PathBuf },

    /// An existing file sits where the destination needs a directory
    #[error("Destination {destination} needs {blocking} to be a directory, but a file is in the way")]
    DestinationBlocked {
        destination: PathBuf,
        blocking: PathBuf,
    },

    /// Destination goes through a symbolic link inside the target
    #[error("Destination {destination} passes through symbolic link {link} in the target")]
    DestinationThroughSymlink { destination: PathBuf, link: PathBuf },

    /// Destination lies inside version-control metadata such as `.git`
    #[error("Destination {destination} is inside version-control metadata")]
    DestinationInVcsMetadata { destination: PathBuf },

    /// JSON report encoding error (automatically converted via #[from])
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Check if this error came from reading or parsing the manifest
    pub fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            SyncError::ManifestNotFound { .. }
                | SyncError::ManifestDecode { .. }
                | SyncError::MalformedManifest(_)
                | SyncError::InvalidEntryKind { .. }
                | SyncError::MissingSource { .. }
                | SyncError::InvalidDestination { .. }
                | SyncError::AbsolutePathRejected { .. }
        )
    }

    /// Check if this error is a root containment violation
    pub fn is_containment_error(&self) -> bool {
        matches!(
            self,
            SyncError::PathEscapesRoot { .. }
                | SyncError::DestinationEscapesRoot { .. }
                | SyncError::DestinationThroughSymlink { .. }
                | SyncError::DestinationInVcsMetadata { .. }
        )
    }

    /// Check if this error is about a manifest source on disk
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            SyncError::SourceNotFound { .. } | SyncError::SourceIsDirectory { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_automatic_conversion() {
        let io_error = IoError::new(ErrorKind::NotFound, "file not found");
        let sync_error: SyncError = io_error.into();

        assert!(matches!(sync_error, SyncError::Io(_)));
        assert!(sync_error.to_string().contains("IO error"));
    }

    #[test]
    fn test_io_error_from_function() {
        fn returns_io_error() -> Result<(), SyncError> {
            let _file = std::fs::File::open("/nonexistent/path/file.txt")?;
            Ok(())
        }

        let result = returns_io_error();
        assert!(matches!(result, Err(SyncError::Io(_))));
    }

    #[test]
    fn test_absolute_path_rejected_message() {
        let error = SyncError::AbsolutePathRejected {
            source_path: PathBuf::from("/etc/passwd"),
            destination: PathBuf::from("/etc/passwd"),
        };
        assert!(error.to_string().contains("relative paths"));
        assert!(error.to_string().contains("/etc/passwd"));
        assert!(error.is_manifest_error());
        assert!(!error.is_containment_error());
    }

    #[test]
    fn test_json_error_automatic_conversion() {
        fn returns_json_error() -> Result<serde_json::Value, SyncError> {
            Ok(serde_json::from_str("{ not json")?)
        }

        let result = returns_json_error();
        match result {
            Err(error @ SyncError::Json(_)) => {
                assert!(error.to_string().contains("JSON error"));
            }
            other => panic!("expected Json error, got {other:?}"),
        }
    }

    #[test]
    fn test_destination_boundary_errors() {
        let error = SyncError::DestinationInVcsMetadata {
            destination: PathBuf::from(".git/hooks/pre-commit"),
        };
        assert!(error.to_string().contains(".git/hooks/pre-commit"));
        assert!(error.is_containment_error());

        let error = SyncError::DestinationThroughSymlink {
            destination: PathBuf::from("alias/page.md"),
            link: PathBuf::from("alias"),
        };
        assert!(error.to_string().contains("symbolic link alias"));
        assert!(error.is_containment_error());

        let error = SyncError::DestinationBlocked {
            destination: PathBuf::from("docs/c.md"),
            blocking: PathBuf::from("docs"),
        };
        assert!(error.to_string().contains("needs docs to be a directory"));
        assert!(!error.is_containment_error());
    }

    #[test]
    fn test_path_escapes_root_message() {
        let error = SyncError::PathEscapesRoot {
            root: PathBuf::from("/repo"),
            path: PathBuf::from("../secret.txt"),
        };
        assert!(error.to_string().contains("../secret.txt"));
        assert!(error.to_string().contains("/repo"));
        assert!(error.is_containment_error());
    }

    #[test]
    fn test_source_is_directory_message() {
        let error = SyncError::SourceIsDirectory {
            path: PathBuf::from("docs"),
        };
        assert!(error.to_string().contains("Directory copying is prohibited"));
        assert!(error.to_string().contains("docs"));
        assert!(error.is_source_error());
    }

    #[test]
    fn test_entry_errors_report_index() {
        let error = SyncError::InvalidEntryKind {
            index: 3,
            found: "integer".to_string(),
        };
        assert!(error.to_string().contains("Entry 3"));
        assert!(error.to_string().contains("integer"));

        let error = SyncError::MissingSource { index: 1 };
        assert!(error.to_string().contains("'source'"));
        assert!(error.is_manifest_error());
    }

    #[test]
    fn test_helper_predicates_are_disjoint() {
        let errors = vec![
            SyncError::Config("bad".to_string()),
            SyncError::MalformedManifest("no files".to_string()),
            SyncError::DestinationEscapesRoot {
                root: PathBuf::from("/target"),
                destination: PathBuf::from("../x"),
            },
            SyncError::SourceNotFound {
                path: PathBuf::from("missing.md"),
            },
        ];

        for error in &errors {
            let hits = [
                error.is_manifest_error(),
                error.is_containment_error(),
                error.is_source_error(),
            ]
            .iter()
            .filter(|hit| **hit)
            .count();
            assert!(hits <= 1, "{error:?} matched more than one category");
        }
    }
}
