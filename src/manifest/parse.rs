//! Manifest entry parsing
//!
//! Turns an already-decoded TOML document into a validated [`SyncPlan`].
//! Nothing here touches the filesystem.

use crate::types::{ManifestEntry, SyncError, SyncPlan};
use std::path::{Component, Path, PathBuf};
use toml::Value;

/// Name of the top-level manifest list
pub const FILES_KEY: &str = "files";

/// Caller-supplied knobs for entry parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Leading path removed from destinations that start with it
    pub dest_strip_prefix: Option<PathBuf>,
}

/// One element of the `files` list, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEntry {
    /// `"docs/a.md"` - published under the same path
    Bare(String),

    /// `{ source = "b/c.md", dest = "docs/c.md" }`
    Mapped {
        source: String,
        destination: Option<String>,
    },
}

impl RawEntry {
    /// Classify a decoded `files` element.
    ///
    /// Tables accept `dest`, falling back to `destination`.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, SyncError> {
        match value {
            Value::String(path) => Ok(RawEntry::Bare(path.clone())),
            Value::Table(table) => {
                let source = match table.get("source") {
                    Some(Value::String(source)) => source.clone(),
                    _ => return Err(SyncError::MissingSource { index }),
                };

                let destination = match table.get("dest").or_else(|| table.get("destination")) {
                    None => None,
                    Some(Value::String(dest)) => Some(dest.clone()),
                    Some(_) => return Err(SyncError::InvalidDestination { index }),
                };

                Ok(RawEntry::Mapped {
                    source,
                    destination,
                })
            }
            other => Err(SyncError::InvalidEntryKind {
                index,
                found: other.type_str().to_string(),
            }),
        }
    }

    /// Resolve into the canonical entry type, rejecting rooted paths
    pub fn into_entry(self, options: &ParseOptions) -> Result<ManifestEntry, SyncError> {
        let (source, destination) = match self {
            RawEntry::Bare(path) => (PathBuf::from(&path), PathBuf::from(path)),
            RawEntry::Mapped {
                source,
                destination,
            } => {
                let destination = destination.unwrap_or_else(|| source.clone());
                (PathBuf::from(source), PathBuf::from(destination))
            }
        };

        if is_rooted(&source) || is_rooted(&destination) {
            return Err(SyncError::AbsolutePathRejected {
                source_path: source,
                destination,
            });
        }

        let destination = match &options.dest_strip_prefix {
            Some(prefix) => strip_leading(&destination, prefix),
            None => destination,
        };

        Ok(ManifestEntry::new(source, destination))
    }
}

/// Parse the `files` list of a decoded manifest document.
///
/// # Errors
/// * `MalformedManifest` - no list-typed `files` key at the top level
/// * `InvalidEntryKind` / `MissingSource` / `InvalidDestination` - bad element
/// * `AbsolutePathRejected` - an element names an absolute or rooted path
///
/// # Example
/// ```
/// use pubsync::manifest::{parse_entries, ParseOptions};
///
/// let document: toml::Value = toml::from_str(
///     r#"files = ["a.md", { source = "b/c.md", dest = "docs/c.md" }]"#,
/// )?;
///
/// let plan = parse_entries(&document, &ParseOptions::default())?;
/// assert_eq!(plan.len(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_entries(document: &Value, options: &ParseOptions) -> Result<SyncPlan, SyncError> {
    let files = match document.get(FILES_KEY) {
        Some(Value::Array(files)) => files,
        Some(other) => {
            return Err(SyncError::MalformedManifest(format!(
                "'{}' must be a list, found {}",
                FILES_KEY,
                other.type_str()
            )))
        }
        None => {
            return Err(SyncError::MalformedManifest(format!(
                "manifest must define a '{}' list",
                FILES_KEY
            )))
        }
    };

    files
        .iter()
        .enumerate()
        .map(|(index, value)| RawEntry::from_value(index, value)?.into_entry(options))
        .collect()
}

/// Absolute, or anchored to a root/drive that a join would honor.
fn is_rooted(path: &Path) -> bool {
    path.is_absolute()
        || path.has_root()
        || matches!(path.components().next(), Some(Component::Prefix(_)))
}

fn strip_leading(path: &Path, prefix: &Path) -> PathBuf {
    match path.strip_prefix(prefix) {
        Ok(rest) => rest.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(text: &str) -> Value {
        toml::from_str(text).expect("test manifest should be valid TOML")
    }

    fn parse(text: &str) -> Result<SyncPlan, SyncError> {
        parse_entries(&document(text), &ParseOptions::default())
    }

    #[test]
    fn test_bare_and_mapped_entries() {
        let plan = parse(r#"files = ["a.md", { source = "b/c.md", dest = "docs/c.md" }]"#)
            .expect("manifest should parse");

        assert_eq!(
            plan,
            vec![
                ManifestEntry::same_path("a.md"),
                ManifestEntry::new("b/c.md", "docs/c.md"),
            ]
        );
    }

    #[test]
    fn test_mapped_entry_without_dest_defaults_to_source() {
        let plan = parse(r#"files = [{ source = "guide/intro.md" }]"#).expect("parse");
        assert_eq!(plan, vec![ManifestEntry::same_path("guide/intro.md")]);
    }

    #[test]
    fn test_destination_alias() {
        let plan = parse(r#"files = [{ source = "x.md", destination = "y/x.md" }]"#).expect("parse");
        assert_eq!(plan, vec![ManifestEntry::new("x.md", "y/x.md")]);
    }

    #[test]
    fn test_array_of_tables_form() {
        let plan = parse(
            r#"
            [[files]]
            source = "one.md"

            [[files]]
            source = "two.md"
            dest = "2.md"
            "#,
        )
        .expect("parse");

        assert_eq!(
            plan,
            vec![
                ManifestEntry::same_path("one.md"),
                ManifestEntry::new("two.md", "2.md"),
            ]
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let plan = parse(r#"files = ["z.md", "a.md", "m.md"]"#).expect("parse");
        let sources: Vec<_> = plan.iter().map(|e| e.source().to_path_buf()).collect();
        assert_eq!(
            sources,
            vec![
                PathBuf::from("z.md"),
                PathBuf::from("a.md"),
                PathBuf::from("m.md")
            ]
        );
    }

    #[test]
    fn test_empty_files_list_is_ok() {
        let plan = parse("files = []").expect("empty list parses");
        assert!(plan.is_empty());
    }

    #[test]
    fn test_missing_files_key() {
        let result = parse(r#"title = "mirror""#);
        assert!(matches!(result, Err(SyncError::MalformedManifest(_))));
    }

    #[test]
    fn test_files_not_a_list() {
        let result = parse(r#"files = "a.md""#);
        match result {
            Err(SyncError::MalformedManifest(msg)) => assert!(msg.contains("string")),
            other => panic!("expected MalformedManifest, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_entry_kind() {
        let result = parse(r#"files = ["a.md", 42]"#);
        match result {
            Err(SyncError::InvalidEntryKind { index, found }) => {
                assert_eq!(index, 1);
                assert_eq!(found, "integer");
            }
            other => panic!("expected InvalidEntryKind, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_source() {
        let result = parse(r#"files = [{ dest = "docs/c.md" }]"#);
        assert!(matches!(result, Err(SyncError::MissingSource { index: 0 })));
    }

    #[test]
    fn test_non_string_source() {
        let result = parse(r#"files = [{ source = ["a.md"] }]"#);
        assert!(matches!(result, Err(SyncError::MissingSource { index: 0 })));
    }

    #[test]
    fn test_non_string_dest() {
        let result = parse(r#"files = [{ source = "a.md", dest = 7 }]"#);
        assert!(matches!(
            result,
            Err(SyncError::InvalidDestination { index: 0 })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_absolute_source_rejected() {
        let result = parse(r#"files = ["/etc/passwd"]"#);
        assert!(matches!(
            result,
            Err(SyncError::AbsolutePathRejected { .. })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_absolute_destination_rejected() {
        let result = parse(r#"files = [{ source = "a.md", dest = "/tmp/a.md" }]"#);
        match result {
            Err(SyncError::AbsolutePathRejected {
                source_path,
                destination,
            }) => {
                assert_eq!(source_path, PathBuf::from("a.md"));
                assert_eq!(destination, PathBuf::from("/tmp/a.md"));
            }
            other => panic!("expected AbsolutePathRejected, got {other:?}"),
        }
    }

    #[test]
    fn test_parent_segments_pass_parsing() {
        // Containment is checked against the roots, not here.
        let plan = parse(r#"files = [{ source = "../secret.txt" }]"#).expect("parse");
        assert_eq!(plan, vec![ManifestEntry::same_path("../secret.txt")]);
    }

    #[test]
    fn test_first_bad_entry_fails_whole_manifest() {
        let result = parse(r#"files = ["ok.md", true, { dest = "x" }]"#);
        assert!(matches!(
            result,
            Err(SyncError::InvalidEntryKind { index: 1, .. })
        ));
    }

    #[test]
    fn test_dest_prefix_stripping() {
        let options = ParseOptions {
            dest_strip_prefix: Some(PathBuf::from("docs/public")),
        };
        let plan = parse_entries(
            &document(
                r#"files = [
                    "docs/public/index.md",
                    { source = "notes.md", dest = "other/notes.md" },
                ]"#,
            ),
            &options,
        )
        .expect("parse");

        assert_eq!(
            plan,
            vec![
                ManifestEntry::new("docs/public/index.md", "index.md"),
                ManifestEntry::new("notes.md", "other/notes.md"),
            ]
        );
    }

    #[test]
    fn test_raw_entry_classification() {
        assert_eq!(
            RawEntry::from_value(0, &Value::String("a.md".into())).expect("bare"),
            RawEntry::Bare("a.md".into())
        );

        let table = document(r#"source = "b.md""#);
        assert_eq!(
            RawEntry::from_value(0, &table).expect("mapped"),
            RawEntry::Mapped {
                source: "b.md".into(),
                destination: None
            }
        );
    }
}
