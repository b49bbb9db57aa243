//! Main sync command

use crate::config::{Config, ReportFormat};
use crate::engine::sync;
use crate::manifest::load_manifest;
use crate::types::{SyncError, SyncResult};
use crate::VERSION;
use indicatif::HumanBytes;

/// Run the sync operation
pub fn run(config: &Config) -> Result<SyncResult, SyncError> {
    let target_root = config.target()?;
    let entries = load_manifest(&config.manifest_path, &config.parse_options())?;

    let result = sync(&entries, &config.source_root, target_root, config.dry_run)?;

    match config.report_format {
        ReportFormat::Text => println!("{}", format_summary(&result)),
        ReportFormat::Json => println!("{}", format_json(&result)?),
    }

    Ok(result)
}

fn format_summary(result: &SyncResult) -> String {
    let mut lines = vec![format!("pubsync v{}", VERSION)];

    if result.entries_loaded == 0 {
        lines.push("No files found in manifest.".to_string());
    } else {
        lines.push(format!(
            "Plan:\n  Copy: {}  Delete: {}  Total bytes written: {}",
            result.copy_count(),
            result.remove_count(),
            HumanBytes(result.bytes_copied)
        ));
    }

    if !result.removed.is_empty() {
        lines.push("Removed unlisted files:".to_string());
        for path in &result.removed {
            lines.push(format!("  - {}", path.display()));
        }
    }

    if result.dry_run {
        lines.push("Dry run complete: no files were changed.".to_string());
    } else {
        lines.push("Sync complete: files were updated.".to_string());
    }

    lines.join("\n")
}

fn format_json(result: &SyncResult) -> Result<String, SyncError> {
    Ok(serde_json::to_string_pretty(result)?)
}
