//! Manifest verification command

use crate::config::{Config, ReportFormat};
use crate::manifest::{load_manifest, verify_sources, VerifyReport};
use crate::types::{ManifestEntry, SyncError};

/// Check every manifest source and print a report.
///
/// Returns the report; callers decide the exit status from
/// [`VerifyReport::is_ok`].
pub fn run(config: &Config) -> Result<VerifyReport, SyncError> {
    let entries = load_manifest(&config.manifest_path, &config.parse_options())?;
    let report = verify_sources(&entries, &config.source_root)?;

    match config.report_format {
        ReportFormat::Text => println!("{}", format_report(&entries, &report, config.verbose)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(report)
}

fn format_report(entries: &[ManifestEntry], report: &VerifyReport, verbose: bool) -> String {
    if entries.is_empty() {
        return "No files found in manifest".to_string();
    }

    let mut lines = vec![format!(
        "Verifying {} file(s) in sync manifest...",
        entries.len()
    )];

    if verbose {
        for entry in entries {
            let source = entry.source().to_path_buf();
            if !report.missing.contains(&source) && !report.escaping.contains(&source) {
                lines.push(format!("  ok  {}", source.display()));
            }
        }
    }

    for path in &report.escaping {
        lines.push(format!("  Outside repository: {}", path.display()));
    }

    if report.missing.is_empty() && report.escaping.is_empty() {
        lines.push(format!(
            "All {} file(s) in manifest exist in repository",
            report.checked
        ));
    } else if !report.missing.is_empty() {
        lines.push(format!(
            "{} file(s) missing from repository:",
            report.missing.len()
        ));
        for path in &report.missing {
            lines.push(format!("   - {}", path.display()));
        }
    }

    lines.join("\n")
}
