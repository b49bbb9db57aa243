//! Configuration management

use crate::manifest::ParseOptions;
use crate::types::SyncError;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default manifest file name, resolved against the repository root
pub const DEFAULT_MANIFEST: &str = "sync-public.toml";

/// How run results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable summary
    #[default]
    Text,

    /// Machine-readable JSON document on stdout
    Json,
}

/// Command-line interface
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pubsync",
    about = "Mirror the files a manifest lists into a target tree, removing everything else",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Copy manifest files into the target and delete unlisted ones
    Sync(SyncArgs),

    /// Check that every manifest source exists in the repository
    Verify(VerifyArgs),
}

/// Arguments shared by every subcommand
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Path to the manifest (relative paths resolve against the repository root)
    #[arg(long, value_name = "path", default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Path to the source repository (default: current working directory)
    #[arg(long, value_name = "path")]
    pub repo_root: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Path to the local clone of the target repository
    #[arg(value_name = "target")]
    pub target: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Apply changes to the target (default: dry run)
    #[arg(long)]
    pub apply: bool,

    /// Leading path removed from destinations that start with it
    #[arg(long, value_name = "prefix")]
    pub strip_dest_prefix: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Show details for every file checked
    #[arg(short, long)]
    pub verbose: bool,
}

/// Global configuration for pubsync
///
/// All paths are absolute once built through `TryFrom`; the library layer
/// only ever sees these resolved roots.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source repository root
    pub source_root: PathBuf,

    /// Target root (required by `sync`, unused by `verify`)
    pub target_root: Option<PathBuf>,

    /// Manifest file
    pub manifest_path: PathBuf,

    /// Dry run (show plan, don't execute)
    pub dry_run: bool,

    /// Leading path removed from destinations
    pub dest_strip_prefix: Option<PathBuf>,

    /// Output format for the final report
    pub report_format: ReportFormat,

    /// List every checked entry, not just problems
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            target_root: None,
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            dry_run: true,
            dest_strip_prefix: None,
            report_format: ReportFormat::Text,
            verbose: false,
        }
    }
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), SyncError> {
        if !self.source_root.is_dir() {
            return Err(SyncError::Config(format!(
                "Repository root not found: {}",
                self.source_root.display()
            )));
        }

        if !self.manifest_path.is_file() {
            return Err(SyncError::ManifestNotFound {
                path: self.manifest_path.clone(),
            });
        }

        if let Some(target_root) = &self.target_root {
            if !target_root.is_dir() {
                return Err(SyncError::Config(format!(
                    "Target repo not found: {}",
                    target_root.display()
                )));
            }

            // Reaping a target that contains the source would delete the source.
            if self.source_root.starts_with(target_root) {
                return Err(SyncError::Config(format!(
                    "Repository root {} must not be inside target {}",
                    self.source_root.display(),
                    target_root.display()
                )));
            }
        }

        Ok(())
    }

    /// Target root, or a configuration error when none was given
    pub fn target(&self) -> Result<&Path, SyncError> {
        self.target_root
            .as_deref()
            .ok_or_else(|| SyncError::Config("No target root configured".to_string()))
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            dest_strip_prefix: self.dest_strip_prefix.clone(),
        }
    }

    fn from_common(common: CommonArgs) -> Result<Self, SyncError> {
        let repo_root = match common.repo_root {
            Some(path) => path,
            None => env::current_dir()?,
        };
        let source_root = canonical_dir(&repo_root, "Repository root")?;

        let manifest_path = if common.manifest.is_absolute() {
            common.manifest
        } else {
            source_root.join(common.manifest)
        };

        Ok(Self {
            source_root,
            manifest_path,
            report_format: common.format,
            ..Self::default()
        })
    }
}

impl TryFrom<SyncArgs> for Config {
    type Error = SyncError;

    fn try_from(args: SyncArgs) -> Result<Self, Self::Error> {
        let mut config = Config::from_common(args.common)?;
        config.target_root = Some(canonical_dir(&args.target, "Target repo")?);
        config.dry_run = !args.apply;
        config.dest_strip_prefix = args.strip_dest_prefix;
        config.validate()?;
        Ok(config)
    }
}

impl TryFrom<VerifyArgs> for Config {
    type Error = SyncError;

    fn try_from(args: VerifyArgs) -> Result<Self, Self::Error> {
        let mut config = Config::from_common(args.common)?;
        config.verbose = args.verbose;
        config.validate()?;
        Ok(config)
    }
}

fn canonical_dir(path: &Path, label: &str) -> Result<PathBuf, SyncError> {
    fs::canonicalize(path)
        .map_err(|_| SyncError::Config(format!("{} not found: {}", label, path.display())))
}
