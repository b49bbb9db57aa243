//! # pubsync - Manifest-driven file mirroring
//!
//! Dry run by default, exact by construction.
//!
//! pubsync publishes an explicit list of files from one repository into a
//! target tree. Every file to publish is named in a TOML manifest; anything
//! else found in the target is removed. Paths never escape either root and
//! directories are never copied implicitly.

// Module declarations
pub mod commands;
pub mod config;
pub mod engine;
pub mod executor;
pub mod guard;
pub mod manifest;
pub mod reaper;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use engine::sync;
pub use types::{CopiedFile, ManifestEntry, SyncError, SyncPlan, SyncResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
