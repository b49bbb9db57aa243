//! Core type definitions for pubsync

mod entry;
mod error;
mod result;

pub use entry::{CopiedFile, ManifestEntry};
pub use error::SyncError;
pub use result::SyncResult;

/// Ordered list of entries parsed from one manifest
pub type SyncPlan = Vec<ManifestEntry>;
