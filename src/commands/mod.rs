//! Command implementations

pub mod sync;
pub mod verify;
