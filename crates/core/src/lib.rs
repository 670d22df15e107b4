//! Core primitives for the dependency funnel
//!
//! This crate provides:
//! - Module paths and sorted module sets
//! - Stat adapter that reports absence instead of failing
//! - Tree snapshots with change-relevant metadata
//! - Ordered patches between snapshots, and their replay
//! - Atomic symlink-or-copy file placement

pub mod error;
pub mod path;
pub mod patch;
pub mod place;
pub mod snapshot;
pub mod stat;

// Re-exports
pub use error::CoreError;
pub use path::{ModulePath, ModuleSet};
pub use patch::{Patch, PatchOp};
pub use place::{place_file, remove_if_present, LinkStrategy, Placement};
pub use snapshot::{Snapshot, SnapshotEntry};
pub use stat::{stat_or_none, FileStat};

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
