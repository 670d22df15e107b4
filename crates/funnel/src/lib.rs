//! Incremental dependency funnel
//!
//! Splits an input tree of modules into the transitive dependency graph of an
//! entry module and everything else, and materializes one side into an output
//! tree. Repeated builds reuse the previous graph whenever stat snapshots show
//! it is still valid.
//!
//! This crate provides:
//! - Validated configuration (include/exclude mode, entry, externals)
//! - Entry resolution and the dependency walker boundary
//! - Parallel symlink-or-copy materialization
//! - The build controller and its statistics
//!
//! ```no_run
//! use dependency_funnel::{EntryLocation, Funnel, FunnelOptions, ModulePath};
//! use std::collections::BTreeSet;
//! use std::path::Path;
//!
//! fn walk(
//!     _root: &Path,
//!     _entry: &EntryLocation,
//!     _external: &BTreeSet<String>,
//! ) -> anyhow::Result<Vec<ModulePath>> {
//!     Ok(vec![ModulePath::new("utils/foo.js")?])
//! }
//!
//! let mut funnel = Funnel::from_options("in", "out", FunnelOptions::include("routes.js"), walk)?;
//! let outcome = funnel.build()?;
//! println!("{:?}", outcome);
//! # Ok::<(), dependency_funnel::FunnelError>(())
//! ```

pub mod config;
pub mod error;
pub mod funnel;
pub mod materialize;
pub mod resolver;
pub mod stats;

// Re-exports
pub use config::{FunnelConfig, FunnelOptions, Mode};
pub use error::FunnelError;
pub use funnel::Funnel;
pub use funnel_core::{LinkStrategy, ModulePath, ModuleSet};
pub use materialize::{MaterializeReport, Materializer};
pub use resolver::{
    complement_of, list_all_files, resolve_entry, resolve_graph, DependencyWalker, EntryLocation,
    NESTED_MODULE_ROOT,
};
pub use stats::{BuildOutcome, BuildStats};
