//! Entry and dependency-graph resolution boundary
//!
//! The funnel never parses modules itself. It locates the entry module,
//! hands it to a [`DependencyWalker`], and enumerates the input tree to
//! derive the complement.

use crate::error::FunnelError;
use funnel_core::{stat_or_none, ModulePath, ModuleSet};
use std::collections::BTreeSet;
use std::io;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Nested root some pipelines place all modules under
pub const NESTED_MODULE_ROOT: &str = "modules";

/// Where the entry module was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLocation {
    /// Entry path relative to the input root (includes the nested root)
    pub path: ModulePath,
    /// Nested root the entry was found under, if any
    pub module_root: Option<ModulePath>,
}

/// Computes the transitive dependencies of an entry module
///
/// Implementations return paths relative to `root`, in any order. They may
/// omit the entry itself, and may return paths that do not exist.
pub trait DependencyWalker {
    /// Walk the module graph starting at `entry`, skipping `external` names
    fn walk(
        &self,
        root: &Path,
        entry: &EntryLocation,
        external: &BTreeSet<String>,
    ) -> anyhow::Result<Vec<ModulePath>>;
}

impl<F> DependencyWalker for F
where
    F: Fn(&Path, &EntryLocation, &BTreeSet<String>) -> anyhow::Result<Vec<ModulePath>>,
{
    fn walk(
        &self,
        root: &Path,
        entry: &EntryLocation,
        external: &BTreeSet<String>,
    ) -> anyhow::Result<Vec<ModulePath>> {
        self(root, entry, external)
    }
}

/// Locate `entry` under `root`, then under the nested `modules/` root
///
/// Returns `Ok(None)` when neither exists.
pub fn resolve_entry(
    root: &Path,
    entry: &ModulePath,
) -> Result<Option<EntryLocation>, FunnelError> {
    if stat_or_none(&entry.to_fs_path(root))?.is_some() {
        return Ok(Some(EntryLocation {
            path: entry.clone(),
            module_root: None,
        }));
    }

    let nested_root = ModulePath::new(NESTED_MODULE_ROOT)?;
    let nested = nested_root.join(entry);
    if stat_or_none(&nested.to_fs_path(root))?.is_some() {
        debug!("entry found under nested root: {}", nested);
        return Ok(Some(EntryLocation {
            path: nested,
            module_root: Some(nested_root),
        }));
    }

    Ok(None)
}

/// Run the walker and normalize its answer into a dependency graph
///
/// The entry is always a member, whether or not anything imports it back.
pub fn resolve_graph<W: DependencyWalker + ?Sized>(
    walker: &W,
    root: &Path,
    entry: &EntryLocation,
    external: &BTreeSet<String>,
) -> Result<ModuleSet, FunnelError> {
    let modules = walker
        .walk(root, entry, external)
        .map_err(FunnelError::Walker)?;

    let mut graph: ModuleSet = modules.into_iter().collect();
    graph.insert(entry.path.clone());
    Ok(graph)
}

/// Every file below `root`, as sorted module paths
///
/// Directories are not listed. Symlinks are followed. Files whose names are
/// not valid UTF-8 cannot be module paths; they are skipped with a warning.
pub fn list_all_files(root: &Path) -> Result<ModuleSet, FunnelError> {
    let mut files = ModuleSet::new();

    for entry in WalkDir::new(root).follow_links(true).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e.into_io_error().unwrap_or_else(|| {
                io::Error::new(io::ErrorKind::Other, "filesystem loop detected")
            });
            FunnelError::io(&path, source)
        })?;

        // Only list files
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(rel_path) = entry.path().strip_prefix(root) else {
            continue;
        };
        match ModulePath::from_relative(rel_path) {
            Ok(module) => {
                files.insert(module);
            }
            Err(e) => warn!("skipping unrepresentable file name: {}", e),
        }
    }

    Ok(files)
}

/// All files of the input tree that are not members of `graph`
pub fn complement_of(all_files: &ModuleSet, graph: &ModuleSet) -> ModuleSet {
    all_files.difference(graph)
}
