//! Tree snapshots for a named set of module paths

use crate::path::{ModulePath, ModuleSet};
use crate::stat::{stat_or_none, FileStat};
use crate::Result;
use ahash::AHashSet;
use std::path::Path;

/// One path observed at snapshot time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    /// Path relative to the snapshot root
    pub path: ModulePath,
    /// Metadata observed for the path
    pub stat: FileStat,
}

impl SnapshotEntry {
    /// Create a new entry
    pub fn new(path: ModulePath, stat: FileStat) -> Self {
        Self { path, stat }
    }

    /// Whether the entry is a directory
    pub fn is_dir(&self) -> bool {
        self.stat.is_dir
    }
}

/// The observed state of one module set at one point in time
///
/// Entries are sorted by path and unique. Paths that did not exist when the
/// snapshot was captured are omitted, so "absent" and "never listed" look
/// the same to [`crate::Patch::between`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Stat every member of `modules` below `root`
    ///
    /// Members that do not exist contribute nothing. Any other stat failure
    /// aborts the capture.
    pub fn capture(root: &Path, modules: &ModuleSet) -> Result<Self> {
        let mut entries = Vec::with_capacity(modules.len());

        for module in modules {
            if let Some(stat) = stat_or_none(&module.to_fs_path(root))? {
                entries.push(SnapshotEntry::new(module.clone(), stat));
            }
        }

        // ModuleSet iterates in sorted order, so entries are already sorted
        Ok(Self { entries })
    }

    /// Build a snapshot from arbitrary entries
    ///
    /// Entries are sorted by path; for duplicate paths the last one wins.
    pub fn from_entries(entries: impl IntoIterator<Item = SnapshotEntry>) -> Self {
        let mut entries: Vec<SnapshotEntry> = entries.into_iter().collect();
        // Stable sort keeps insertion order among duplicates
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        let mut deduped: Vec<SnapshotEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            match deduped.last_mut() {
                Some(last) if last.path == entry.path => *last = entry,
                _ => deduped.push(entry),
            }
        }

        Self { entries: deduped }
    }

    /// Look up an entry by path
    pub fn get(&self, path: &str) -> Option<&SnapshotEntry> {
        self.entries
            .binary_search_by(|entry| entry.path.as_str().cmp(path))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Entries in path order
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the snapshot has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every directory the snapshot implies
    ///
    /// Includes explicit directory entries and the ancestors of every entry.
    pub fn directories(&self) -> AHashSet<&str> {
        let mut dirs = AHashSet::new();
        for entry in &self.entries {
            if entry.is_dir() {
                dirs.insert(entry.path.as_str());
            }
            dirs.extend(entry.path.ancestors());
        }
        dirs
    }
}
