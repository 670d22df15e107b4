//! Ordered patches between two snapshots of the same path space

use crate::path::ModulePath;
use crate::place::{place_file, remove_if_present, LinkStrategy};
use crate::snapshot::{Snapshot, SnapshotEntry};
use crate::stat::is_absent;
use crate::{CoreError, Result};
use std::cmp::Ordering;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, trace};

/// A single filesystem operation in a patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    /// Create a directory
    CreateDir(ModulePath),
    /// Create a file that did not exist
    CreateFile(ModulePath),
    /// Replace a file whose metadata changed
    UpdateFile(ModulePath),
    /// Remove a file
    RemoveFile(ModulePath),
    /// Remove a directory
    RemoveDir(ModulePath),
}

impl PatchOp {
    /// Path the operation targets
    pub fn path(&self) -> &ModulePath {
        match self {
            PatchOp::CreateDir(path)
            | PatchOp::CreateFile(path)
            | PatchOp::UpdateFile(path)
            | PatchOp::RemoveFile(path)
            | PatchOp::RemoveDir(path) => path,
        }
    }
}

/// Ordered list of operations turning one snapshot into another
///
/// Order: all removals deepest-first, then creations shallowest-first, then
/// updates. Replaying the ops in sequence never writes into a directory
/// before it exists and never removes a directory before its contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    ops: Vec<PatchOp>,
}

impl Patch {
    /// Compute the patch from `old` to `new`
    ///
    /// Files are compared by size, mtime, mode and kind. Directories (explicit
    /// entries and the ancestors of file entries) are created or removed when
    /// only one side implies them; a directory's own metadata is not compared.
    pub fn between(old: &Snapshot, new: &Snapshot) -> Self {
        let mut removals: Vec<PatchOp> = Vec::new();
        let mut creations: Vec<PatchOp> = Vec::new();
        let mut updates: Vec<PatchOp> = Vec::new();

        // 1. Files: merge-walk both sorted entry lists
        let (old_entries, new_entries) = (old.entries(), new.entries());
        let (mut i, mut j) = (0, 0);
        loop {
            match (old_entries.get(i), new_entries.get(j)) {
                (Some(o), Some(n)) => match o.path.cmp(&n.path) {
                    Ordering::Less => {
                        push_removed_file(&mut removals, o);
                        i += 1;
                    }
                    Ordering::Greater => {
                        push_created_file(&mut creations, n);
                        j += 1;
                    }
                    Ordering::Equal => {
                        if o.is_dir() != n.is_dir() {
                            push_removed_file(&mut removals, o);
                            push_created_file(&mut creations, n);
                        } else if !n.is_dir() && o.stat != n.stat {
                            updates.push(PatchOp::UpdateFile(n.path.clone()));
                        }
                        i += 1;
                        j += 1;
                    }
                },
                (Some(o), None) => {
                    push_removed_file(&mut removals, o);
                    i += 1;
                }
                (None, Some(n)) => {
                    push_created_file(&mut creations, n);
                    j += 1;
                }
                (None, None) => break,
            }
        }

        // 2. Directories implied by only one side
        let old_dirs = old.directories();
        let new_dirs = new.directories();
        for dir in new_dirs.iter().filter(|d| !old_dirs.contains(*d)) {
            creations.push(PatchOp::CreateDir(ModulePath::from_normalized(dir)));
        }
        for dir in old_dirs.iter().filter(|d| !new_dirs.contains(*d)) {
            removals.push(PatchOp::RemoveDir(ModulePath::from_normalized(dir)));
        }

        // 3. Order: a parent path always sorts before its descendants
        removals.sort_by(|a, b| b.path().cmp(a.path()));
        creations.sort_by(|a, b| a.path().cmp(b.path()));
        updates.sort_by(|a, b| a.path().cmp(b.path()));

        let mut ops = removals;
        ops.extend(creations);
        ops.extend(updates);
        Self { ops }
    }

    /// Operations in replay order
    pub fn ops(&self) -> &[PatchOp] {
        &self.ops
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// An empty patch means no observable change
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Replay the patch onto `output_root`, drawing content from `input_root`
    ///
    /// Removing something already absent is not an error. A directory that
    /// still holds files outside the patch's path space is left in place.
    pub fn apply(
        &self,
        input_root: &Path,
        output_root: &Path,
        strategy: LinkStrategy,
    ) -> Result<()> {
        for op in self {
            let dest = op.path().to_fs_path(output_root);

            match op {
                PatchOp::CreateDir(path) => {
                    trace!("mkdir {}", path);
                    fs::create_dir_all(&dest).map_err(|e| CoreError::io(&dest, e))?;
                }
                PatchOp::CreateFile(path) | PatchOp::UpdateFile(path) => {
                    trace!("place {}", path);
                    if let Some(parent) = dest.parent() {
                        if !parent.is_dir() {
                            fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
                        }
                    }
                    place_file(&path.to_fs_path(input_root), &dest, strategy)?;
                }
                PatchOp::RemoveFile(path) => {
                    trace!("unlink {}", path);
                    remove_if_present(&dest)?;
                }
                PatchOp::RemoveDir(path) => {
                    trace!("rmdir {}", path);
                    match fs::remove_dir(&dest) {
                        Ok(()) => {}
                        Err(e) if is_absent(&e) => {}
                        Err(e) if e.kind() == ErrorKind::DirectoryNotEmpty => {
                            debug!("directory still has content, keeping: {}", path);
                        }
                        Err(e) => return Err(CoreError::io(&dest, e)),
                    }
                }
            }
        }

        Ok(())
    }
}

fn push_removed_file(ops: &mut Vec<PatchOp>, entry: &SnapshotEntry) {
    if !entry.is_dir() {
        ops.push(PatchOp::RemoveFile(entry.path.clone()));
    }
}

fn push_created_file(ops: &mut Vec<PatchOp>, entry: &SnapshotEntry) {
    if !entry.is_dir() {
        ops.push(PatchOp::CreateFile(entry.path.clone()));
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a PatchOp;
    type IntoIter = std::slice::Iter<'a, PatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
