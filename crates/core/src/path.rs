//! Module paths and module sets

use crate::{CoreError, Result};
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A slash-separated path relative to an input root
///
/// Always normalized: no leading `/`, no `.` or empty segments, no `..`.
/// Ordering and equality are byte-wise on the normalized string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModulePath(String);

impl ModulePath {
    /// Normalize a relative path string into a module path
    ///
    /// - Converts `\` to `/`
    /// - Removes `./` and empty segments
    /// - Rejects absolute paths, `..` and empty results
    pub fn new(path: &str) -> Result<Self> {
        let unified = path.replace('\\', "/");
        if unified.starts_with('/') {
            return Err(invalid(path, "absolute paths are not allowed"));
        }

        let mut segments: SmallVec<[&str; 8]> = SmallVec::new();
        for segment in unified.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return Err(invalid(path, "parent components are not allowed")),
                segment => segments.push(segment),
            }
        }

        if segments.is_empty() {
            return Err(invalid(path, "path is empty"));
        }

        Ok(Self(segments.join("/")))
    }

    /// Build a module path from a host path relative to some root
    pub fn from_relative(path: &Path) -> Result<Self> {
        let display = path.to_string_lossy();
        let mut segments: SmallVec<[&str; 8]> = SmallVec::new();

        for component in path.components() {
            match component {
                Component::Normal(segment) => {
                    let segment = segment
                        .to_str()
                        .ok_or_else(|| invalid(&display, "path is not valid UTF-8"))?;
                    segments.push(segment);
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(invalid(&display, "parent components are not allowed"))
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid(&display, "absolute paths are not allowed"))
                }
            }
        }

        Self::new(&segments.join("/"))
    }

    /// Wrap a string already known to be normalized
    pub(crate) fn from_normalized(path: &str) -> Self {
        Self(path.to_string())
    }

    /// The normalized path string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append another module path below this one
    pub fn join(&self, child: &ModulePath) -> ModulePath {
        ModulePath(format!("{}/{}", self.0, child.0))
    }

    /// Containing directory, or `None` for a top-level path
    pub fn parent(&self) -> Option<ModulePath> {
        self.0.rfind('/').map(|idx| ModulePath(self.0[..idx].to_string()))
    }

    /// All containing directories, shallowest first
    ///
    /// `a/b/c.js` yields `a` then `a/b`.
    pub fn ancestors(&self) -> SmallVec<[&str; 8]> {
        self.0
            .bytes()
            .enumerate()
            .filter(|&(_, b)| b == b'/')
            .map(|(idx, _)| &self.0[..idx])
            .collect()
    }

    /// Resolve against a root directory using host separators
    pub fn to_fs_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(self.0.split('/'));
        path
    }
}

fn invalid(path: &str, reason: &'static str) -> CoreError {
    CoreError::InvalidPath {
        path: path.to_string(),
        reason,
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModulePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModulePath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A sorted, deduplicated set of module paths
///
/// Iteration order is always the byte order of the paths, so snapshots and
/// patches built from a set are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSet(BTreeSet<ModulePath>);

impl ModuleSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Insert a path, returning whether it was newly added
    pub fn insert(&mut self, path: ModulePath) -> bool {
        self.0.insert(path)
    }

    /// Check membership by path string
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    /// Number of paths in the set
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate paths in sorted order
    pub fn iter(&self) -> btree_set::Iter<'_, ModulePath> {
        self.0.iter()
    }

    /// Paths in `self` that are not members of `other`
    pub fn difference(&self, other: &ModuleSet) -> ModuleSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }
}

impl FromIterator<ModulePath> for ModuleSet {
    fn from_iter<I: IntoIterator<Item = ModulePath>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ModulePath> for ModuleSet {
    fn extend<I: IntoIterator<Item = ModulePath>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ModuleSet {
    type Item = &'a ModulePath;
    type IntoIter = btree_set::Iter<'a, ModulePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ModuleSet {
    type Item = ModulePath;
    type IntoIter = btree_set::IntoIter<ModulePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
