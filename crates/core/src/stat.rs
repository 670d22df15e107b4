//! Stat adapter: existence plus change-relevant metadata

use crate::{CoreError, Result};
use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

/// Metadata that decides whether a path changed between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Size in bytes
    pub size: u64,
    /// Modification time (`None` where the platform cannot report it)
    pub mtime: Option<SystemTime>,
    /// Permission bits
    pub mode: u32,
    /// Whether the path is a directory
    pub is_dir: bool,
}

impl FileStat {
    /// Extract the comparable fields from filesystem metadata
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            size: metadata.len(),
            mtime: metadata.modified().ok(),
            mode: mode_bits(metadata),
            is_dir: metadata.is_dir(),
        }
    }
}

#[cfg(unix)]
fn mode_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn mode_bits(metadata: &Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}

/// Stat a path, following symlinks
///
/// Returns `Ok(None)` when the path does not exist (including when a parent
/// component is not a directory). Every other failure is an error.
pub fn stat_or_none(path: &Path) -> Result<Option<FileStat>> {
    match std::fs::metadata(path) {
        Ok(metadata) => Ok(Some(FileStat::from_metadata(&metadata))),
        Err(e) if is_absent(&e) => Ok(None),
        Err(e) => Err(CoreError::io(path, e)),
    }
}

/// Whether an I/O error only means "nothing is there"
pub(crate) fn is_absent(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}
