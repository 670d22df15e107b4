//! Symlink-or-copy file placement
//!
//! Files are placed under a temporary sibling name and renamed over the
//! destination, so a reader of the destination sees either the previous file
//! or the new one.

use crate::stat::{is_absent, stat_or_none};
use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

/// How files are placed into the output tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStrategy {
    /// Symlink to the source, falling back to a copy where linking fails
    #[default]
    Symlink,
    /// Always copy bytes
    Copy,
}

/// What [`place_file`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Destination is a symlink to the source
    Linked,
    /// Destination is a byte copy of the source
    Copied,
    /// Source did not exist, nothing was written
    SkippedMissing,
}

/// Place `source` at `dest`, replacing whatever is there
///
/// The parent directory of `dest` must already exist. A missing source is
/// not an error: it yields [`Placement::SkippedMissing`].
pub fn place_file(source: &Path, dest: &Path, strategy: LinkStrategy) -> Result<Placement> {
    if stat_or_none(source)?.is_none() {
        trace!("source vanished, skipping: {}", source.display());
        return Ok(Placement::SkippedMissing);
    }

    let tmp = temp_sibling(dest);
    remove_if_present(&tmp)?;

    let placement = match strategy {
        LinkStrategy::Symlink => match symlink(source, &tmp) {
            Ok(()) => Placement::Linked,
            Err(e) => {
                trace!("symlink failed ({}), copying {}", e, source.display());
                copy(source, &tmp)?
            }
        },
        LinkStrategy::Copy => copy(source, &tmp)?,
    };

    // rename cannot replace a directory
    if let Ok(existing) = fs::symlink_metadata(dest) {
        if existing.is_dir() {
            fs::remove_dir_all(dest).map_err(|e| CoreError::io(dest, e))?;
        }
    }

    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(CoreError::io(dest, e));
    }

    Ok(placement)
}

/// Remove a file or symlink, treating absence as success
pub fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if is_absent(&e) => Ok(false),
        Err(e) => Err(CoreError::io(path, e)),
    }
}

fn copy(source: &Path, tmp: &Path) -> Result<Placement> {
    fs::copy(source, tmp).map_err(|e| CoreError::io(source, e))?;
    Ok(Placement::Copied)
}

fn temp_sibling(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{}.funnel-tmp", name))
}

#[cfg(unix)]
fn symlink(source: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(std::path::absolute(source)?, link)
}

#[cfg(windows)]
fn symlink(source: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(std::path::absolute(source)?, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink(_source: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}
