//! Error types for core operations

use std::path::{Path, PathBuf};

/// Errors raised by snapshotting, patching and file placement.
///
/// A missing file is never an error at this layer: callers see it as an
/// absent stat or a skipped placement.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An I/O operation failed for a reason other than absence.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A path could not be turned into a module path.
    #[error("invalid module path '{path}': {reason}")]
    InvalidPath {
        /// The rejected path, as given.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl CoreError {
    /// Wrap an I/O error with the path it occurred at
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
