//! Error types for funnel builds

use funnel_core::CoreError;
use std::path::{Path, PathBuf};

/// Errors that abort construction or a build
///
/// A missing entry module and a vanished source file are not errors; they
/// are handled as regular build outcomes.
#[derive(Debug, thiserror::Error)]
pub enum FunnelError {
    /// The options do not describe a usable funnel.
    #[error("invalid funnel configuration: {0}")]
    Config(String),

    /// The options file could not be parsed.
    #[error("failed to parse funnel options: {0}")]
    Parse(#[from] toml::de::Error),

    /// A filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The dependency walker failed (e.g. malformed module syntax).
    #[error("dependency walk failed: {0:#}")]
    Walker(anyhow::Error),

    /// A snapshot, patch or placement failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl FunnelError {
    /// Wrap an I/O error with the path it occurred at
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
