//! Error types for wordtally
//!
//! Only [`TallyError::Configuration`] is fatal. Every other variant is
//! recovered where it happens and only shows up in logs and run statistics.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, TallyError>;

#[derive(Error, Debug)]
pub enum TallyError {
    /// Bad or missing input, invalid settings, or a harness misuse
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single file could not be read or decoded
    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Workers were still running when the shutdown grace period ran out
    #[error("{remaining} worker(s) did not terminate within {grace:?}")]
    PoolShutdownTimeout { remaining: usize, grace: Duration },

    /// The persisted report could not be written
    #[error("Failed to write report to {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TallyError {
    pub fn config(message: impl Into<String>) -> Self {
        TallyError::Configuration(message.into())
    }

    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TallyError::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must halt the program
    pub fn is_fatal(&self) -> bool {
        matches!(self, TallyError::Configuration(_))
    }
}
