//! Error types for reading, decoding and validating search indexes.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors raised by the index codec, reader and source parsers.
///
/// Every variant except [`IndexError::Io`] and [`IndexError::UnsupportedSource`]
/// means the index is stale or corrupt and should be regenerated.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Underlying I/O failure.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        /// Original error.
        #[source]
        source: std::io::Error,
    },

    /// The payload is not wrapped in `Search.setIndex(...)`.
    #[error("payload is not wrapped in Search.setIndex(...)")]
    MissingWrapper,

    /// The JSON object is malformed or a required field is missing.
    #[error("malformed index payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Structural invariants do not hold.
    #[error("corrupt index: {issues} structural issue(s), first: {first}")]
    Corrupt {
        /// Number of error-level issues found.
        issues: usize,
        /// Description of the first issue.
        first: String,
    },

    /// The file has a suffix no parser handles.
    #[error("unsupported source file: {0}")]
    UnsupportedSource(PathBuf),
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the right response to this error is regenerating the index.
    pub fn requires_rebuild(&self) -> bool {
        matches!(
            self,
            Self::MissingWrapper | Self::Malformed(_) | Self::Corrupt { .. }
        )
    }
}
