//! # Storage Error Types

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failures raised by a storage adapter.
///
/// The engine never shows these to shoppers; it wraps them into its own
/// `Failed to save cart` / `Failed to load cart` errors and keeps the text
/// here as the cause.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Key cannot be used by this adapter.
    ///
    /// ## When This Occurs
    /// - Empty key
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Reading or writing the backing file failed.
    #[error("Storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No platform data directory could be determined.
    #[error("No data directory available on this platform")]
    NoDataDir,

    /// The backing store refused the operation (quota, read-only, ...).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}
