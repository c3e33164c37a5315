//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The write would exceed the store's capacity.
    #[error("quota exceeded writing {key}: {requested} bytes, {available} available")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Size of the rejected value.
        requested: usize,
        /// Bytes left under the quota.
        available: usize,
    },

    /// Another process holds the data directory.
    #[error("data directory is locked by another process: {0}")]
    Locked(String),

    /// Key contains characters that cannot map to a file name.
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    /// A value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}
