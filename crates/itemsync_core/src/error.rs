//! Error types for itemsync core.

use itemsync_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// A single item was structurally invalid or could not be accepted.
///
/// Never propagated past the command that detected it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Text is empty after trimming.
    #[error("item text must not be empty")]
    EmptyText,

    /// Category is empty after trimming.
    #[error("item category must not be empty")]
    EmptyCategory,

    /// An item with the same dedup key already exists.
    #[error("an item with the same text and category already exists")]
    Duplicate,

    /// The requested filter names a category no item carries.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

/// An import payload or export encoding failed.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Bytes are not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// JSON is valid but not an array of items.
    #[error("expected a JSON array of items, found {found}")]
    NotAnArray {
        /// JSON type that was found instead.
        found: &'static str,
    },
}

/// Errors returned by item book commands.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The item was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Durable storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// An import payload was malformed.
    #[error("format error: {0}")]
    Format(#[from] FormatError),
}

impl CoreError {
    /// Returns true if the in-memory state was updated despite the error.
    ///
    /// Only storage failures qualify: the command already applied its
    /// change and only persistence lagged behind.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CoreError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            ValidationError::EmptyText.to_string(),
            "item text must not be empty"
        );

        let err = CoreError::from(ValidationError::UnknownCategory("Jokes".into()));
        assert_eq!(err.to_string(), "unknown category: Jokes");

        let err = CoreError::from(FormatError::NotAnArray { found: "object" });
        assert!(err.to_string().contains("object"));
    }

    #[test]
    fn only_storage_errors_are_recoverable() {
        let storage = CoreError::from(StorageError::Locked("data".into()));
        assert!(storage.is_recoverable());
        assert!(!CoreError::from(ValidationError::Duplicate).is_recoverable());
    }
}
