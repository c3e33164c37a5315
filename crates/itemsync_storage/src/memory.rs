//! In-memory key-value store.

use crate::backend::KeyValueStore;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory key-value store.
///
/// Used as the per-session store (its contents vanish with the process)
/// and as a durable-store stand-in for tests. A byte quota and a
/// write-failure switch let tests exercise save failures.
///
/// # Example
///
/// ```rust
/// use itemsync_storage::{KeyValueStore, InMemoryStore, StorageError};
///
/// let store = InMemoryStore::with_quota(4);
/// assert!(matches!(
///     store.put("items", b"too large"),
///     Err(StorageError::QuotaExceeded { .. })
/// ));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    values: RwLock<HashMap<String, Vec<u8>>>,
    quota: Option<usize>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    /// Creates a new empty store without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes once the total size of all
    /// values would exceed `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Creates a store pre-populated with one value.
    ///
    /// Useful for testing recovery from corrupt content.
    #[must_use]
    pub fn with_value(key: &str, value: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.values.write().insert(key.to_string(), value.into());
        store
    }

    /// Makes every subsequent `put` and `remove` fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Drops every value, as the end of a session would.
    pub fn clear(&self) {
        self.values.write().clear();
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("writes disabled")));
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.check_writable()?;
        let mut values = self.values.write();

        if let Some(quota) = self.quota {
            let others: usize = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let available = quota.saturating_sub(others);
            if value.len() > available {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    requested: value.len(),
                    available,
                });
            }
        }

        values.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check_writable()?;
        self.values.write().remove(key);
        Ok(())
    }
}
