//! JSON persistence of the collection, the filter and the session slot.
//!
//! Reads fail closed: anything that does not decode into a fully valid
//! value is replaced by a default rather than partially trusted.

use crate::collection::Collection;
use crate::defaults::default_collection;
use crate::filter::CategoryFilter;
use crate::item::Item;
use itemsync_storage::{KeyValueStore, StorageError, StorageResult};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Durable key holding the item collection.
pub const ITEMS_KEY: &str = "items";
/// Durable key holding the filter preference.
pub const FILTER_KEY: &str = "filter";
/// Session key holding the last displayed item.
pub const LAST_VIEWED_KEY: &str = "last_viewed";

/// Where a loaded collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Decoded from the durable store.
    Stored,
    /// Nothing was stored; defaults were installed.
    FirstRun,
    /// Stored content was unusable; defaults replaced it.
    Recovered,
}

/// Durable persistence of the collection and filter.
pub struct LocalStore {
    store: Box<dyn KeyValueStore>,
}

impl LocalStore {
    /// Wraps a durable key-value store.
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Loads the collection, installing defaults when needed.
    pub fn load(&self) -> Collection {
        self.load_with_source().0
    }

    /// Loads the collection and reports whether defaults were installed.
    ///
    /// Absent, unreadable or non-array content, or any element failing
    /// validation, replaces the whole collection with the defaults, which
    /// are persisted immediately. A failure of that write is logged; the
    /// defaults are returned either way.
    pub fn load_with_source(&self) -> (Collection, LoadSource) {
        let source = match self.store.get(ITEMS_KEY) {
            Ok(Some(bytes)) => match decode_collection(&bytes) {
                Some(collection) => return (collection, LoadSource::Stored),
                None => {
                    warn!("stored items are malformed, restoring defaults");
                    LoadSource::Recovered
                }
            },
            Ok(None) => {
                info!("no stored items, installing defaults");
                LoadSource::FirstRun
            }
            Err(e) => {
                warn!(error = %e, "failed to read stored items, restoring defaults");
                LoadSource::Recovered
            }
        };

        let defaults = default_collection();
        if let Err(e) = self.save(&defaults) {
            warn!(error = %e, "failed to persist default items");
        }
        (defaults, source)
    }

    /// Serializes and writes the whole collection.
    ///
    /// # Errors
    ///
    /// Returns the storage error; the caller keeps its in-memory copy.
    pub fn save(&self, collection: &Collection) -> StorageResult<()> {
        let bytes = serde_json::to_vec(collection)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.put(ITEMS_KEY, &bytes)?;
        debug!(items = collection.len(), "collection saved");
        Ok(())
    }

    /// Loads the filter preference; absent or malformed reads as `All`.
    pub fn load_filter(&self) -> CategoryFilter {
        match self.store.get(FILTER_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(error = %e, "stored filter is malformed, using all");
                CategoryFilter::All
            }),
            Ok(None) => CategoryFilter::All,
            Err(e) => {
                warn!(error = %e, "failed to read stored filter, using all");
                CategoryFilter::All
            }
        }
    }

    /// Writes the filter preference.
    ///
    /// # Errors
    ///
    /// Returns the storage error.
    pub fn save_filter(&self, filter: &CategoryFilter) -> StorageResult<()> {
        let bytes =
            serde_json::to_vec(filter).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.put(FILTER_KEY, &bytes)
    }
}

/// Decodes a persisted collection, rejecting it wholesale if any element
/// is invalid. Duplicate keys are collapsed, first occurrence wins.
fn decode_collection(bytes: &[u8]) -> Option<Collection> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    let candidates = value.as_array()?;

    let mut items = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        items.push(Item::from_candidate(candidate)?);
    }

    let collection = Collection::from_items(items);
    if collection.len() < candidates.len() {
        debug!(
            collapsed = candidates.len() - collection.len(),
            "collapsed duplicate stored items"
        );
    }
    Some(collection)
}

/// Transient per-session slot for the last displayed item.
pub struct SessionStore {
    store: Box<dyn KeyValueStore>,
}

impl SessionStore {
    /// Wraps a transient key-value store.
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Records `item` as the last displayed item.
    ///
    /// # Errors
    ///
    /// Returns the storage error.
    pub fn set_last_viewed(&self, item: &Item) -> StorageResult<()> {
        let bytes =
            serde_json::to_vec(item).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.put(LAST_VIEWED_KEY, &bytes)
    }

    /// Returns the last displayed item, if a valid one is recorded.
    pub fn last_viewed(&self) -> Option<Item> {
        let bytes = self.store.get(LAST_VIEWED_KEY).ok().flatten()?;
        let value: Value = serde_json::from_slice(&bytes).ok()?;
        Item::from_candidate(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemsync_storage::InMemoryStore;
    use std::sync::Arc;

    fn stored_items(store: &InMemoryStore) -> Value {
        serde_json::from_slice(&store.get(ITEMS_KEY).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn first_run_installs_and_persists_defaults() {
        let backing = Arc::new(InMemoryStore::new());
        let local = LocalStore::new(Arc::clone(&backing));

        let (collection, source) = local.load_with_source();
        assert_eq!(source, LoadSource::FirstRun);
        assert_eq!(collection, default_collection());
        assert_eq!(stored_items(&backing).as_array().unwrap().len(), 4);
    }

    #[test]
    fn corrupt_content_is_replaced() {
        let backing = Arc::new(InMemoryStore::with_value(ITEMS_KEY, "not json"));
        let local = LocalStore::new(Arc::clone(&backing));

        let (collection, source) = local.load_with_source();
        assert_eq!(source, LoadSource::Recovered);
        assert_eq!(collection, default_collection());
        assert_eq!(
            stored_items(&backing),
            serde_json::to_value(default_collection()).unwrap()
        );
    }

    #[test]
    fn one_invalid_element_discards_everything() {
        let backing = Arc::new(InMemoryStore::with_value(
            ITEMS_KEY,
            r#"[{"text":"A","category":"X"},{"text":"","category":"Y"}]"#,
        ));
        let local = LocalStore::new(Arc::clone(&backing));
        let (collection, source) = local.load_with_source();
        assert_eq!(source, LoadSource::Recovered);
        assert!(!collection.contains(&Item::new("A", "X")));
    }

    #[test]
    fn non_array_is_corrupt() {
        let backing = Arc::new(InMemoryStore::with_value(ITEMS_KEY, r#"{"text":"A"}"#));
        let local = LocalStore::new(backing);
        assert_eq!(local.load_with_source().1, LoadSource::Recovered);
    }

    #[test]
    fn valid_content_is_trusted() {
        let backing = Arc::new(InMemoryStore::with_value(
            ITEMS_KEY,
            r#"[{"text":"A","category":"X","id":3},{"text":"a","category":"x"}]"#,
        ));
        let local = LocalStore::new(backing);

        let (collection, source) = local.load_with_source();
        assert_eq!(source, LoadSource::Stored);
        assert_eq!(collection.items(), &[Item::new("A", "X").with_id(3)]);
    }

    #[test]
    fn defaults_returned_even_if_healing_write_fails() {
        let backing = Arc::new(InMemoryStore::new());
        backing.set_fail_writes(true);
        let local = LocalStore::new(Arc::clone(&backing));

        assert_eq!(local.load(), default_collection());
        assert!(backing.is_empty());
    }

    #[test]
    fn save_surfaces_quota_errors() {
        let local = LocalStore::new(InMemoryStore::with_quota(8));
        let err = local.save(&default_collection()).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
    }

    #[test]
    fn filter_round_trip_and_fallbacks() {
        let backing = Arc::new(InMemoryStore::new());
        let local = LocalStore::new(Arc::clone(&backing));
        assert_eq!(local.load_filter(), CategoryFilter::All);

        local
            .save_filter(&CategoryFilter::Category("Life".into()))
            .unwrap();
        assert_eq!(local.load_filter(), CategoryFilter::Category("Life".into()));

        backing.put(FILTER_KEY, b"{not json").unwrap();
        assert_eq!(local.load_filter(), CategoryFilter::All);
    }

    #[test]
    fn session_slot() {
        let backing = Arc::new(InMemoryStore::new());
        let session = SessionStore::new(Arc::clone(&backing));
        assert!(session.last_viewed().is_none());

        let item = Item::new("A", "X");
        session.set_last_viewed(&item).unwrap();
        assert_eq!(session.last_viewed(), Some(item));

        backing.clear();
        assert!(session.last_viewed().is_none());
    }
}
