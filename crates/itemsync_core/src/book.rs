//! The item book: sole owner of the in-memory collection.
//!
//! Every mutation goes through a command method here, which applies the
//! change in memory first and then persists it. When persistence fails the
//! in-memory state stays authoritative and the storage error is returned.

use crate::codec::{apply_import, export_json, parse_import, ImportMode, ImportReport};
use crate::collection::Collection;
use crate::error::{CoreResult, ValidationError};
use crate::filter::CategoryFilter;
use crate::item::Item;
use crate::local_store::{LoadSource, LocalStore, SessionStore};
use crate::merge::{local_only, reconcile};
use itemsync_storage::{KeyValueStore, StorageResult};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

/// Collection, filter and the stores that back them.
pub struct ItemBook {
    collection: Collection,
    filter: CategoryFilter,
    local: LocalStore,
    session: SessionStore,
    load_source: LoadSource,
    dirty: bool,
}

impl ItemBook {
    /// Opens the book over a durable and a per-session store.
    ///
    /// Loads the collection (installing defaults if needed) and restores
    /// the filter only if its category still exists.
    pub fn open(
        durable: impl KeyValueStore + 'static,
        session: impl KeyValueStore + 'static,
    ) -> Self {
        let local = LocalStore::new(durable);
        let (collection, load_source) = local.load_with_source();
        let filter = local.load_filter();

        let mut book = Self {
            collection,
            filter,
            local,
            session: SessionStore::new(session),
            load_source,
            dirty: false,
        };
        book.refresh_filter();
        book
    }

    /// How the collection was obtained at open.
    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    /// True while the collection holds changes the last save failed to write.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The current collection.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// The current filter.
    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        self.collection.categories()
    }

    /// Items passing the current filter.
    pub fn visible_items(&self) -> Vec<&Item> {
        self.collection.filtered(&self.filter).collect()
    }

    /// Validates and appends a user-entered item, then persists.
    ///
    /// # Errors
    ///
    /// - `Validation` if a field is blank or the item already exists;
    ///   nothing changes.
    /// - `Storage` if the save fails; the item stays in memory.
    pub fn add_item(&mut self, text: &str, category: &str) -> CoreResult<Item> {
        let item = Item::validated(text, category)?;
        if !self.collection.insert(item.clone()) {
            return Err(ValidationError::Duplicate.into());
        }
        info!(item = %item, "item added");
        self.persist()?;
        Ok(item)
    }

    /// Changes and persists the filter.
    ///
    /// # Errors
    ///
    /// - `Validation` if no item carries the category.
    /// - `Storage` if the save fails; the filter is still applied.
    pub fn select_category(&mut self, filter: CategoryFilter) -> CoreResult<()> {
        if let Some(name) = filter.category() {
            if !self.collection.has_category(name) {
                return Err(ValidationError::UnknownCategory(name.to_string()).into());
            }
        }
        self.filter = filter;
        self.local.save_filter(&self.filter)?;
        Ok(())
    }

    /// Picks a random visible item and records it as last viewed.
    pub fn show_random(&self) -> Option<Item> {
        self.show_random_with(&mut rand::thread_rng())
    }

    /// Like [`ItemBook::show_random`] with a caller-supplied RNG.
    pub fn show_random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Item> {
        let visible = self.visible_items();
        let item = (*visible.choose(rng)?).clone();
        if let Err(e) = self.session.set_last_viewed(&item) {
            warn!(error = %e, "failed to record last viewed item");
        }
        Some(item)
    }

    /// The item most recently shown in this session.
    pub fn last_viewed(&self) -> Option<Item> {
        self.session.last_viewed()
    }

    /// Imports an external payload.
    ///
    /// # Errors
    ///
    /// - `Format` if the payload is not a JSON array; nothing changes.
    /// - `Storage` if the save fails; the import is still applied in memory.
    pub fn import(&mut self, bytes: &[u8], mode: ImportMode) -> CoreResult<ImportReport> {
        let batch = parse_import(bytes)?;
        let report = apply_import(&mut self.collection, batch, mode);
        info!(
            mode = %report.mode,
            accepted = report.accepted,
            added = report.added,
            dropped = report.dropped,
            "import applied"
        );
        self.refresh_filter();
        self.persist()?;
        Ok(report)
    }

    /// Exports the whole collection as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Format` if encoding fails.
    pub fn export(&self) -> CoreResult<Vec<u8>> {
        Ok(export_json(&self.collection)?)
    }

    /// Adopts remote items whose key is new and returns them.
    ///
    /// Does not persist; call [`ItemBook::persist`] when the result is
    /// non-empty.
    pub fn adopt_remote(&mut self, remote: &[Item]) -> Vec<Item> {
        let reconciliation = reconcile(&self.collection, remote);
        if reconciliation.changed() {
            self.collection = reconciliation.merged;
            self.refresh_filter();
        }
        reconciliation.added
    }

    /// Local items missing from `remote`, capped to `limit`.
    pub fn push_candidates(&self, remote: &[Item], limit: usize) -> Vec<Item> {
        let mut candidates = local_only(&self.collection, remote);
        candidates.truncate(limit);
        candidates
    }

    /// Writes the current collection to the durable store.
    ///
    /// A failure marks the book dirty until a later call succeeds.
    ///
    /// # Errors
    ///
    /// Returns the storage error; memory remains authoritative.
    pub fn persist(&mut self) -> StorageResult<()> {
        let result = self.local.save(&self.collection);
        self.dirty = result.is_err();
        result
    }

    /// Resets the filter to `All` if its category no longer exists.
    fn refresh_filter(&mut self) {
        let stale = matches!(
            self.filter.category(),
            Some(name) if !self.collection.has_category(name)
        );
        if !stale {
            return;
        }

        info!(filter = %self.filter, "filter category is gone, showing all");
        self.filter = CategoryFilter::All;
        if let Err(e) = self.local.save_filter(&self.filter) {
            warn!(error = %e, "failed to persist filter reset");
        }
    }
}
