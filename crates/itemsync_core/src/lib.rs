//! # itemsync core
//!
//! Item model, add-only merge engine and local persistence.
//!
//! This crate provides:
//! - [`Item`] records with content-addressed identity ([`DedupKey`])
//! - [`Collection`], an ordered item set that never holds two items with
//!   the same key
//! - [`reconcile`] and [`local_only`], the pure merge functions driving sync
//! - [`LocalStore`] / [`SessionStore`], JSON persistence that fails closed
//!   to defaults on corruption
//! - Import/export of JSON item arrays
//! - [`ItemBook`], the single owner of the in-memory collection
//!
//! ## Key Invariants
//!
//! - No two items in a collection share a dedup key
//! - Merging never removes or overwrites a local item
//! - Reconciling twice against the same remote batch adopts nothing the
//!   second time
//!
//! ## Example
//!
//! ```rust
//! use itemsync_core::{reconcile, Collection, Item};
//!
//! let local = Collection::from_items(vec![Item::new("A", "X")]);
//! let remote = vec![Item::new("A", "X"), Item::new("C", "Z")];
//!
//! let result = reconcile(&local, &remote);
//! assert_eq!(result.added, vec![Item::new("C", "Z")]);
//! assert_eq!(result.merged.len(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod book;
mod codec;
mod collection;
mod defaults;
mod error;
mod filter;
mod item;
mod local_store;
mod merge;

pub use book::ItemBook;
pub use codec::{
    apply_import, export_file_name, export_json, parse_import, ImportBatch, ImportMode,
    ImportReport,
};
pub use collection::Collection;
pub use defaults::default_collection;
pub use error::{CoreError, CoreResult, FormatError, ValidationError};
pub use filter::{CategoryFilter, ALL_CATEGORIES};
pub use item::{normalize, validate, DedupKey, Item, KEY_SEPARATOR};
pub use local_store::{LoadSource, LocalStore, SessionStore, FILTER_KEY, ITEMS_KEY, LAST_VIEWED_KEY};
pub use merge::{local_only, merge_batch, reconcile, Reconciliation};
