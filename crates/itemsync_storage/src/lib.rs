//! # itemsync storage
//!
//! Key-value stores backing itemsync persistence.
//!
//! Stores are **opaque value stores**: they map a short string key to a
//! byte value and never interpret what they hold. JSON encoding, defaults
//! and corruption handling live one layer up in `itemsync_core`.
//!
//! ## Available Stores
//!
//! - [`FileStore`] - Durable store, one file per key inside a locked directory
//! - [`InMemoryStore`] - Transient store for the per-session slot and for tests
//!
//! ## Example
//!
//! ```rust
//! use itemsync_storage::{KeyValueStore, InMemoryStore};
//!
//! let store = InMemoryStore::new();
//! store.put("filter", b"\"all\"").unwrap();
//! assert_eq!(store.get("filter").unwrap().as_deref(), Some(&b"\"all\""[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::KeyValueStore;
pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::InMemoryStore;
