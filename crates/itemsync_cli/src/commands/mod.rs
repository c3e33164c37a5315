//! CLI command implementations.

pub mod add;
pub mod categories;
pub mod export;
pub mod import;
pub mod list;
pub mod random;
pub mod select;
pub mod sync;
pub mod watch;

use itemsync_core::{Item, ItemBook, LoadSource};
use itemsync_storage::{FileStore, InMemoryStore, StorageResult};
use itemsync_sync_engine::{HttpTransport, ReqwestClient, SyncConfig, SyncEngine};
use std::path::Path;
use tracing::{info, warn};

/// Engine type used by the networked commands.
pub type HttpEngine = SyncEngine<HttpTransport<ReqwestClient>>;

/// Builds the sync configuration, overriding the endpoint if given.
pub fn sync_config(endpoint: Option<&str>) -> SyncConfig {
    match endpoint {
        Some(endpoint) => SyncConfig::new(endpoint),
        None => SyncConfig::default(),
    }
}

/// Opens the book stored in `data_dir`.
///
/// The session store lives only as long as the process.
pub fn open_book(data_dir: &Path) -> StorageResult<ItemBook> {
    let store = FileStore::open(data_dir)?;
    let book = ItemBook::open(store, InMemoryStore::new());
    match book.load_source() {
        LoadSource::Stored => {}
        LoadSource::FirstRun => info!(path = ?data_dir, "created a new collection"),
        LoadSource::Recovered => {
            warn!(path = ?data_dir, "stored collection was unreadable, restored defaults")
        }
    }
    Ok(book)
}

/// Opens the book and wraps it in an HTTP-backed engine.
pub fn open_engine(
    data_dir: &Path,
    config: &SyncConfig,
) -> Result<HttpEngine, Box<dyn std::error::Error>> {
    let book = open_book(data_dir)?;
    let transport = HttpTransport::from_config(config)?;
    Ok(SyncEngine::new(config.clone(), transport, book))
}

/// Formats one item for display.
pub fn format_item(item: &Item) -> String {
    format!("\"{}\" [{}]", item.text, item.category)
}
