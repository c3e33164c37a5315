//! Add command implementation.

use super::{format_item, open_book, open_engine};
use itemsync_sync_engine::SyncConfig;
use std::path::Path;

/// Runs the add command.
///
/// Unless `offline` is set, the new item is pushed once; a failed push is
/// only logged and the next sync retries it.
pub async fn run(
    data_dir: &Path,
    config: &SyncConfig,
    text: &str,
    category: &str,
    offline: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let item = if offline {
        open_book(data_dir)?.add_item(text, category)?
    } else {
        let engine = open_engine(data_dir, config)?;
        let item = engine.add_item(text, category).await?;
        if engine.stats().push_failures > 0 {
            println!("! Push failed, the item will be sent on the next sync");
        }
        item
    };

    println!("✓ Added {}", format_item(&item));
    Ok(())
}
