//! Sync command implementation.

use super::{format_item, open_engine};
use itemsync_sync_engine::{SyncConfig, SyncOutcome};
use std::path::Path;

/// Runs a single sync cycle.
pub async fn run(data_dir: &Path, config: &SyncConfig) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine(data_dir, config)?;
    println!("Syncing with {}", config.endpoint);

    match engine.sync().await? {
        SyncOutcome::Completed(result) => {
            println!("✓ Sync completed in {} ms", result.duration.as_millis());
            println!("  Adopted: {}", result.added.len());
            for item in &result.added {
                println!("    {}", format_item(item));
            }
            println!("  Pushed: {}", result.pushed);
            if result.push_failures > 0 {
                println!("  Push failures: {} (retried next sync)", result.push_failures);
            }
            if let Some(error) = engine.stats().last_error {
                println!("! {error}");
            }
        }
        SyncOutcome::Skipped => println!("Sync already running, nothing done"),
    }
    Ok(())
}
