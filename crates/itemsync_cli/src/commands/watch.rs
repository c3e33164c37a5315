//! Watch command implementation.

use super::open_engine;
use itemsync_sync_engine::{SyncConfig, SyncEvent, SyncScheduler};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

/// Syncs on startup and every `config.sync_interval` until Ctrl-C.
pub async fn run(data_dir: &Path, config: &SyncConfig) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(open_engine(data_dir, config)?);
    let mut events = engine.subscribe();
    let scheduler = SyncScheduler::start(Arc::clone(&engine), config);

    println!(
        "Watching {} every {}s (Ctrl-C to stop)",
        config.endpoint,
        config.sync_interval.as_secs()
    );

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "failed to listen for Ctrl-C");
                }
                break;
            }
            event = events.recv() => match event {
                Ok(event) => report(&event),
                Err(RecvError::Lagged(missed)) => warn!(missed, "dropped sync notifications"),
                Err(RecvError::Closed) => break,
            }
        }
    }

    scheduler.shutdown().await;
    let stats = engine.stats();
    println!(
        "Stopped after {} cycles ({} failed): {} adopted, {} pushed",
        stats.cycles_completed, stats.cycles_failed, stats.items_adopted, stats.items_pushed
    );
    Ok(())
}

fn report(event: &SyncEvent) {
    match event {
        SyncEvent::FetchFailed { message } => println!("! Sync failed: {message}"),
        SyncEvent::ItemsAdopted { count } => println!("✓ {count} new item(s) from the remote"),
        SyncEvent::PersistFailed { message } => println!("! Could not save merged items: {message}"),
        SyncEvent::PushFailed { item, message } => {
            println!("! Could not push \"{}\": {message}", item.text)
        }
        SyncEvent::CycleCompleted(result) => println!(
            "  Cycle done: {} adopted, {} pushed, {} failed",
            result.added.len(),
            result.pushed,
            result.push_failures
        ),
    }
}
