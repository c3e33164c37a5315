//! Import command implementation.

use super::open_book;
use itemsync_core::ImportMode;
use std::path::Path;
use tracing::info;

/// Runs the import command.
pub async fn run(
    data_dir: &Path,
    file: &Path,
    mode: ImportMode,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Importing {:?} ({})", file, mode);
    let bytes = tokio::fs::read(file).await?;

    let mut book = open_book(data_dir)?;
    let report = book.import(&bytes, mode)?;

    println!("✓ Import completed ({})", report.mode);
    println!("  Accepted: {}", report.accepted);
    println!("  Added: {}", report.added);
    if report.dropped > 0 {
        println!("  Dropped (invalid): {}", report.dropped);
    }
    println!("  Collection size: {}", book.collection().len());
    Ok(())
}
