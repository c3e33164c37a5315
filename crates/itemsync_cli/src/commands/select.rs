//! Select command implementation.

use super::open_book;
use itemsync_core::CategoryFilter;
use std::path::Path;

/// Runs the select command.
pub fn run(data_dir: &Path, category: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut book = open_book(data_dir)?;
    let filter: CategoryFilter = category.parse()?;

    book.select_category(filter)?;
    println!("✓ Filter set to {}", book.filter());
    println!("  Visible items: {}", book.visible_items().len());
    Ok(())
}
