//! List command implementation.

use super::{format_item, open_book};
use itemsync_core::{CategoryFilter, Item};
use std::path::Path;

/// Runs the list command.
///
/// With `category`, shows that category without changing the persisted
/// filter.
pub fn run(data_dir: &Path, category: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let book = open_book(data_dir)?;

    let filter = match category {
        Some(name) => name.parse::<CategoryFilter>()?,
        None => book.filter().clone(),
    };
    let items: Vec<&Item> = book.collection().filtered(&filter).collect();

    println!("Showing: {} ({} of {})", filter, items.len(), book.collection().len());
    for item in items {
        println!("  {}", format_item(item));
    }
    Ok(())
}
