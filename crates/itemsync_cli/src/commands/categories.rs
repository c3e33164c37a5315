//! Categories command implementation.

use super::open_book;
use itemsync_core::CategoryFilter;
use std::path::Path;

/// Runs the categories command.
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let book = open_book(data_dir)?;

    for category in book.categories() {
        let count = book
            .collection()
            .filtered(&CategoryFilter::Category(category.clone()))
            .count();
        let marker = if book.filter().category() == Some(category.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{marker} {category} ({count})");
    }
    Ok(())
}
