//! Random command implementation.

use super::{format_item, open_book};
use std::path::Path;

/// Runs the random command.
pub fn run(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let book = open_book(data_dir)?;

    match book.show_random() {
        Some(item) => println!("{}", format_item(&item)),
        None => println!("No items match the filter {}", book.filter()),
    }
    Ok(())
}
