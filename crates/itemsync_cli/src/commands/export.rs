//! Export command implementation.

use super::open_book;
use chrono::Utc;
use itemsync_core::export_file_name;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Runs the export command.
///
/// Without `output`, writes a timestamped file into the current directory.
pub fn run(data_dir: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let book = open_book(data_dir)?;
    let bytes = book.export()?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(export_file_name(Utc::now())),
    };
    let mut file = fs::File::create(&path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;

    println!("✓ Exported {} items", book.collection().len());
    println!("  Path: {:?}", path);
    Ok(())
}
