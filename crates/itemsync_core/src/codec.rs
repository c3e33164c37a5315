//! File-based bulk import and export.

use crate::collection::Collection;
use crate::error::FormatError;
use crate::item::Item;
use crate::merge::merge_batch;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How an imported batch is combined with the current collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Append items whose dedup key is new.
    #[default]
    Merge,
    /// Discard the current collection and keep only the batch.
    Replace,
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => Ok(ImportMode::Merge),
            "replace" => Ok(ImportMode::Replace),
            other => Err(format!("unknown import mode: {other}")),
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Merge => f.write_str("merge"),
            ImportMode::Replace => f.write_str("replace"),
        }
    }
}

/// The validated contents of an import payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBatch {
    /// Elements that passed validation, in file order.
    pub items: Vec<Item>,
    /// Number of elements dropped for failing validation.
    pub dropped: usize,
}

/// Summary of an applied import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    /// Mode used.
    pub mode: ImportMode,
    /// Elements that passed validation.
    pub accepted: usize,
    /// Elements that actually entered the collection.
    pub added: usize,
    /// Elements dropped for failing validation.
    pub dropped: usize,
}

/// Parses an import payload.
///
/// # Errors
///
/// Returns `FormatError` if the bytes are not JSON or not an array.
/// Invalid elements are counted, not reported as errors.
pub fn parse_import(bytes: &[u8]) -> Result<ImportBatch, FormatError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let candidates = match value {
        Value::Array(candidates) => candidates,
        other => {
            return Err(FormatError::NotAnArray {
                found: json_type(&other),
            })
        }
    };

    let total = candidates.len();
    let items: Vec<Item> = candidates.iter().filter_map(Item::from_candidate).collect();
    let dropped = total - items.len();
    if dropped > 0 {
        debug!(dropped, "import elements failed validation");
    }

    Ok(ImportBatch { items, dropped })
}

/// Applies a parsed batch to `collection`.
pub fn apply_import(
    collection: &mut Collection,
    batch: ImportBatch,
    mode: ImportMode,
) -> ImportReport {
    let accepted = batch.items.len();
    let added = match mode {
        ImportMode::Replace => {
            *collection = Collection::from_items(batch.items);
            collection.len()
        }
        ImportMode::Merge => merge_batch(collection, batch.items).len(),
    };

    ImportReport {
        mode,
        accepted,
        added,
        dropped: batch.dropped,
    }
}

/// Serializes the collection as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns `FormatError` if encoding fails.
pub fn export_json(collection: &Collection) -> Result<Vec<u8>, FormatError> {
    let mut bytes = serde_json::to_vec_pretty(collection)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Deterministic export file name for the given instant.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("items-export-{}.json", now.format("%Y%m%d-%H%M%S"))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
