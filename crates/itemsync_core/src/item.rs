//! Item record, validation and dedup identity.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Separator between the normalized text and category in a dedup key.
pub const KEY_SEPARATOR: char = '\u{241F}';

/// A short text record tagged with a category.
///
/// `id` is only present when the remote service assigned one. It is
/// informational and never part of the item's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Record text.
    pub text: String,
    /// Category tag.
    pub category: String,
    /// Identifier assigned by the remote service, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl Item {
    /// Creates an item with trimmed fields and no remote id.
    ///
    /// Does not validate; see [`Item::validated`].
    pub fn new(text: impl AsRef<str>, category: impl AsRef<str>) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
            category: category.as_ref().trim().to_string(),
            id: None,
        }
    }

    /// Creates a trimmed item, rejecting blank fields.
    pub fn validated(
        text: impl AsRef<str>,
        category: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let item = Self::new(text, category);
        item.check()?;
        Ok(item)
    }

    /// Sets the remote id.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns true if both fields are non-empty after trimming.
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    /// Checks both fields, reporting the first blank one.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyText);
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        Ok(())
    }

    /// Returns the content-addressed identity of this item.
    pub fn key(&self) -> DedupKey {
        DedupKey::new(&self.text, &self.category)
    }

    /// Builds an item from an arbitrary JSON candidate.
    ///
    /// Returns `None` unless the value is an object whose `text` and
    /// `category` are strings with non-blank content. A numeric `id` is
    /// kept; any other `id` is ignored.
    pub fn from_candidate(candidate: &Value) -> Option<Self> {
        let object = candidate.as_object()?;
        let text = object.get("text")?.as_str()?;
        let category = object.get("category")?.as_str()?;

        let mut item = Self::new(text, category);
        if !item.is_valid() {
            return None;
        }
        item.id = object.get("id").and_then(Value::as_u64);
        Some(item)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" [{}]", self.text, self.category)
    }
}

/// Returns true iff `candidate` is an object whose `text` and `category`
/// are strings with trimmed length greater than zero.
pub fn validate(candidate: &Value) -> bool {
    Item::from_candidate(candidate).is_some()
}

/// Canonical identity of an item: normalized text and category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey(String);

impl DedupKey {
    /// Derives the key for a text/category pair.
    pub fn new(text: &str, category: &str) -> Self {
        let mut key = normalize(text);
        key.push(KEY_SEPARATOR);
        key.push_str(&normalize(category));
        Self(key)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trims, collapses inner whitespace runs to one space, and lowercases.
pub fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validator_rejects_blanks() {
        assert!(!validate(&json!({"text": "", "category": "x"})));
        assert!(!validate(&json!({"text": "x", "category": "  "})));
        assert!(validate(&json!({"text": "x", "category": "y"})));
    }

    #[test]
    fn validator_rejects_wrong_shapes() {
        assert!(!validate(&json!("just a string")));
        assert!(!validate(&json!({"text": 42, "category": "x"})));
        assert!(!validate(&json!({"text": "x"})));
        assert!(!validate(&json!(null)));
    }

    #[test]
    fn validated_reports_first_blank_field() {
        assert_eq!(Item::validated(" ", "x"), Err(ValidationError::EmptyText));
        assert_eq!(
            Item::validated("x", "\t"),
            Err(ValidationError::EmptyCategory)
        );
        let item = Item::validated("  hello ", " Life ").unwrap();
        assert_eq!(item.text, "hello");
        assert_eq!(item.category, "Life");
    }

    #[test]
    fn candidate_keeps_numeric_id_only() {
        let item = Item::from_candidate(&json!({"text": "a", "category": "b", "id": 7})).unwrap();
        assert_eq!(item.id, Some(7));

        let item =
            Item::from_candidate(&json!({"text": "a", "category": "b", "id": "x"})).unwrap();
        assert_eq!(item.id, None);
    }

    #[test]
    fn key_ignores_case_whitespace_and_id() {
        let a = Item::new("Hello   World", "Life");
        let b = Item::new(" hello world ", "LIFE").with_id(3);
        assert_eq!(a.key(), b.key());

        let c = Item::new("Hello World", "Work");
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn key_separator_prevents_field_bleed() {
        assert_ne!(DedupKey::new("ab", "c"), DedupKey::new("a", "bc"));
        assert!(DedupKey::new("a", "b").as_str().contains(KEY_SEPARATOR));
    }

    #[test]
    fn serialization_omits_absent_id() {
        let json = serde_json::to_value(Item::new("a", "b")).unwrap();
        assert_eq!(json, json!({"text": "a", "category": "b"}));

        let json = serde_json::to_value(Item::new("a", "b").with_id(1)).unwrap();
        assert_eq!(json, json!({"text": "a", "category": "b", "id": 1}));
    }
}
