//! Ordered item collection with unique dedup keys.

use crate::filter::CategoryFilter;
use crate::item::{DedupKey, Item};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An ordered set of items in which no two items share a dedup key.
///
/// Every insertion path checks the key, so the invariant holds for any
/// value of this type. Serializes as a plain JSON array of items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Item>", into = "Vec<Item>")]
pub struct Collection {
    items: Vec<Item>,
    keys: HashSet<DedupKey>,
}

impl Collection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection, keeping the first item of each dedup key.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut collection = Self::new();
        for item in items {
            collection.insert(item);
        }
        collection
    }

    /// Appends `item` unless an item with the same key exists.
    ///
    /// Returns true if the item was added.
    pub fn insert(&mut self, item: Item) -> bool {
        if !self.keys.insert(item.key()) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Returns true if an item with `key` is present.
    pub fn contains_key(&self, key: &DedupKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns true if an item with the same key as `item` is present.
    pub fn contains(&self, item: &Item) -> bool {
        self.contains_key(&item.key())
    }

    /// Returns the set of keys in the collection.
    pub fn keys(&self) -> &HashSet<DedupKey> {
        &self.keys
    }

    /// Returns the items in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Iterates over items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the collection holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .filter(|item| seen.insert(item.category.as_str()))
            .map(|item| item.category.clone())
            .collect()
    }

    /// Returns true if some item carries exactly `category`.
    pub fn has_category(&self, category: &str) -> bool {
        self.items.iter().any(|item| item.category == category)
    }

    /// Items matching `filter`, in insertion order.
    pub fn filtered<'a>(&'a self, filter: &'a CategoryFilter) -> impl Iterator<Item = &'a Item> {
        self.items.iter().filter(move |item| filter.matches(item))
    }

    /// Consumes the collection, returning its items.
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for Collection {}

impl From<Vec<Item>> for Collection {
    fn from(items: Vec<Item>) -> Self {
        Self::from_items(items)
    }
}

impl From<Collection> for Vec<Item> {
    fn from(collection: Collection) -> Self {
        collection.items
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
