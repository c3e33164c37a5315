//! Built-in items used on first run and after corruption.

use crate::collection::Collection;
use crate::item::Item;

const DEFAULT_ITEMS: [(&str, &str); 4] = [
    (
        "The best way to get started is to quit talking and begin doing.",
        "Motivation",
    ),
    (
        "Life is what happens when you're busy making other plans.",
        "Life",
    ),
    (
        "In the middle of every difficulty lies opportunity.",
        "Inspiration",
    ),
    ("Simplicity is the soul of efficiency.", "Wisdom"),
];

/// Returns the built-in default collection.
pub fn default_collection() -> Collection {
    Collection::from_items(
        DEFAULT_ITEMS
            .iter()
            .map(|(text, category)| Item::new(text, category)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_valid_distinct_defaults() {
        let defaults = default_collection();
        assert_eq!(defaults.len(), 4);
        assert!(defaults.iter().all(Item::is_valid));
        assert_eq!(defaults.categories().len(), 4);
    }
}
