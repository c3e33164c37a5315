//! Add-only reconciliation of local and remote item sets.
//!
//! Identity is the dedup key alone, so two items either are the same item
//! or are unrelated. There is no field-level conflict to resolve:
//!
//! - a remote item whose key is new is adopted
//! - a remote item whose key exists locally is ignored, even if its `id`
//!   or spelling differs
//! - nothing is ever removed

use crate::collection::Collection;
use crate::item::{DedupKey, Item};
use std::collections::HashSet;

/// Outcome of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Local items followed by the adopted remote items.
    pub merged: Collection,
    /// Remote items that were not present locally, in remote order.
    pub added: Vec<Item>,
}

impl Reconciliation {
    /// Returns true if the merge adopted anything.
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Merges `remote` into a copy of `local`.
///
/// Pure and idempotent: reconciling the result against the same remote
/// batch adopts nothing.
pub fn reconcile(local: &Collection, remote: &[Item]) -> Reconciliation {
    let mut merged = local.clone();
    let added = merge_batch(&mut merged, remote.iter().cloned());
    Reconciliation { merged, added }
}

/// Appends each item of `batch` whose key is not yet in `collection`.
///
/// Later duplicates within the batch are suppressed as well. Returns the
/// items actually appended.
pub fn merge_batch(collection: &mut Collection, batch: impl IntoIterator<Item = Item>) -> Vec<Item> {
    let mut added = Vec::new();
    for item in batch {
        if collection.insert(item.clone()) {
            added.push(item);
        }
    }
    added
}

/// Local items whose key does not appear in `remote`, in local order.
///
/// Advisory only: it chooses what to try pushing, never what to merge.
pub fn local_only(local: &Collection, remote: &[Item]) -> Vec<Item> {
    let remote_keys: HashSet<DedupKey> = remote.iter().map(Item::key).collect();
    local
        .iter()
        .filter(|item| !remote_keys.contains(&item.key()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(pairs: &[(&str, &str)]) -> Vec<Item> {
        pairs.iter().map(|(t, c)| Item::new(t, c)).collect()
    }

    #[test]
    fn adopts_remote_only_items() {
        let local = Collection::from_items(items(&[("A", "X")]));
        let remote = items(&[("A", "X"), ("C", "Z")]);

        let result = reconcile(&local, &remote);
        assert_eq!(result.merged.items(), &items(&[("A", "X"), ("C", "Z")])[..]);
        assert_eq!(result.added, items(&[("C", "Z")]));
        assert!(result.changed());
    }

    #[test]
    fn never_overwrites_on_match() {
        let local = Collection::from_items(vec![Item::new("A", "X")]);
        let remote = vec![Item::new("a", " x ").with_id(42)];

        let result = reconcile(&local, &remote);
        assert!(result.added.is_empty());
        assert_eq!(result.merged.items()[0], Item::new("A", "X"));
    }

    #[test]
    fn suppresses_duplicates_within_remote_batch() {
        let local = Collection::new();
        let remote = vec![
            Item::new("B", "Y").with_id(1),
            Item::new("b", "y").with_id(2),
        ];

        let result = reconcile(&local, &remote);
        assert_eq!(result.added.len(), 1);
        assert_eq!(result.added[0].id, Some(1));
    }

    #[test]
    fn second_pass_adds_nothing() {
        let local = Collection::from_items(items(&[("A", "X")]));
        let remote = items(&[("C", "Z"), ("D", "Z")]);

        let first = reconcile(&local, &remote);
        let second = reconcile(&first.merged, &remote);
        assert!(second.added.is_empty());
        assert_eq!(second.merged, first.merged);
    }

    #[test]
    fn local_only_excludes_remote_keys() {
        let local = Collection::from_items(items(&[("A", "X"), ("B", "Y"), ("C", "Z")]));
        let remote = items(&[("b", "y")]);

        assert_eq!(local_only(&local, &remote), items(&[("A", "X"), ("C", "Z")]));
        assert!(local_only(&Collection::new(), &remote).is_empty());
    }
}
