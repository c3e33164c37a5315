//! End-to-end scenarios over an on-disk store.

use itemsync_core::{
    default_collection, ImportMode, Item, ItemBook, LoadSource, LocalStore, ITEMS_KEY,
};
use itemsync_storage::{FileStore, InMemoryStore, KeyValueStore};
use std::fs;
use tempfile::tempdir;

fn stored_items(store: &FileStore) -> Vec<Item> {
    serde_json::from_slice(&store.get(ITEMS_KEY).unwrap().unwrap()).unwrap()
}

#[test]
fn first_run_on_empty_directory() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let local = LocalStore::new(store);

    let (collection, source) = local.load_with_source();
    assert_eq!(source, LoadSource::FirstRun);
    assert_eq!(collection.len(), 4);
    assert!(dir.path().join("items.json").exists());
}

#[test]
fn corruption_recovery_overwrites_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("items.json"), "not json").unwrap();

    {
        let local = LocalStore::new(FileStore::open(dir.path()).unwrap());
        let (collection, source) = local.load_with_source();
        assert_eq!(source, LoadSource::Recovered);
        assert_eq!(collection, default_collection());
    }

    let store = FileStore::open(dir.path()).unwrap();
    assert_eq!(stored_items(&store), default_collection().into_items());
}

#[test]
fn merge_import_scenario() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("items.json"),
        r#"[{"text":"A","category":"X"}]"#,
    )
    .unwrap();

    let mut book = ItemBook::open(FileStore::open(dir.path()).unwrap(), InMemoryStore::new());
    let report = book
        .import(
            br#"[{"text":"A","category":"X"},{"text":"B","category":"Y"}]"#,
            ImportMode::Merge,
        )
        .unwrap();

    let expected = vec![Item::new("A", "X"), Item::new("B", "Y")];
    assert_eq!(book.collection().items(), &expected[..]);
    assert_eq!(report.accepted, 2);
    assert_eq!(report.added, 1);
    drop(book);

    let store = FileStore::open(dir.path()).unwrap();
    assert_eq!(stored_items(&store), expected);
}

#[test]
fn replace_import_scenario() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("items.json"),
        r#"[{"text":"A","category":"X"},{"text":"Old","category":"Q"}]"#,
    )
    .unwrap();

    let mut book = ItemBook::open(FileStore::open(dir.path()).unwrap(), InMemoryStore::new());
    book.import(
        br#"[{"text":"A","category":"X"},{"text":"B","category":"Y"},{"category":"Z"}]"#,
        ImportMode::Replace,
    )
    .unwrap();

    let expected = vec![Item::new("A", "X"), Item::new("B", "Y")];
    assert_eq!(book.collection().items(), &expected[..]);
    drop(book);

    let store = FileStore::open(dir.path()).unwrap();
    assert_eq!(stored_items(&store), expected);
}

#[test]
fn export_then_import_into_fresh_book() {
    let source_dir = tempdir().unwrap();
    let mut source = ItemBook::open(
        FileStore::open(source_dir.path()).unwrap(),
        InMemoryStore::new(),
    );
    source.add_item("Fresh", "Notes").unwrap();
    let exported = source.export().unwrap();

    let target_dir = tempdir().unwrap();
    let mut target = ItemBook::open(
        FileStore::open(target_dir.path()).unwrap(),
        InMemoryStore::new(),
    );
    let report = target.import(&exported, ImportMode::Replace).unwrap();

    assert_eq!(report.accepted, 5);
    assert_eq!(target.collection(), source.collection());
}

#[test]
fn quota_exceeded_save_keeps_memory_state() {
    let store = InMemoryStore::with_quota(16);
    let mut book = ItemBook::open(store, InMemoryStore::new());
    assert_eq!(book.collection().len(), 4);

    let err = book.add_item("Too big to save", "Notes").unwrap_err();
    assert!(err.is_recoverable());
    assert!(matches!(
        err,
        itemsync_core::CoreError::Storage(itemsync_storage::StorageError::QuotaExceeded { .. })
    ));
    assert_eq!(book.collection().len(), 5);
}
