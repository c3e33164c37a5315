//! Transport layer abstraction for sync operations.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use itemsync_core::{DedupKey, Item};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A remote transport fetches the remote collection and pushes items to it.
///
/// This trait abstracts the network layer so the engine can run against
/// HTTP in production and a scripted mock in tests.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Fetches the remote items considered for this cycle.
    async fn fetch_remote(&self) -> SyncResult<Vec<Item>>;

    /// Pushes one item and returns the remote's acknowledged copy.
    async fn push_item(&self, item: &Item) -> SyncResult<Item>;
}

/// A mock transport for testing.
///
/// Holds a scripted remote collection. Successful pushes are appended to it
/// with a server-assigned id, so the next fetch sees them.
#[derive(Debug, Default)]
pub struct MockTransport {
    remote: Mutex<Vec<Item>>,
    pushed: Mutex<Vec<Item>>,
    failing_pushes: Mutex<HashSet<DedupKey>>,
    fail_all_pushes: AtomicBool,
    fail_fetch: AtomicBool,
    fetch_gate: Mutex<Option<Arc<Notify>>>,
    fetch_calls: AtomicUsize,
    push_calls: AtomicUsize,
    next_id: AtomicU64,
}

impl MockTransport {
    /// Creates a mock with an empty remote.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(100),
            ..Self::default()
        }
    }

    /// Creates a mock whose remote holds `items`.
    pub fn with_remote(items: Vec<Item>) -> Self {
        let mock = Self::new();
        *mock.remote.lock() = items;
        mock
    }

    /// Replaces the remote collection.
    pub fn set_remote(&self, items: Vec<Item>) {
        *self.remote.lock() = items;
    }

    /// Snapshot of the remote collection.
    pub fn remote_items(&self) -> Vec<Item> {
        self.remote.lock().clone()
    }

    /// Items accepted by push, in order.
    pub fn pushed_items(&self) -> Vec<Item> {
        self.pushed.lock().clone()
    }

    /// Makes fetches fail with a retryable transport error.
    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Makes every push fail.
    pub fn set_fail_all_pushes(&self, fail: bool) {
        self.fail_all_pushes.store(fail, Ordering::SeqCst);
    }

    /// Makes pushes of `item` fail until cleared.
    pub fn fail_push_for(&self, item: &Item) {
        self.failing_pushes.lock().insert(item.key());
    }

    /// Lets pushes of every item succeed again.
    pub fn clear_push_failures(&self) {
        self.failing_pushes.lock().clear();
        self.fail_all_pushes.store(false, Ordering::SeqCst);
    }

    /// Holds every fetch until the returned gate is notified.
    pub fn hold_fetches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.fetch_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    /// Number of fetches started.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of pushes attempted.
    pub fn push_calls(&self) -> usize {
        self.push_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteTransport for MockTransport {
    async fn fetch_remote(&self) -> SyncResult<Vec<Item>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.fetch_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(SyncError::transport_retryable("mock fetch failure"));
        }
        Ok(self.remote.lock().clone())
    }

    async fn push_item(&self, item: &Item) -> SyncResult<Item> {
        self.push_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_all_pushes.load(Ordering::SeqCst)
            || self.failing_pushes.lock().contains(&item.key())
        {
            return Err(SyncError::Status { status: 500 });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let acknowledged = item.clone().with_id(id);
        self.remote.lock().push(acknowledged.clone());
        self.pushed.lock().push(acknowledged.clone());
        Ok(acknowledged)
    }
}
