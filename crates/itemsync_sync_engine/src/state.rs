//! Sync engine state machine.

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::transport::RemoteTransport;
use itemsync_core::{CoreResult, Item, ItemBook};
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 64;

/// The current state of the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No cycle in flight.
    Idle,
    /// A cycle is fetching, merging or pushing.
    Running,
}

impl SyncState {
    /// Returns true if a new cycle may start.
    pub fn can_start_sync(&self) -> bool {
        matches!(self, SyncState::Idle)
    }
}

/// Statistics about sync operations.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Cycles that reached the end.
    pub cycles_completed: u64,
    /// Cycles aborted by a fetch failure.
    pub cycles_failed: u64,
    /// Remote items adopted locally.
    pub items_adopted: u64,
    /// Items accepted by the remote.
    pub items_pushed: u64,
    /// Push attempts that failed.
    pub push_failures: u64,
    /// Triggers dropped because a cycle was running.
    pub skipped_triggers: u64,
    /// Last completed cycle.
    pub last_sync_time: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Result of a sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCycleResult {
    /// Remote items adopted, in remote order.
    pub added: Vec<Item>,
    /// Number of items pushed.
    pub pushed: usize,
    /// Number of failed pushes.
    pub push_failures: usize,
    /// Duration of the sync cycle.
    pub duration: Duration,
}

/// What happened to a sync request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The cycle ran to completion.
    Completed(SyncCycleResult),
    /// Another cycle was running; nothing was done.
    Skipped,
}

/// Notifications emitted while syncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The remote could not be read; the cycle was abandoned.
    FetchFailed {
        /// Error message.
        message: String,
    },
    /// New remote items were merged into the collection.
    ItemsAdopted {
        /// Number of items adopted.
        count: usize,
    },
    /// The merged collection could not be saved; memory keeps it.
    PersistFailed {
        /// Error message.
        message: String,
    },
    /// One item could not be pushed; it is retried next cycle.
    PushFailed {
        /// The item that stayed local.
        item: Item,
        /// Error message.
        message: String,
    },
    /// A cycle finished.
    CycleCompleted(SyncCycleResult),
}

/// Returns the engine to `Idle` on every exit path.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The sync engine reconciles the local book with a remote collection.
pub struct SyncEngine<T: RemoteTransport> {
    config: SyncConfig,
    transport: Arc<T>,
    book: Arc<Mutex<ItemBook>>,
    running: AtomicBool,
    stats: RwLock<SyncStats>,
    events: broadcast::Sender<SyncEvent>,
}

impl<T: RemoteTransport> SyncEngine<T> {
    /// Creates a new sync engine.
    pub fn new(config: SyncConfig, transport: T, book: ItemBook) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            config,
            transport: Arc::new(transport),
            book: Arc::new(Mutex::new(book)),
            running: AtomicBool::new(false),
            stats: RwLock::new(SyncStats::default()),
            events,
        }
    }

    /// Gets the current state.
    pub fn state(&self) -> SyncState {
        if self.running.load(Ordering::SeqCst) {
            SyncState::Running
        } else {
            SyncState::Idle
        }
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Locks the book for reading or issuing commands.
    ///
    /// The guard must not be held across an `.await`.
    pub fn book(&self) -> MutexGuard<'_, ItemBook> {
        self.book.lock()
    }

    /// Subscribes to sync notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Runs one cycle unless one is already running.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the collection and the store are untouched.
    pub async fn sync(&self) -> SyncResult<SyncOutcome> {
        let Some(_guard) = self.try_begin() else {
            return Ok(SyncOutcome::Skipped);
        };
        self.run_cycle().await.map(SyncOutcome::Completed)
    }

    /// Starts a cycle on its own task unless one is already running.
    ///
    /// Returns whether a cycle was started. Results are reported through
    /// [`SyncEngine::subscribe`].
    pub fn trigger(self: &Arc<Self>) -> bool
    where
        T: 'static,
    {
        if !self.acquire() {
            return false;
        }
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let _guard = RunningGuard(&engine.running);
            // Failures are already logged and broadcast.
            let _ = engine.run_cycle().await;
        });
        true
    }

    /// Adds a user-entered item, then pushes it once on a best-effort basis.
    ///
    /// Not blocked by a running cycle; a failed push leaves the item local
    /// so a later cycle picks it up.
    ///
    /// # Errors
    ///
    /// Returns the book's validation or storage error. No push is attempted.
    pub async fn add_item(&self, text: &str, category: &str) -> CoreResult<Item> {
        let item = self.book.lock().add_item(text, category)?;

        match self.transport.push_item(&item).await {
            Ok(acknowledged) => {
                debug!(item = %acknowledged, "new item pushed");
                self.stats.write().items_pushed += 1;
            }
            Err(e) => {
                warn!(item = %item, error = %e, "push of new item failed, will retry on next sync");
                self.stats.write().push_failures += 1;
            }
        }
        Ok(item)
    }

    fn acquire(&self) -> bool {
        let acquired = self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if !acquired {
            debug!("sync already running, trigger dropped");
            self.stats.write().skipped_triggers += 1;
        }
        acquired
    }

    fn try_begin(&self) -> Option<RunningGuard<'_>> {
        self.acquire().then(|| RunningGuard(&self.running))
    }

    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    async fn run_cycle(&self) -> SyncResult<SyncCycleResult> {
        let start = Instant::now();
        debug!("sync cycle started");

        let remote = match self.transport.fetch_remote().await {
            Ok(remote) => remote,
            Err(e) => {
                warn!(error = %e, "fetch failed, skipping cycle");
                {
                    let mut stats = self.stats.write();
                    stats.cycles_failed += 1;
                    stats.last_error = Some(e.to_string());
                }
                self.emit(SyncEvent::FetchFailed {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let (added, persisted, candidates) = {
            let mut book = self.book.lock();
            let added = book.adopt_remote(&remote);
            // A dirty book retries a save that failed in an earlier cycle or add.
            let persisted = if added.is_empty() && !book.is_dirty() {
                Ok(())
            } else {
                book.persist()
            };
            let candidates = book.push_candidates(&remote, self.config.push_batch_size);
            (added, persisted, candidates)
        };

        if !added.is_empty() {
            info!(count = added.len(), "adopted remote items");
            self.emit(SyncEvent::ItemsAdopted { count: added.len() });
        }
        if let Err(e) = persisted {
            warn!(error = %e, "failed to persist merged items");
            self.stats.write().last_error = Some(e.to_string());
            self.emit(SyncEvent::PersistFailed {
                message: e.to_string(),
            });
        }

        let mut pushed = 0;
        let mut push_failures = 0;
        for item in candidates {
            match self.transport.push_item(&item).await {
                Ok(acknowledged) => {
                    debug!(item = %acknowledged, "item pushed");
                    pushed += 1;
                }
                Err(e) => {
                    warn!(item = %item, error = %e, "push failed, will retry on next sync");
                    push_failures += 1;
                    self.emit(SyncEvent::PushFailed {
                        item,
                        message: e.to_string(),
                    });
                }
            }
        }

        let result = SyncCycleResult {
            added,
            pushed,
            push_failures,
            duration: start.elapsed(),
        };

        {
            let mut stats = self.stats.write();
            stats.cycles_completed += 1;
            stats.items_adopted += result.added.len() as u64;
            stats.items_pushed += pushed as u64;
            stats.push_failures += push_failures as u64;
            stats.last_sync_time = Some(Instant::now());
        }

        info!(
            added = result.added.len(),
            pushed,
            push_failures,
            duration_ms = result.duration.as_millis() as u64,
            "sync cycle completed"
        );
        self.emit(SyncEvent::CycleCompleted(result.clone()));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use itemsync_core::ITEMS_KEY;
    use itemsync_storage::InMemoryStore;

    fn engine_with(local: &str, remote: Vec<Item>) -> SyncEngine<MockTransport> {
        let book = ItemBook::open(
            InMemoryStore::with_value(ITEMS_KEY, local),
            InMemoryStore::new(),
        );
        SyncEngine::new(
            SyncConfig::default(),
            MockTransport::with_remote(remote),
            book,
        )
    }

    #[test]
    fn sync_state_checks() {
        assert!(SyncState::Idle.can_start_sync());
        assert!(!SyncState::Running.can_start_sync());
    }

    #[test]
    fn sync_engine_initial_state() {
        let engine = engine_with("[]", Vec::new());
        assert_eq!(engine.state(), SyncState::Idle);
        assert_eq!(engine.stats().cycles_completed, 0);
        assert!(engine.book().collection().is_empty());
    }

    #[tokio::test]
    async fn sync_engine_successful_sync() {
        let engine = engine_with(
            r#"[{"text":"A","category":"X"},{"text":"B","category":"Y"}]"#,
            vec![Item::new("A", "X"), Item::new("C", "Z").with_id(3)],
        );

        let outcome = engine.sync().await.unwrap();
        let SyncOutcome::Completed(result) = outcome else {
            panic!("expected a completed cycle");
        };
        assert_eq!(result.added, vec![Item::new("C", "Z").with_id(3)]);
        assert_eq!(result.pushed, 1);
        assert_eq!(result.push_failures, 0);
        assert_eq!(engine.state(), SyncState::Idle);
        assert_eq!(engine.book().collection().len(), 3);
        assert_eq!(engine.transport().pushed_items()[0].text, "B");

        let stats = engine.stats();
        assert_eq!(stats.cycles_completed, 1);
        assert_eq!(stats.items_adopted, 1);
        assert_eq!(stats.items_pushed, 1);
        assert!(stats.last_sync_time.is_some());
    }

    #[tokio::test]
    async fn sync_engine_fetch_failure() {
        let engine = engine_with(r#"[{"text":"A","category":"X"}]"#, Vec::new());
        engine.transport().set_fail_fetch(true);
        let mut events = engine.subscribe();

        assert!(engine.sync().await.is_err());
        assert_eq!(engine.state(), SyncState::Idle);
        assert_eq!(engine.transport().push_calls(), 0);

        let stats = engine.stats();
        assert_eq!(stats.cycles_failed, 1);
        assert!(stats.last_error.is_some());
        assert!(matches!(
            events.try_recv().unwrap(),
            SyncEvent::FetchFailed { .. }
        ));
    }

    #[tokio::test]
    async fn push_batch_is_capped() {
        let local: Vec<Item> = (0..5).map(|i| Item::new(format!("L{i}"), "X")).collect();
        let book = ItemBook::open(
            InMemoryStore::with_value(ITEMS_KEY, serde_json::to_vec(&local).unwrap()),
            InMemoryStore::new(),
        );
        let engine = SyncEngine::new(
            SyncConfig::default().with_push_batch_size(2),
            MockTransport::new(),
            book,
        );

        engine.sync().await.unwrap();
        assert_eq!(engine.transport().push_calls(), 2);
        // Pushed items are on the remote now, so the next cycle moves on.
        engine.sync().await.unwrap();
        assert_eq!(engine.transport().push_calls(), 4);
    }

    #[tokio::test]
    async fn events_follow_cycle_order() {
        let engine = engine_with(
            r#"[{"text":"B","category":"Y"}]"#,
            vec![Item::new("C", "Z")],
        );
        engine.transport().set_fail_all_pushes(true);
        let mut events = engine.subscribe();

        engine.sync().await.unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            SyncEvent::ItemsAdopted { count: 1 }
        );
        assert!(matches!(
            events.try_recv().unwrap(),
            SyncEvent::PushFailed { item, .. } if item == Item::new("B", "Y")
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            SyncEvent::CycleCompleted(SyncCycleResult { push_failures: 1, .. })
        ));
    }
}
