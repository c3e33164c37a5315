//! Periodic and on-demand sync triggering.
//!
//! The scheduler owns no sync logic. It turns startup, interval ticks and
//! manual requests into [`SyncEngine::trigger`] calls; the engine's guard
//! drops any trigger that arrives while a cycle is running.

use crate::config::SyncConfig;
use crate::state::SyncEngine;
use crate::transport::RemoteTransport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Shortest accepted interval; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
enum Command {
    Trigger,
    Shutdown,
}

/// Starts the background trigger loop.
pub struct SyncScheduler;

impl SyncScheduler {
    /// Spawns the loop on the current runtime.
    ///
    /// The first trigger fires immediately, then every
    /// `config.sync_interval`; missed ticks are skipped.
    pub fn start<T>(engine: Arc<SyncEngine<T>>, config: &SyncConfig) -> SchedulerHandle
    where
        T: RemoteTransport + 'static,
    {
        let (commands, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_loop(engine, config.sync_interval, receiver));
        info!(interval_secs = config.sync_interval.as_secs(), "sync scheduler started");
        SchedulerHandle { commands, task }
    }
}

async fn run_loop<T>(
    engine: Arc<SyncEngine<T>>,
    period: Duration,
    mut commands: mpsc::UnboundedReceiver<Command>,
) where
    T: RemoteTransport + 'static,
{
    let mut ticker = tokio::time::interval(period.max(MIN_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // The first tick completes at once: the startup trigger.
            _ = ticker.tick() => {
                debug!("scheduled sync trigger");
                engine.trigger();
            }
            command = commands.recv() => match command {
                Some(Command::Trigger) => {
                    debug!("manual sync trigger");
                    engine.trigger();
                }
                Some(Command::Shutdown) | None => break,
            }
        }
    }
    info!("sync scheduler stopped");
}

/// Handle to a running scheduler.
#[derive(Debug)]
pub struct SchedulerHandle {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Requests an immediate sync.
    ///
    /// Returns false if the scheduler has stopped.
    pub fn trigger(&self) -> bool {
        self.commands.send(Command::Trigger).is_ok()
    }

    /// Stops the loop and waits for it to exit.
    ///
    /// A cycle already in flight keeps running on its own task.
    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown);
        let _ = self.task.await;
    }
}
