//! # itemsync Sync Engine
//!
//! Reconciliation cycle and scheduling for itemsync.
//!
//! This crate provides:
//! - Sync state machine (idle → running → idle) with overlap suppression
//! - Remote transport abstraction with an HTTP implementation and a mock
//! - A scheduler that triggers on startup, on an interval and on demand
//! - Broadcast notifications for adopted items and failures
//!
//! ## Architecture
//!
//! Each cycle is **fetch, merge, push**:
//! 1. Fetch the remote collection
//! 2. Adopt remote items whose dedup key is new, then persist
//! 3. Push local items the remote lacks, one at a time
//!
//! ## Key Invariants
//!
//! - At most one cycle runs at a time; extra triggers are dropped
//! - A fetch failure leaves the collection and the store untouched
//! - A failed push is never fatal; the item is retried next cycle
//! - The book lock is never held across an `.await`

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod http;
mod scheduler;
mod state;
mod transport;

pub use config::{SyncConfig, DEFAULT_ENDPOINT};
pub use error::{SyncError, SyncResult};
pub use http::{HttpClient, HttpResponse, HttpTransport, ReqwestClient};
pub use scheduler::{SchedulerHandle, SyncScheduler};
pub use state::{SyncCycleResult, SyncEngine, SyncEvent, SyncOutcome, SyncState, SyncStats};
pub use transport::{MockTransport, RemoteTransport};
