//! Configuration for the sync engine.

use std::time::Duration;

/// Default remote collection endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Remote collection URL, used for both GET and POST.
    pub endpoint: String,
    /// Number of leading remote records considered per fetch.
    pub fetch_limit: usize,
    /// Maximum push attempts per cycle.
    pub push_batch_size: usize,
    /// Period between scheduled cycles.
    pub sync_interval: Duration,
    /// Per-request timeout applied by the transport.
    pub timeout: Duration,
    /// Category given to remote records that carry none.
    pub remote_category: String,
}

impl SyncConfig {
    /// Creates a configuration for `endpoint` with default limits.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            fetch_limit: 10,
            push_batch_size: 10,
            sync_interval: Duration::from_secs(30),
            timeout: Duration::from_secs(10),
            remote_category: "Remote".to_string(),
        }
    }

    /// Sets the fetch prefix length.
    pub fn with_fetch_limit(mut self, limit: usize) -> Self {
        self.fetch_limit = limit;
        self
    }

    /// Sets the per-cycle push cap.
    pub fn with_push_batch_size(mut self, size: usize) -> Self {
        self.push_batch_size = size;
        self
    }

    /// Sets the scheduled sync interval.
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the fallback category for remote records.
    pub fn with_remote_category(mut self, category: impl Into<String>) -> Self {
        self.remote_category = category.into();
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}
