//! HTTP transport implementation.
//!
//! The remote is a JSON collection endpoint: `GET` returns an array of
//! records, `POST` accepts one record and echoes it back with an id. The
//! HTTP client itself is abstracted behind [`HttpClient`] so the record
//! mapping can be tested without a network.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::RemoteTransport;
use async_trait::async_trait;
use itemsync_core::Item;
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Response returned by an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a GET request.
    async fn get(&self, url: &str) -> SyncResult<HttpResponse>;

    /// Sends a POST request with a JSON body.
    async fn post_json(&self, url: &str, body: &Value) -> SyncResult<HttpResponse>;
}

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Builds a client whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns a fatal transport error if the TLS backend cannot be set up.
    pub fn new(timeout: Duration) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("itemsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::transport_fatal(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> SyncResult<HttpResponse> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_response(response).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> SyncResult<HttpResponse> {
        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_response(response).await
    }
}

async fn read_response(response: reqwest::Response) -> SyncResult<HttpResponse> {
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    Ok(HttpResponse {
        status,
        body: body.to_vec(),
    })
}

fn map_reqwest_error(e: reqwest::Error) -> SyncError {
    if e.is_timeout() {
        SyncError::Timeout
    } else if e.is_builder() {
        SyncError::transport_fatal(e.to_string())
    } else {
        SyncError::transport_retryable(e.to_string())
    }
}

/// Body sent when pushing an item.
#[derive(Debug, Serialize)]
struct PushBody<'a> {
    text: &'a str,
    category: &'a str,
}

/// HTTP-based remote transport.
pub struct HttpTransport<C: HttpClient> {
    endpoint: String,
    fetch_limit: usize,
    remote_category: String,
    client: C,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a transport for the endpoint and limits in `config`.
    pub fn new(config: &SyncConfig, client: C) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            fetch_limit: config.fetch_limit,
            remote_category: config.remote_category.clone(),
            client,
        }
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl HttpTransport<ReqwestClient> {
    /// Creates a transport over a `reqwest` client configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns a fatal transport error if the client cannot be built.
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        Ok(Self::new(config, ReqwestClient::new(config.timeout)?))
    }
}

#[async_trait]
impl<C: HttpClient> RemoteTransport for HttpTransport<C> {
    async fn fetch_remote(&self) -> SyncResult<Vec<Item>> {
        let response = self.client.get(&self.endpoint).await?;
        if !response.is_success() {
            return Err(SyncError::Status {
                status: response.status,
            });
        }

        let records = match serde_json::from_slice::<Value>(&response.body) {
            Ok(Value::Array(records)) => records,
            Ok(_) => return Err(SyncError::Decode("expected a JSON array".into())),
            Err(e) => return Err(SyncError::Decode(e.to_string())),
        };

        let total = records.len();
        let items: Vec<Item> = records
            .iter()
            .take(self.fetch_limit)
            .filter_map(|record| map_record(record, &self.remote_category))
            .collect();
        debug!(total, mapped = items.len(), "fetched remote records");
        Ok(items)
    }

    async fn push_item(&self, item: &Item) -> SyncResult<Item> {
        let body = serde_json::to_value(PushBody {
            text: &item.text,
            category: &item.category,
        })
        .map_err(|e| SyncError::Decode(e.to_string()))?;

        let response = self.client.post_json(&self.endpoint, &body).await?;
        if !response.is_success() {
            return Err(SyncError::Status {
                status: response.status,
            });
        }

        // The echo only contributes a server id; text and category stay ours.
        let id = serde_json::from_slice::<Value>(&response.body)
            .ok()
            .as_ref()
            .and_then(record_id);
        match id {
            Some(id) => Ok(item.clone().with_id(id)),
            None => {
                warn!(item = %item, "push acknowledged without an id");
                Ok(item.clone())
            }
        }
    }
}

/// Maps a remote record onto an item.
///
/// Text comes from `text`, then `title`, then `body`; the category falls
/// back to `fallback_category`. Records without usable text are skipped.
fn map_record(record: &Value, fallback_category: &str) -> Option<Item> {
    let object = record.as_object()?;
    let text = ["text", "title", "body"]
        .iter()
        .filter_map(|field| object.get(*field).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())?;
    let category = object
        .get("category")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(fallback_category);

    let item = Item::validated(text, category).ok()?;
    Some(match record_id(record) {
        Some(id) => item.with_id(id),
        None => item,
    })
}

fn record_id(record: &Value) -> Option<u64> {
    record.get("id").and_then(Value::as_u64)
}
