//! Narrow interfaces the engine uses to reach the media catalog.
//!
//! The engine never talks to the media server directly. It reads item
//! snapshots page by page through a [`CatalogAdapter`] and removes media
//! through a [`DeletionExecutor`]. Both are object-safe so the API layer can
//! hold them as `Arc<dyn ...>` and tests can substitute in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::media::MediaType;

/// Read-only view of one catalog item, keyed by registry field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItemSnapshot {
    /// Stable item identifier in the media server (e.g. a rating key).
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl MediaItemSnapshot {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            fields: Map::new(),
        }
    }

    /// Set a field value, returning the snapshot for chaining.
    pub fn with_field(mut self, name: &str, value: Value) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Look up a field. JSON `null` is treated the same as an absent key.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogPage {
    pub items: Vec<MediaItemSnapshot>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Errors surfaced by catalog and deletion collaborators.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Media item not found upstream: {0}")]
    NotFound(String),

    #[error("Malformed upstream payload: {0}")]
    Decode(String),
}

/// Paged read access to the media catalog.
#[async_trait]
pub trait CatalogAdapter: Send + Sync {
    /// Fetch one page of items of the given type. `page_token` is `None` for
    /// the first page; the returned `next_page_token` is `None` on the last.
    async fn list_items(
        &self,
        media_type: MediaType,
        page_token: Option<&str>,
    ) -> Result<CatalogPage, AdapterError>;
}

/// Removes media from the server and its companion services.
#[async_trait]
pub trait DeletionExecutor: Send + Sync {
    async fn delete(&self, media_item_key: &str) -> Result<(), AdapterError>;
}
