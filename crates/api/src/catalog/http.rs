//! HTTP client for the catalog bridge service.
//!
//! The bridge fronts the media server and its download managers:
//!
//! ```text
//! GET    {base}/items?media_type=MOVIE&page_token=...   -> CatalogPage
//! DELETE {base}/items/{key}                              -> 2xx on success, 404 if gone
//! ```

use std::time::Duration;

use async_trait::async_trait;
use curator_core::catalog::{AdapterError, CatalogAdapter, CatalogPage, DeletionExecutor};
use curator_core::media::MediaType;

/// HTTP client for one catalog bridge instance.
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Create a client with a per-request timeout.
    ///
    /// * `base_url` - e.g. `http://localhost:8090`; a trailing slash is ignored.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/items/{key}` with the key percent-encoded as a single segment.
    fn item_url(&self, key: &str) -> Result<reqwest::Url, AdapterError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| AdapterError::Request(format!("Invalid catalog URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| AdapterError::Request("Catalog URL cannot be a base".into()))?
            .pop_if_empty()
            .push("items")
            .push(key);
        Ok(url)
    }

    // ---- private helpers ----

    /// Return the response unchanged on success, or an [`AdapterError`]
    /// carrying the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AdapterError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AdapterError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn request_error(err: reqwest::Error) -> AdapterError {
    AdapterError::Request(err.to_string())
}

#[async_trait]
impl CatalogAdapter for HttpCatalogClient {
    async fn list_items(
        &self,
        media_type: MediaType,
        page_token: Option<&str>,
    ) -> Result<CatalogPage, AdapterError> {
        let mut request = self
            .client
            .get(format!("{}/items", self.base_url))
            .query(&[("media_type", media_type.as_str())]);
        if let Some(token) = page_token {
            request = request.query(&[("page_token", token)]);
        }

        let response = request.send().await.map_err(request_error)?;
        let response = Self::ensure_success(response).await?;
        response
            .json::<CatalogPage>()
            .await
            .map_err(|e| AdapterError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DeletionExecutor for HttpCatalogClient {
    async fn delete(&self, media_item_key: &str) -> Result<(), AdapterError> {
        let url = self.item_url(media_item_key)?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(request_error)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AdapterError::NotFound(media_item_key.to_string()));
        }
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_url_encodes_key() {
        let client = HttpCatalogClient::with_client(reqwest::Client::new(), "http://bridge:8090/");
        let url = client.item_url("library/42 a").unwrap();
        assert_eq!(url.as_str(), "http://bridge:8090/items/library%2F42%20a");
    }

    #[test]
    fn test_item_url_keeps_base_path() {
        let client =
            HttpCatalogClient::with_client(reqwest::Client::new(), "http://bridge:8090/api");
        let url = client.item_url("17").unwrap();
        assert_eq!(url.as_str(), "http://bridge:8090/api/items/17");
    }
}
