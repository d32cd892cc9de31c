#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use curator_api::auth::jwt::JwtConfig;
use curator_api::config::{ScanConfig, ServerConfig};
use curator_api::router::build_app_router;
use curator_api::state::AppState;
use curator_core::catalog::{
    AdapterError, CatalogAdapter, CatalogPage, DeletionExecutor, MediaItemSnapshot,
};
use curator_core::media::MediaType;
use curator_core::roles::{ROLE_ADMIN, ROLE_USER};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio_util::task::TaskTracker;
use tower::ServiceExt;

pub const ADMIN_ID: i64 = 1;
pub const USER_ID: i64 = 2;

// ---------------------------------------------------------------------------
// Fake collaborators
// ---------------------------------------------------------------------------

/// In-memory catalog serving fixed pages. The page token is the page index.
#[derive(Default)]
pub struct FakeCatalog {
    pages: Vec<Vec<MediaItemSnapshot>>,
    delay: Option<Duration>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn with_pages(pages: Vec<Vec<MediaItemSnapshot>>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    /// Every page request sleeps for `delay` first.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every page request fails with an upstream error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl CatalogAdapter for FakeCatalog {
    async fn list_items(
        &self,
        _media_type: MediaType,
        page_token: Option<&str>,
    ) -> Result<CatalogPage, AdapterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(AdapterError::Upstream {
                status: 503,
                body: "catalog offline".into(),
            });
        }

        let index: usize = page_token.map_or(0, |t| t.parse().unwrap());
        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next_page_token = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
        Ok(CatalogPage {
            items,
            next_page_token,
        })
    }
}

/// Records deleted keys; can be switched to fail every call.
#[derive(Default)]
pub struct FakeDeleter {
    pub fail: AtomicBool,
    pub deleted: Mutex<Vec<String>>,
}

impl FakeDeleter {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeletionExecutor for FakeDeleter {
    async fn delete(&self, media_item_key: &str) -> Result<(), AdapterError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AdapterError::Upstream {
                status: 500,
                body: "disk busy".into(),
            });
        }
        self.deleted.lock().unwrap().push(media_item_key.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "curator-integration-secret".to_string(),
            access_token_expiry_mins: 15,
            leeway_secs: 0,
        },
        scan: ScanConfig {
            catalog_timeout_secs: 2,
            deletion_timeout_secs: 2,
            workers: 2,
            chunk_size: 2,
            ..ScanConfig::default()
        },
    }
}

pub fn test_state(
    pool: PgPool,
    catalog: Arc<FakeCatalog>,
    deleter: Arc<FakeDeleter>,
) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
        catalog,
        deleter,
        scan_tasks: TaskTracker::new(),
    }
}

/// Build the full application router over the given state.
pub fn build_app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    build_app_router(state, &config)
}

/// Router with an empty catalog and a working deleter.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app(test_state(
        pool,
        Arc::new(FakeCatalog::default()),
        Arc::new(FakeDeleter::default()),
    ))
}

pub fn admin_token() -> String {
    test_config().jwt.issue(ADMIN_ID, ROLE_ADMIN).unwrap()
}

pub fn user_token() -> String {
    test_config().jwt.issue(USER_ID, ROLE_USER).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
