use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curator_api::background::rule_scheduler;
use curator_api::catalog::http::HttpCatalogClient;
use curator_api::config::ServerConfig;
use curator_api::router::build_app_router;
use curator_api::state::AppState;
use curator_db::repositories::MaintenanceScanRepo;
use curator_db::DbPool;

const SCHEDULER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let addr = config.bind_addr().expect("HOST must be an IP address");
    tracing::info!(%addr, catalog = %config.scan.catalog_base_url, "Configuration loaded");

    let pool = connect_database().await;
    fail_interrupted_scans(&pool).await;

    let bridge = Arc::new(
        HttpCatalogClient::new(&config.scan.catalog_base_url, config.scan.catalog_timeout())
            .expect("Failed to build catalog HTTP client"),
    );
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        catalog: bridge.clone(),
        deleter: bridge,
        scan_tasks: TaskTracker::new(),
    };

    let scheduler_cancel = CancellationToken::new();
    let scheduler = tokio::spawn(rule_scheduler::run(
        state.clone(),
        scheduler_cancel.clone(),
    ));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, build_app_router(state.clone(), &config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("HTTP server stopped");
    scheduler_cancel.cancel();
    if tokio::time::timeout(SCHEDULER_STOP_TIMEOUT, scheduler)
        .await
        .is_err()
    {
        tracing::warn!("Rule scheduler did not stop in time");
    }
    drain_scans(&state, Duration::from_secs(config.shutdown_timeout_secs)).await;
    tracing::info!("Shutdown complete");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curator_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, check and migrate. Any failure aborts startup.
async fn connect_database() -> DbPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = curator_db::create_pool(&url)
        .await
        .expect("Failed to connect to database");
    curator_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    curator_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");
    pool
}

/// No executor survives a restart, so scans left active are failed.
async fn fail_interrupted_scans(pool: &DbPool) {
    let failed = MaintenanceScanRepo::fail_interrupted(pool, "Interrupted by server restart")
        .await
        .expect("Failed to reset interrupted scans");
    if failed > 0 {
        tracing::warn!(failed, "Failed scans interrupted by the previous shutdown");
    }
}

/// Stop accepting manual scans and wait for running ones up to `limit`.
async fn drain_scans(state: &AppState, limit: Duration) {
    state.scan_tasks.close();
    if tokio::time::timeout(limit, state.scan_tasks.wait())
        .await
        .is_err()
    {
        tracing::warn!(
            remaining = state.scan_tasks.len(),
            "Scans still running at shutdown; they are failed on next start",
        );
    }
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("SIGINT received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
