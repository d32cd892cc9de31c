pub mod feedback;
pub mod health;
pub mod maintenance;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /admin/maintenance/rules                         list, create (admin only)
/// /admin/maintenance/rules/{id}                    get, update, delete
/// /admin/maintenance/rules/{id}/toggle             enable / disable (POST)
/// /admin/maintenance/rules/{id}/scans              trigger (POST), history (GET)
/// /admin/maintenance/scans/{id}                    scan detail
/// /admin/maintenance/scans/{id}/cancel             cancel (POST)
/// /admin/maintenance/candidates                    list with filters
/// /admin/maintenance/candidates/{id}/approve       approve and delete (POST)
/// /admin/maintenance/candidates/{id}/reject        reject (POST)
/// /admin/maintenance/candidates/bulk-approve       bulk approve (POST)
/// /admin/maintenance/candidates/bulk-reject        bulk reject (POST)
/// /admin/maintenance/fields                        field registry
///
/// /admin/feedback/summary                          per-item deletion scores
/// /admin/feedback/media/{key}                      marks and intents on one item
///
/// /user/marks                                      create (POST), list own (GET)
/// /user/intents                                    upsert (PUT), list own (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/admin/maintenance", maintenance::router())
        .nest("/admin/feedback", feedback::admin_router())
        .nest("/user", feedback::user_router())
}
