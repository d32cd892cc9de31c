//! Route definitions for the `/admin/maintenance` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{candidates, maintenance};
use crate::state::AppState;

/// Routes mounted at `/admin/maintenance`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /rules                          -> list rules
/// POST   /rules                          -> create rule
/// GET    /rules/{id}                     -> get rule
/// PUT    /rules/{id}                     -> update rule
/// DELETE /rules/{id}                     -> delete rule
/// POST   /rules/{id}/toggle              -> flip enabled
/// POST   /rules/{id}/scans               -> trigger manual scan (202)
/// GET    /rules/{id}/scans               -> scan history
/// GET    /scans/{id}                     -> scan detail
/// POST   /scans/{id}/cancel              -> cancel active scan
/// GET    /candidates                     -> list candidates
/// POST   /candidates/bulk-approve        -> bulk approve
/// POST   /candidates/bulk-reject         -> bulk reject
/// POST   /candidates/{id}/approve        -> approve and delete
/// POST   /candidates/{id}/reject         -> reject
/// GET    /fields                         -> field registry
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/rules",
            get(maintenance::list_rules).post(maintenance::create_rule),
        )
        .route(
            "/rules/{id}",
            get(maintenance::get_rule)
                .put(maintenance::update_rule)
                .delete(maintenance::delete_rule),
        )
        .route("/rules/{id}/toggle", post(maintenance::toggle_rule))
        .route(
            "/rules/{id}/scans",
            get(maintenance::list_scans).post(maintenance::trigger_manual_scan),
        )
        .route("/scans/{id}", get(maintenance::get_scan))
        .route("/scans/{id}/cancel", post(maintenance::cancel_scan))
        .route("/candidates", get(candidates::list_candidates))
        .route("/candidates/bulk-approve", post(candidates::bulk_approve))
        .route("/candidates/bulk-reject", post(candidates::bulk_reject))
        .route("/candidates/{id}/approve", post(candidates::approve_candidate))
        .route("/candidates/{id}/reject", post(candidates::reject_candidate))
        .route("/fields", get(maintenance::list_fields))
}
