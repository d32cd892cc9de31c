//! Route definitions for user feedback.

use axum::routing::get;
use axum::Router;

use crate::handlers::feedback;
use crate::state::AppState;

/// Routes mounted at `/admin/feedback` (admin only).
///
/// ```text
/// GET    /summary                        -> deletion scores for every marked item
/// GET    /media/{key}                    -> marks, intents and summary for one item
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(feedback::feedback_summary))
        .route("/media/{key}", get(feedback::media_mark_details))
}

/// Routes mounted at `/user` (any authenticated user).
///
/// ```text
/// GET    /marks                          -> caller's marks
/// POST   /marks                          -> leave a mark
/// GET    /intents                        -> caller's watch intents
/// PUT    /intents                        -> create or replace an intent
/// ```
pub fn user_router() -> Router<AppState> {
    Router::new()
        .route(
            "/marks",
            get(feedback::list_my_marks).post(feedback::create_mark),
        )
        .route(
            "/intents",
            get(feedback::list_my_intents).put(feedback::upsert_intent),
        )
}
