//! Handlers for user feedback: marks, watch intents and the admin summary.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use curator_core::feedback::{
    summarize, summarize_all, validate_marked_via, validate_note, validate_priority,
    validate_progress, IntentType, MarkType, MediaFeedbackSummary,
};
use curator_db::models::media_feedback::{
    CreateUserMediaMark, UpsertWatchIntent, UserMediaMark, UserWatchIntent,
};
use curator_db::repositories::{UserMediaMarkRepo, UserWatchIntentRepo};
use serde::Serialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// Marks and intents on one item, plus its summary.
#[derive(Debug, Serialize)]
pub struct MediaMarkDetails {
    pub summary: MediaFeedbackSummary,
    pub marks: Vec<UserMediaMark>,
    pub intents: Vec<UserWatchIntent>,
}

/// Stored type names are constrained by the schema; anything else is
/// skipped with a warning rather than failing the whole summary.
fn parse_logged<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    let parsed = raw.parse().ok();
    if parsed.is_none() {
        tracing::warn!(media_item_key = key, value = raw, "Skipping unknown feedback type");
    }
    parsed
}

// ── Admin ───────────────────────────────────────────────────────────

/// GET /api/v1/admin/feedback/summary
///
/// One summary per marked item, highest deletion priority first.
pub async fn feedback_summary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<MediaFeedbackSummary>>>> {
    let marks = UserMediaMarkRepo::mark_log(&state.pool).await?;
    let intents = UserWatchIntentRepo::intent_log(&state.pool).await?;

    let mut intents_by_item: HashMap<String, Vec<IntentType>> = HashMap::new();
    for entry in intents {
        if let Some(intent) = parse_logged(&entry.media_item_key, &entry.intent_type) {
            intents_by_item
                .entry(entry.media_item_key)
                .or_default()
                .push(intent);
        }
    }

    let summaries = summarize_all(marks.iter().filter_map(|entry| {
        parse_logged::<MarkType>(&entry.media_item_key, &entry.mark_type)
            .map(|mark| (entry.media_item_key.as_str(), mark))
    }))
    .into_iter()
    .map(|summary| {
        let intents = intents_by_item
            .remove(&summary.media_item_key)
            .unwrap_or_default();
        summary.with_intents(intents)
    })
    .collect();

    Ok(Json(DataResponse::new(summaries)))
}

/// GET /api/v1/admin/feedback/media/{key}
pub async fn media_mark_details(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(key): Path<String>,
) -> AppResult<Json<DataResponse<MediaMarkDetails>>> {
    let marks = UserMediaMarkRepo::list_for_item(&state.pool, &key).await?;
    let intents = UserWatchIntentRepo::list_for_item(&state.pool, &key).await?;

    let summary = summarize(
        &key,
        marks
            .iter()
            .filter_map(|m| parse_logged::<MarkType>(&key, &m.mark_type)),
    )
    .with_intents(
        intents
            .iter()
            .filter_map(|i| parse_logged::<IntentType>(&key, &i.intent_type)),
    );

    Ok(Json(DataResponse {
        data: MediaMarkDetails {
            summary,
            marks,
            intents,
        },
    }))
}

// ── Current user ────────────────────────────────────────────────────

/// POST /api/v1/user/marks
pub async fn create_mark(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CreateUserMediaMark>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    validate_note(input.note.as_deref())?;
    if let Some(source) = input.marked_via.as_deref() {
        validate_marked_via(source)?;
    }

    let mark = UserMediaMarkRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(
        user_id = user.user_id,
        media_item_key = %mark.media_item_key,
        mark_type = %mark.mark_type,
        "Feedback mark recorded",
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(mark))))
}

/// GET /api/v1/user/marks
pub async fn list_my_marks(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<UserMediaMark>>>> {
    let marks = UserMediaMarkRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse::new(marks)))
}

/// PUT /api/v1/user/intents
///
/// Creates or replaces the caller's intent on an item.
pub async fn upsert_intent(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<UpsertWatchIntent>,
) -> AppResult<Json<DataResponse<UserWatchIntent>>> {
    input.validate()?;
    if let Some(priority) = input.priority {
        validate_priority(priority)?;
    }
    validate_progress(input.current_season, input.current_episode)?;

    let intent = UserWatchIntentRepo::upsert(&state.pool, user.user_id, &input).await?;
    tracing::debug!(
        user_id = user.user_id,
        media_item_key = %intent.media_item_key,
        intent_type = %intent.intent_type,
        "Watch intent saved",
    );
    Ok(Json(DataResponse::new(intent)))
}

/// GET /api/v1/user/intents
pub async fn list_my_intents(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<UserWatchIntent>>>> {
    let intents = UserWatchIntentRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse::new(intents)))
}
