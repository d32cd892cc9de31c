//! User feedback models: append-only marks and per-user watch intents.

use curator_core::feedback::{IntentType, MarkType};
use curator_core::media::MediaType;
use curator_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `user_media_marks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserMediaMark {
    pub id: DbId,
    pub user_id: DbId,
    pub media_item_key: String,
    pub media_type: String,
    pub mark_type: String,
    pub note: Option<String>,
    pub marked_via: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for leaving a mark. The user id comes from the token.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserMediaMark {
    #[validate(length(min = 1, max = 500, message = "media_item_key must be 1-500 characters"))]
    pub media_item_key: String,
    pub media_type: MediaType,
    pub mark_type: MarkType,
    pub note: Option<String>,
    pub marked_via: Option<String>,
}

/// A row from the `user_watch_intents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserWatchIntent {
    pub id: DbId,
    pub user_id: DbId,
    pub media_item_key: String,
    pub media_type: String,
    pub intent_type: String,
    pub priority: i32,
    pub current_season: Option<i32>,
    pub current_episode: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for creating or replacing the caller's intent on an item.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertWatchIntent {
    #[validate(length(min = 1, max = 500, message = "media_item_key must be 1-500 characters"))]
    pub media_item_key: String,
    pub media_type: MediaType,
    pub intent_type: IntentType,
    pub priority: Option<i32>,
    pub current_season: Option<i32>,
    pub current_episode: Option<i32>,
}

/// `(item, mark type)` projection of the mark log used for scoring.
#[derive(Debug, Clone, FromRow)]
pub struct MarkLogEntry {
    pub media_item_key: String,
    pub mark_type: String,
}

/// `(item, intent type)` projection used to count active intents.
#[derive(Debug, Clone, FromRow)]
pub struct IntentLogEntry {
    pub media_item_key: String,
    pub intent_type: String,
}
