//! Repository for the append-only `user_media_marks` table.

use curator_core::types::DbId;
use sqlx::PgPool;

use crate::models::media_feedback::{CreateUserMediaMark, MarkLogEntry, UserMediaMark};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, media_item_key, media_type, mark_type, note, marked_via, \
    created_at, updated_at";

/// Default channel recorded when a request does not name one.
pub const DEFAULT_MARKED_VIA: &str = "web";

/// Provides insert and read operations for feedback marks. Marks are never
/// updated or deleted.
pub struct UserMediaMarkRepo;

impl UserMediaMarkRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateUserMediaMark,
    ) -> Result<UserMediaMark, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_media_marks
                (user_id, media_item_key, media_type, mark_type, note, marked_via)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserMediaMark>(&query)
            .bind(user_id)
            .bind(&input.media_item_key)
            .bind(input.media_type.as_str())
            .bind(input.mark_type.as_str())
            .bind(&input.note)
            .bind(input.marked_via.as_deref().unwrap_or(DEFAULT_MARKED_VIA))
            .fetch_one(pool)
            .await
    }

    /// Marks left by one user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserMediaMark>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_media_marks
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, UserMediaMark>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Every mark on one item, oldest first.
    pub async fn list_for_item(
        pool: &PgPool,
        media_item_key: &str,
    ) -> Result<Vec<UserMediaMark>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_media_marks
             WHERE media_item_key = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, UserMediaMark>(&query)
            .bind(media_item_key)
            .fetch_all(pool)
            .await
    }

    /// The whole mark log reduced to `(item, mark type)` pairs.
    pub async fn mark_log(pool: &PgPool) -> Result<Vec<MarkLogEntry>, sqlx::Error> {
        sqlx::query_as::<_, MarkLogEntry>(
            "SELECT media_item_key, mark_type FROM user_media_marks ORDER BY id ASC",
        )
        .fetch_all(pool)
        .await
    }
}
