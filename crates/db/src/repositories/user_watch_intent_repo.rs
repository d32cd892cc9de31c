//! Repository for the `user_watch_intents` table.

use curator_core::types::DbId;
use sqlx::PgPool;

use crate::models::media_feedback::{IntentLogEntry, UpsertWatchIntent, UserWatchIntent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, media_item_key, media_type, intent_type, priority, \
    current_season, current_episode, created_at, updated_at";

/// Provides upsert and read operations for watch intents.
pub struct UserWatchIntentRepo;

impl UserWatchIntentRepo {
    /// Create the user's intent for an item, or replace the existing one.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpsertWatchIntent,
    ) -> Result<UserWatchIntent, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_watch_intents
                (user_id, media_item_key, media_type, intent_type, priority,
                 current_season, current_episode)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), $6, $7)
             ON CONFLICT ON CONSTRAINT uq_user_watch_intents_user_item DO UPDATE SET
                media_type = EXCLUDED.media_type,
                intent_type = EXCLUDED.intent_type,
                priority = EXCLUDED.priority,
                current_season = EXCLUDED.current_season,
                current_episode = EXCLUDED.current_episode
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserWatchIntent>(&query)
            .bind(user_id)
            .bind(&input.media_item_key)
            .bind(input.media_type.as_str())
            .bind(input.intent_type.as_str())
            .bind(input.priority)
            .bind(input.current_season)
            .bind(input.current_episode)
            .fetch_one(pool)
            .await
    }

    /// Intents of one user, highest priority first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserWatchIntent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_watch_intents
             WHERE user_id = $1
             ORDER BY priority DESC, updated_at DESC"
        );
        sqlx::query_as::<_, UserWatchIntent>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Every user's intent on one item.
    pub async fn list_for_item(
        pool: &PgPool,
        media_item_key: &str,
    ) -> Result<Vec<UserWatchIntent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_watch_intents
             WHERE media_item_key = $1
             ORDER BY updated_at DESC"
        );
        sqlx::query_as::<_, UserWatchIntent>(&query)
            .bind(media_item_key)
            .fetch_all(pool)
            .await
    }

    /// All intents reduced to `(item, intent type)` pairs.
    pub async fn intent_log(pool: &PgPool) -> Result<Vec<IntentLogEntry>, sqlx::Error> {
        sqlx::query_as::<_, IntentLogEntry>(
            "SELECT media_item_key, intent_type FROM user_watch_intents ORDER BY id ASC",
        )
        .fetch_all(pool)
        .await
    }
}
