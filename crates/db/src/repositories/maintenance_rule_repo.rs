//! Repository for the `maintenance_rules` table.

use curator_core::types::DbId;
use sqlx::PgPool;

use crate::models::maintenance_rule::{
    CreateMaintenanceRule, MaintenanceRule, UpdateMaintenanceRule,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, enabled, media_type, criteria, action_type, \
    schedule, created_at, updated_at";

/// Provides CRUD operations for maintenance rules.
pub struct MaintenanceRuleRepo;

impl MaintenanceRuleRepo {
    /// Insert a new rule, returning the created row.
    ///
    /// `criteria` must already be validated; it is stored as given.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMaintenanceRule,
    ) -> Result<MaintenanceRule, sqlx::Error> {
        let query = format!(
            "INSERT INTO maintenance_rules
                (name, description, enabled, media_type, criteria, action_type, schedule)
             VALUES ($1, $2, COALESCE($3, TRUE), $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceRule>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.enabled)
            .bind(input.media_type.as_str())
            .bind(&input.criteria)
            .bind(input.action_type.as_str())
            .bind(&input.schedule)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MaintenanceRule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM maintenance_rules WHERE id = $1");
        sqlx::query_as::<_, MaintenanceRule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all rules, most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<MaintenanceRule>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM maintenance_rules ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, MaintenanceRule>(&query)
            .fetch_all(pool)
            .await
    }

    /// Enabled rules that carry a schedule, oldest first.
    pub async fn list_scheduled(pool: &PgPool) -> Result<Vec<MaintenanceRule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_rules
             WHERE enabled AND schedule IS NOT NULL
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, MaintenanceRule>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a rule. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMaintenanceRule,
    ) -> Result<Option<MaintenanceRule>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_rules SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                enabled = COALESCE($4, enabled),
                media_type = COALESCE($5, media_type),
                criteria = COALESCE($6, criteria),
                action_type = COALESCE($7, action_type),
                schedule = COALESCE($8, schedule)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceRule>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.enabled)
            .bind(input.media_type.map(|m| m.as_str()))
            .bind(&input.criteria)
            .bind(input.action_type.map(|a| a.as_str()))
            .bind(&input.schedule)
            .fetch_optional(pool)
            .await
    }

    /// Flip the `enabled` flag, returning the updated row.
    pub async fn toggle_enabled(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MaintenanceRule>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_rules SET enabled = NOT enabled
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceRule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a rule and, by cascade, its scans and candidates.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM maintenance_rules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
