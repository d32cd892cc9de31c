//! Repository for the `maintenance_scans` table.
//!
//! Every state change is a conditional `UPDATE ... WHERE status_id = ...`
//! so that concurrent writers (the executor, a cancel request, the startup
//! sweep) can never move a scan out of a terminal state. A `None` return
//! means the scan was not in the expected state.

use curator_core::status::ScanStatus;
use curator_core::types::DbId;
use sqlx::PgPool;

use crate::models::maintenance_candidate::NewCandidate;
use crate::models::maintenance_scan::MaintenanceScan;
use crate::repositories::MaintenanceCandidateRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, rule_id, status_id, items_scanned, items_flagged, started_at, \
    completed_at, error_message, triggered_by, created_at, updated_at";

/// Name of the partial unique index guarding one active scan per rule.
pub const ACTIVE_SCAN_CONSTRAINT: &str = "uq_maintenance_scans_active_rule";

/// Provides lifecycle operations for maintenance scans.
pub struct MaintenanceScanRepo;

impl MaintenanceScanRepo {
    /// Create a PENDING scan unless the rule already has a PENDING or RUNNING
    /// one. Returns `None` when an active scan exists.
    ///
    /// Two racing inserts that both pass the `NOT EXISTS` check are still
    /// serialized by the partial unique index; the loser gets a unique
    /// violation on [`ACTIVE_SCAN_CONSTRAINT`].
    pub async fn create_if_idle(
        pool: &PgPool,
        rule_id: DbId,
        triggered_by: Option<DbId>,
    ) -> Result<Option<MaintenanceScan>, sqlx::Error> {
        let query = format!(
            "INSERT INTO maintenance_scans (rule_id, status_id, triggered_by)
             SELECT $1, $2, $3
             WHERE NOT EXISTS (
                 SELECT 1 FROM maintenance_scans
                 WHERE rule_id = $1 AND status_id IN ($2, $4)
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceScan>(&query)
            .bind(rule_id)
            .bind(ScanStatus::Pending.id())
            .bind(triggered_by)
            .bind(ScanStatus::Running.id())
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MaintenanceScan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM maintenance_scans WHERE id = $1");
        sqlx::query_as::<_, MaintenanceScan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Scans of one rule, newest first.
    pub async fn list_for_rule(
        pool: &PgPool,
        rule_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MaintenanceScan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_scans
             WHERE rule_id = $1
             ORDER BY started_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, MaintenanceScan>(&query)
            .bind(rule_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Most recently started scan of a rule, in any state.
    pub async fn latest_for_rule(
        pool: &PgPool,
        rule_id: DbId,
    ) -> Result<Option<MaintenanceScan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_scans
             WHERE rule_id = $1
             ORDER BY started_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, MaintenanceScan>(&query)
            .bind(rule_id)
            .fetch_optional(pool)
            .await
    }

    /// PENDING -> RUNNING. Resets `started_at` to the actual start.
    pub async fn mark_running(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MaintenanceScan>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_scans SET status_id = $2, started_at = NOW()
             WHERE id = $1 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceScan>(&query)
            .bind(id)
            .bind(ScanStatus::Running.id())
            .bind(ScanStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Record one catalog page: insert its candidates and add to the scan's
    /// counters in a single transaction.
    ///
    /// The scan row is locked first. When the scan is no longer RUNNING
    /// nothing is written and `None` is returned, so a cancelled or failed
    /// scan never gains candidates. `items_flagged` grows by the number of
    /// rows actually inserted.
    pub async fn record_page(
        pool: &PgPool,
        id: DbId,
        page_scanned: i64,
        candidates: &[NewCandidate],
    ) -> Result<Option<MaintenanceScan>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let running: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM maintenance_scans WHERE id = $1 AND status_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(ScanStatus::Running.id())
        .fetch_optional(&mut *tx)
        .await?;
        if running.is_none() {
            return Ok(None);
        }

        let mut inserted: i64 = 0;
        for candidate in candidates {
            if MaintenanceCandidateRepo::create(&mut *tx, candidate)
                .await?
                .is_some()
            {
                inserted += 1;
            }
        }

        let query = format!(
            "UPDATE maintenance_scans SET
                items_scanned = items_scanned + $2, items_flagged = items_flagged + $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let scan = sqlx::query_as::<_, MaintenanceScan>(&query)
            .bind(id)
            .bind(page_scanned)
            .bind(inserted)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(scan))
    }

    /// RUNNING -> COMPLETED with final counters.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        items_scanned: i64,
        items_flagged: i64,
    ) -> Result<Option<MaintenanceScan>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_scans SET
                status_id = $2, items_scanned = $3, items_flagged = $4, completed_at = NOW()
             WHERE id = $1 AND status_id = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceScan>(&query)
            .bind(id)
            .bind(ScanStatus::Completed.id())
            .bind(items_scanned)
            .bind(items_flagged)
            .bind(ScanStatus::Running.id())
            .fetch_optional(pool)
            .await
    }

    /// PENDING/RUNNING -> FAILED. Counters keep their last persisted values.
    pub async fn fail(
        pool: &PgPool,
        id: DbId,
        error_message: &str,
    ) -> Result<Option<MaintenanceScan>, sqlx::Error> {
        Self::finish_active(pool, id, ScanStatus::Failed, Some(error_message)).await
    }

    /// PENDING/RUNNING -> CANCELLED.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<Option<MaintenanceScan>, sqlx::Error> {
        Self::finish_active(pool, id, ScanStatus::Cancelled, None).await
    }

    async fn finish_active(
        pool: &PgPool,
        id: DbId,
        status: ScanStatus,
        error_message: Option<&str>,
    ) -> Result<Option<MaintenanceScan>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_scans SET
                status_id = $2, error_message = $3, completed_at = NOW()
             WHERE id = $1 AND status_id IN ($4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceScan>(&query)
            .bind(id)
            .bind(status.id())
            .bind(error_message)
            .bind(ScanStatus::Pending.id())
            .bind(ScanStatus::Running.id())
            .fetch_optional(pool)
            .await
    }

    /// Fail every scan still PENDING or RUNNING. Used at startup, when no
    /// executor can be alive to finish them. Returns the number of scans failed.
    pub async fn fail_interrupted(pool: &PgPool, error_message: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE maintenance_scans SET
                status_id = $1, error_message = $2, completed_at = NOW()
             WHERE status_id IN ($3, $4)",
        )
        .bind(ScanStatus::Failed.id())
        .bind(error_message)
        .bind(ScanStatus::Pending.id())
        .bind(ScanStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
