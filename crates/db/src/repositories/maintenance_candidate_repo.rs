//! Repository for the `maintenance_candidates` table.

use curator_core::status::ReviewStatus;
use curator_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::maintenance_candidate::{CandidateFilter, MaintenanceCandidate, NewCandidate};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, scan_id, rule_id, media_type, media_item_key, title, \
    review_status_id, flagged_at, reviewed_at, reviewed_by, deletion_error, deleted_at, \
    created_at, updated_at";

/// Provides CRUD and review transitions for maintenance candidates.
pub struct MaintenanceCandidateRepo;

impl MaintenanceCandidateRepo {
    /// Insert a candidate. Returns `None` if the scan already flagged the
    /// same item (the catalog may repeat an item across pages).
    pub async fn create<'e, E>(
        executor: E,
        input: &NewCandidate,
    ) -> Result<Option<MaintenanceCandidate>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO maintenance_candidates
                (scan_id, rule_id, media_type, media_item_key, title, review_status_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT ON CONSTRAINT uq_maintenance_candidates_scan_item DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceCandidate>(&query)
            .bind(input.scan_id)
            .bind(input.rule_id)
            .bind(input.media_type.as_str())
            .bind(&input.media_item_key)
            .bind(&input.title)
            .bind(input.review_status.id())
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MaintenanceCandidate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM maintenance_candidates WHERE id = $1");
        sqlx::query_as::<_, MaintenanceCandidate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List candidates matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &CandidateFilter,
    ) -> Result<Vec<MaintenanceCandidate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_candidates
             WHERE ($1::SMALLINT IS NULL OR review_status_id = $1)
               AND ($2::TEXT IS NULL OR media_type = $2)
               AND ($3::BIGINT IS NULL OR rule_id = $3)
             ORDER BY flagged_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, MaintenanceCandidate>(&query)
            .bind(filter.review_status.map(|s| s.id()))
            .bind(filter.media_type.map(|m| m.as_str()))
            .bind(filter.rule_id)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Candidates of one scan, in flagging order.
    pub async fn list_for_scan(
        pool: &PgPool,
        scan_id: DbId,
    ) -> Result<Vec<MaintenanceCandidate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_candidates
             WHERE scan_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, MaintenanceCandidate>(&query)
            .bind(scan_id)
            .fetch_all(pool)
            .await
    }

    /// APPROVED candidates of one scan still waiting for deletion.
    pub async fn list_approved_for_scan(
        pool: &PgPool,
        scan_id: DbId,
    ) -> Result<Vec<MaintenanceCandidate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_candidates
             WHERE scan_id = $1 AND review_status_id = $2
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, MaintenanceCandidate>(&query)
            .bind(scan_id)
            .bind(ReviewStatus::Approved.id())
            .fetch_all(pool)
            .await
    }

    /// PENDING -> APPROVED. Returns `None` if the candidate was not PENDING.
    pub async fn approve(
        pool: &PgPool,
        id: DbId,
        reviewed_by: DbId,
    ) -> Result<Option<MaintenanceCandidate>, sqlx::Error> {
        Self::review(pool, id, reviewed_by, ReviewStatus::Approved).await
    }

    /// PENDING -> REJECTED. Returns `None` if the candidate was not PENDING.
    pub async fn reject(
        pool: &PgPool,
        id: DbId,
        reviewed_by: DbId,
    ) -> Result<Option<MaintenanceCandidate>, sqlx::Error> {
        Self::review(pool, id, reviewed_by, ReviewStatus::Rejected).await
    }

    async fn review(
        pool: &PgPool,
        id: DbId,
        reviewed_by: DbId,
        decision: ReviewStatus,
    ) -> Result<Option<MaintenanceCandidate>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_candidates SET
                review_status_id = $2, reviewed_at = NOW(), reviewed_by = $3
             WHERE id = $1 AND review_status_id = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceCandidate>(&query)
            .bind(id)
            .bind(decision.id())
            .bind(reviewed_by)
            .bind(ReviewStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// APPROVED -> DELETED once the media is gone. Clears any earlier error.
    pub async fn mark_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MaintenanceCandidate>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_candidates SET
                review_status_id = $2, deleted_at = NOW(), deletion_error = NULL
             WHERE id = $1 AND review_status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceCandidate>(&query)
            .bind(id)
            .bind(ReviewStatus::Deleted.id())
            .bind(ReviewStatus::Approved.id())
            .fetch_optional(pool)
            .await
    }

    /// Record a failed deletion attempt. The candidate stays APPROVED.
    pub async fn record_deletion_error(
        pool: &PgPool,
        id: DbId,
        error: &str,
    ) -> Result<Option<MaintenanceCandidate>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_candidates SET deletion_error = $2
             WHERE id = $1 AND review_status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceCandidate>(&query)
            .bind(id)
            .bind(error)
            .bind(ReviewStatus::Approved.id())
            .fetch_optional(pool)
            .await
    }
}
