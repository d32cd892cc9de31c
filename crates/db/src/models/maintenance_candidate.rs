//! Maintenance candidate model and DTOs.

use curator_core::media::MediaType;
use curator_core::status::ReviewStatus;
use curator_core::types::{DbId, StatusId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `maintenance_candidates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaintenanceCandidate {
    pub id: DbId,
    pub scan_id: DbId,
    pub rule_id: DbId,
    pub media_type: String,
    pub media_item_key: String,
    pub title: String,
    pub review_status_id: StatusId,
    pub flagged_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
    pub reviewed_by: Option<DbId>,
    /// Message from the most recent failed deletion attempt.
    pub deletion_error: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MaintenanceCandidate {
    pub fn review_status(&self) -> Option<ReviewStatus> {
        ReviewStatus::from_id(self.review_status_id)
    }
}

/// API view of a candidate with its review status name.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateResponse {
    #[serde(flatten)]
    pub candidate: MaintenanceCandidate,
    pub review_status: Option<ReviewStatus>,
}

impl From<MaintenanceCandidate> for CandidateResponse {
    fn from(candidate: MaintenanceCandidate) -> Self {
        let review_status = candidate.review_status();
        Self {
            candidate,
            review_status,
        }
    }
}

/// Insert payload produced by the scan executor for each match.
#[derive(Debug, Clone)]
pub struct NewCandidate {
    pub scan_id: DbId,
    pub rule_id: DbId,
    pub media_type: MediaType,
    pub media_item_key: String,
    pub title: String,
    pub review_status: ReviewStatus,
}

/// Query parameters for the candidate list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateListParams {
    pub review_status: Option<String>,
    pub media_type: Option<String>,
    pub rule_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Resolved candidate filter passed to the repository.
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    pub review_status: Option<ReviewStatus>,
    pub media_type: Option<MediaType>,
    pub rule_id: Option<DbId>,
    pub limit: i64,
    pub offset: i64,
}

/// Request body for bulk approve / reject.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkReviewRequest {
    pub ids: Vec<DbId>,
}
