//! Candidate review state machine.
//!
//! `PENDING -> {APPROVED, REJECTED}` and `APPROVED -> DELETED`. Rejected and
//! deleted candidates are final; a rejected item can only come back as a new
//! candidate from a later scan.

use serde::Serialize;

use crate::error::CoreError;
use crate::media::ActionType;
use crate::status::ReviewStatus;
use crate::types::DbId;

/// Upper bound on ids accepted by one bulk review request.
pub const MAX_BULK_IDS: usize = 500;

impl ReviewStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Deleted)
    }

    pub fn can_transition_to(self, next: ReviewStatus) -> bool {
        use ReviewStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Deleted)
        )
    }
}

/// Status a freshly flagged candidate starts in.
pub fn initial_status(action: ActionType) -> ReviewStatus {
    match action {
        ActionType::FlagForReview => ReviewStatus::Pending,
        ActionType::AutoDelete => ReviewStatus::Approved,
    }
}

/// Check a review transition, producing a conflict error when it is illegal.
pub fn validate_review_transition(
    candidate_id: DbId,
    from: ReviewStatus,
    to: ReviewStatus,
) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Candidate {candidate_id} is {from} and cannot become {to}"
        )))
    }
}

/// What an approve request should do for a candidate in `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovePlan {
    /// Approve, then attempt deletion.
    ApproveThenDelete,
    /// Already approved; retry the deletion.
    RetryDeletion,
}

pub fn plan_approval(candidate_id: DbId, status: ReviewStatus) -> Result<ApprovePlan, CoreError> {
    match status {
        ReviewStatus::Pending => Ok(ApprovePlan::ApproveThenDelete),
        ReviewStatus::Approved => Ok(ApprovePlan::RetryDeletion),
        other => Err(CoreError::Conflict(format!(
            "Candidate {candidate_id} is {other} and cannot be approved"
        ))),
    }
}

/// Validate the id list of a bulk review request.
pub fn validate_bulk_ids(ids: &[DbId]) -> Result<(), CoreError> {
    if ids.is_empty() {
        return Err(CoreError::Validation(
            "At least one candidate id is required".to_string(),
        ));
    }
    if ids.len() > MAX_BULK_IDS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_BULK_IDS} candidates can be reviewed at once"
        )));
    }
    Ok(())
}

/// Outcome of one id within a bulk review request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkItemResult {
    pub id: DbId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReviewStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkItemResult {
    pub fn ok(id: DbId, status: ReviewStatus) -> Self {
        Self {
            id,
            success: true,
            status: Some(status),
            error: None,
        }
    }

    pub fn failed(id: DbId, error: &dyn std::fmt::Display) -> Self {
        Self {
            id,
            success: false,
            status: None,
            error: Some(error.to_string()),
        }
    }
}

/// Aggregate counts over a bulk response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BulkSummary {
    pub fn from_results(results: &[BulkItemResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            succeeded,
            failed: results.len() - succeeded,
        }
    }
}
