//! Candidate review workflow.
//!
//! PENDING -> {APPROVED, REJECTED}; APPROVED -> DELETED once the deletion
//! executor confirms. A failed deletion leaves the candidate APPROVED with
//! the error recorded, and a later approve retries it.

use curator_core::catalog::AdapterError;
use curator_core::error::CoreError;
use curator_core::review::{
    plan_approval, validate_bulk_ids, validate_review_transition, ApprovePlan, BulkItemResult,
    BulkSummary,
};
use curator_core::status::ReviewStatus;
use curator_core::types::DbId;
use curator_db::models::maintenance_candidate::MaintenanceCandidate;
use curator_db::repositories::MaintenanceCandidateRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// A bulk review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

async fn load(state: &AppState, id: DbId) -> AppResult<(MaintenanceCandidate, ReviewStatus)> {
    let candidate = MaintenanceCandidateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "MaintenanceCandidate",
            id,
        })?;
    let status = candidate.review_status().ok_or_else(|| {
        CoreError::Internal(format!(
            "Candidate {id} has unknown review status id {}",
            candidate.review_status_id
        ))
    })?;
    Ok((candidate, status))
}

fn reviewed_concurrently(id: DbId) -> AppError {
    CoreError::Conflict(format!("Candidate {id} was reviewed concurrently")).into()
}

/// Approve a PENDING candidate and delete its media, or retry the deletion
/// of an APPROVED one. Returns the DELETED candidate.
pub async fn approve_candidate(
    state: &AppState,
    id: DbId,
    reviewer: DbId,
) -> AppResult<MaintenanceCandidate> {
    let (candidate, status) = load(state, id).await?;

    let candidate = match plan_approval(id, status)? {
        ApprovePlan::ApproveThenDelete => {
            let approved = MaintenanceCandidateRepo::approve(&state.pool, id, reviewer)
                .await?
                .ok_or_else(|| reviewed_concurrently(id))?;
            tracing::info!(candidate_id = id, reviewer, "Candidate approved");
            approved
        }
        ApprovePlan::RetryDeletion => {
            tracing::info!(candidate_id = id, reviewer, "Retrying deletion");
            candidate
        }
    };

    execute_deletion(state, &candidate).await
}

/// Reject a PENDING candidate. The media is kept.
pub async fn reject_candidate(
    state: &AppState,
    id: DbId,
    reviewer: DbId,
) -> AppResult<MaintenanceCandidate> {
    let (_, status) = load(state, id).await?;
    validate_review_transition(id, status, ReviewStatus::Rejected)?;

    let rejected = MaintenanceCandidateRepo::reject(&state.pool, id, reviewer)
        .await?
        .ok_or_else(|| reviewed_concurrently(id))?;
    tracing::info!(candidate_id = id, reviewer, "Candidate rejected");
    Ok(rejected)
}

/// Ask the deletion executor to remove an APPROVED candidate's media.
///
/// An item that is already gone upstream counts as deleted.
pub async fn execute_deletion(
    state: &AppState,
    candidate: &MaintenanceCandidate,
) -> AppResult<MaintenanceCandidate> {
    let timeout = state.config.scan.deletion_timeout();
    let key = candidate.media_item_key.as_str();

    let outcome = match tokio::time::timeout(timeout, state.deleter.delete(key)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(AdapterError::NotFound(_))) => {
            tracing::warn!(candidate_id = candidate.id, key, "Media already absent upstream");
            Ok(())
        }
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!(
            "Deletion timed out after {}s",
            state.config.scan.deletion_timeout_secs
        )),
    };

    match outcome {
        Ok(()) => {
            let deleted = MaintenanceCandidateRepo::mark_deleted(&state.pool, candidate.id)
                .await?
                .ok_or_else(|| {
                    CoreError::Conflict(format!(
                        "Candidate {} is no longer approved",
                        candidate.id
                    ))
                })?;
            tracing::info!(candidate_id = candidate.id, key, "Media deleted");
            Ok(deleted)
        }
        Err(message) => {
            tracing::warn!(candidate_id = candidate.id, key, error = %message, "Deletion failed");
            MaintenanceCandidateRepo::record_deletion_error(&state.pool, candidate.id, &message)
                .await?;
            Err(CoreError::External(format!("Deletion of '{key}' failed: {message}")).into())
        }
    }
}

/// Apply one decision to each id independently.
pub async fn bulk_review(
    state: &AppState,
    ids: &[DbId],
    reviewer: DbId,
    decision: Decision,
) -> AppResult<Vec<BulkItemResult>> {
    validate_bulk_ids(ids)?;

    let mut results = Vec::with_capacity(ids.len());
    for &id in ids {
        let result = match decision {
            Decision::Approve => approve_candidate(state, id, reviewer)
                .await
                .map(|_| ReviewStatus::Deleted),
            Decision::Reject => reject_candidate(state, id, reviewer)
                .await
                .map(|_| ReviewStatus::Rejected),
        };
        results.push(match result {
            Ok(status) => BulkItemResult::ok(id, status),
            Err(e) => BulkItemResult::failed(id, &e),
        });
    }

    let summary = BulkSummary::from_results(&results);
    tracing::info!(
        ?decision,
        reviewer,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Bulk review processed",
    );
    Ok(results)
}

/// Delete every APPROVED candidate of a scan. Used after AUTO_DELETE scans.
pub async fn delete_approved_for_scan(state: &AppState, scan_id: DbId) -> AppResult<BulkSummary> {
    let approved = MaintenanceCandidateRepo::list_approved_for_scan(&state.pool, scan_id).await?;

    let mut summary = BulkSummary::default();
    for candidate in &approved {
        match execute_deletion(state, candidate).await {
            Ok(_) => summary.succeeded += 1,
            Err(AppError::Core(CoreError::External(_) | CoreError::Conflict(_))) => {
                summary.failed += 1
            }
            Err(e) => return Err(e),
        }
    }

    if !approved.is_empty() {
        tracing::info!(
            scan_id,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Auto-delete pass finished",
        );
    }
    Ok(summary)
}
