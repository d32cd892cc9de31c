//! Handlers for reviewing maintenance candidates.

use axum::extract::{Path, Query, State};
use axum::Json;
use curator_core::error::CoreError;
use curator_core::media::MediaType;
use curator_core::review::{BulkItemResult, BulkSummary};
use curator_core::status::ReviewStatus;
use curator_core::types::DbId;
use curator_db::models::maintenance_candidate::{
    BulkReviewRequest, CandidateFilter, CandidateListParams, CandidateResponse,
};
use curator_db::repositories::MaintenanceCandidateRepo;
use serde::Serialize;

use crate::engine::review::{self, Decision};
use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for bulk approve / reject.
#[derive(Debug, Serialize)]
pub struct BulkReviewResponse {
    pub results: Vec<BulkItemResult>,
    pub summary: BulkSummary,
}

fn resolve_filter(params: &CandidateListParams) -> Result<CandidateFilter, CoreError> {
    let review_status = params
        .review_status
        .as_deref()
        .map(|s| {
            ReviewStatus::parse(s).ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid review_status '{s}'. Must be one of: {}",
                    ReviewStatus::ALL
                        .iter()
                        .map(|r| r.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
        })
        .transpose()?;
    let media_type = params
        .media_type
        .as_deref()
        .map(str::parse::<MediaType>)
        .transpose()?;

    Ok(CandidateFilter {
        review_status,
        media_type,
        rule_id: params.rule_id,
        limit: clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        offset: clamp_offset(params.offset),
    })
}

/// GET /api/v1/admin/maintenance/candidates?review_status=&media_type=&rule_id=&limit=&offset=
pub async fn list_candidates(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<CandidateListParams>,
) -> AppResult<Json<DataResponse<Vec<CandidateResponse>>>> {
    let filter = resolve_filter(&params)?;
    let candidates = MaintenanceCandidateRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse::new(
        candidates.into_iter().map(CandidateResponse::from).collect(),
    )))
}

/// POST /api/v1/admin/maintenance/candidates/{id}/approve
///
/// Approves and deletes. On APPROVED candidates this retries a failed
/// deletion. A deletion failure responds 502 and leaves the candidate
/// APPROVED with `deletion_error` set.
pub async fn approve_candidate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CandidateResponse>>> {
    let candidate = review::approve_candidate(&state, id, admin.user_id).await?;
    Ok(Json(DataResponse::new(candidate.into())))
}

/// POST /api/v1/admin/maintenance/candidates/{id}/reject
pub async fn reject_candidate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CandidateResponse>>> {
    let candidate = review::reject_candidate(&state, id, admin.user_id).await?;
    Ok(Json(DataResponse::new(candidate.into())))
}

/// POST /api/v1/admin/maintenance/candidates/bulk-approve
pub async fn bulk_approve(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<BulkReviewRequest>,
) -> AppResult<Json<DataResponse<BulkReviewResponse>>> {
    bulk(&state, &body.ids, admin.user_id, Decision::Approve).await
}

/// POST /api/v1/admin/maintenance/candidates/bulk-reject
pub async fn bulk_reject(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<BulkReviewRequest>,
) -> AppResult<Json<DataResponse<BulkReviewResponse>>> {
    bulk(&state, &body.ids, admin.user_id, Decision::Reject).await
}

async fn bulk(
    state: &AppState,
    ids: &[DbId],
    reviewer: DbId,
    decision: Decision,
) -> AppResult<Json<DataResponse<BulkReviewResponse>>> {
    let results = review::bulk_review(state, ids, reviewer, decision).await?;
    let summary = BulkSummary::from_results(&results);
    Ok(Json(DataResponse::new(BulkReviewResponse { results, summary })))
}
