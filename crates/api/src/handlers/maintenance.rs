//! Handlers for maintenance rules, scans and the field registry.
//!
//! All endpoints require the `admin` role. Criteria and schedules are
//! validated here, before anything is persisted.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use curator_core::criteria::fields::{self, FieldDescriptor};
use curator_core::criteria::parse_and_validate;
use curator_core::error::CoreError;
use curator_core::media::MediaType;
use curator_core::schedule::validate_schedule;
use curator_core::types::DbId;
use curator_db::models::maintenance_rule::{
    CreateMaintenanceRule, MaintenanceRule, UpdateMaintenanceRule,
};
use curator_db::models::maintenance_scan::ScanResponse;
use curator_db::repositories::{MaintenanceRuleRepo, MaintenanceScanRepo};
use serde::Deserialize;
use validator::Validate;

use crate::engine::scan_executor;
use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn rule_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "MaintenanceRule",
        id,
    }
}

// ── Rules ───────────────────────────────────────────────────────────

/// GET /api/v1/admin/maintenance/rules
pub async fn list_rules(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<MaintenanceRule>>>> {
    let rules = MaintenanceRuleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(rules)))
}

/// POST /api/v1/admin/maintenance/rules
///
/// Rejects malformed criteria, fields that do not apply to the rule's media
/// type, out-of-range values and unparseable schedules with 400.
pub async fn create_rule(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateMaintenanceRule>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    parse_and_validate(&input.criteria, input.media_type)?;
    validate_schedule(input.schedule.as_deref())?;

    let rule = MaintenanceRuleRepo::create(&state.pool, &input).await?;
    tracing::info!(
        rule_id = rule.id,
        name = %rule.name,
        admin_id = admin.user_id,
        "Maintenance rule created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse::new(rule))))
}

/// GET /api/v1/admin/maintenance/rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MaintenanceRule>>> {
    let rule = MaintenanceRuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| rule_not_found(id))?;
    Ok(Json(DataResponse::new(rule)))
}

/// PUT /api/v1/admin/maintenance/rules/{id}
///
/// Partial update. When the media type or the criteria change, the
/// resulting pair is re-validated as a whole.
pub async fn update_rule(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMaintenanceRule>,
) -> AppResult<Json<DataResponse<MaintenanceRule>>> {
    input.validate()?;
    let existing = MaintenanceRuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| rule_not_found(id))?;

    if input.media_type.is_some() || input.criteria.is_some() {
        let media_type = match input.media_type {
            Some(media_type) => media_type,
            None => existing.target()?,
        };
        let criteria = input.criteria.as_ref().unwrap_or(&existing.criteria);
        parse_and_validate(criteria, media_type)?;
    }
    validate_schedule(input.schedule.as_deref())?;

    let rule = MaintenanceRuleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| rule_not_found(id))?;
    tracing::info!(rule_id = id, admin_id = admin.user_id, "Maintenance rule updated");
    Ok(Json(DataResponse::new(rule)))
}

/// DELETE /api/v1/admin/maintenance/rules/{id}
///
/// Removes the rule together with its scans and candidates. Disabling is
/// usually preferable.
pub async fn delete_rule(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !MaintenanceRuleRepo::delete(&state.pool, id).await? {
        return Err(rule_not_found(id).into());
    }
    tracing::info!(rule_id = id, admin_id = admin.user_id, "Maintenance rule deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/maintenance/rules/{id}/toggle
pub async fn toggle_rule(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MaintenanceRule>>> {
    let rule = MaintenanceRuleRepo::toggle_enabled(&state.pool, id)
        .await?
        .ok_or_else(|| rule_not_found(id))?;
    tracing::info!(
        rule_id = id,
        enabled = rule.enabled,
        admin_id = admin.user_id,
        "Maintenance rule toggled",
    );
    Ok(Json(DataResponse::new(rule)))
}

// ── Scans ───────────────────────────────────────────────────────────

/// POST /api/v1/admin/maintenance/rules/{id}/scans
///
/// Creates a PENDING scan and runs it in the background. Responds 202 with
/// the scan; 409 if the rule already has an active scan.
pub async fn trigger_manual_scan(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (rule, scan) = scan_executor::trigger_scan(&state, id, Some(admin.user_id)).await?;
    scan_executor::spawn_scan(&state, rule, scan.id);
    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse::new(ScanResponse::from(scan))),
    ))
}

/// GET /api/v1/admin/maintenance/rules/{id}/scans
pub async fn list_scans(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ScanResponse>>>> {
    if MaintenanceRuleRepo::find_by_id(&state.pool, id)
        .await?
        .is_none()
    {
        return Err(rule_not_found(id).into());
    }

    let (limit, offset) = params.resolve();
    let scans = MaintenanceScanRepo::list_for_rule(&state.pool, id, limit, offset).await?;
    Ok(Json(DataResponse::new(
        scans.into_iter().map(ScanResponse::from).collect(),
    )))
}

/// GET /api/v1/admin/maintenance/scans/{id}
pub async fn get_scan(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ScanResponse>>> {
    let scan = MaintenanceScanRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "MaintenanceScan",
            id,
        })?;
    Ok(Json(DataResponse::new(ScanResponse::from(scan))))
}

/// POST /api/v1/admin/maintenance/scans/{id}/cancel
///
/// 409 if the scan already finished.
pub async fn cancel_scan(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ScanResponse>>> {
    let scan = scan_executor::cancel_scan(&state, id).await?;
    tracing::info!(scan_id = id, admin_id = admin.user_id, "Scan cancel requested");
    Ok(Json(DataResponse::new(ScanResponse::from(scan))))
}

// ── Field registry ──────────────────────────────────────────────────

/// Query parameters for the field registry.
#[derive(Debug, Deserialize)]
pub struct FieldsParams {
    pub media_type: Option<MediaType>,
}

/// GET /api/v1/admin/maintenance/fields?media_type=
///
/// Fields usable for the given media type, or every field when omitted.
pub async fn list_fields(
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<FieldsParams>,
) -> AppResult<Json<DataResponse<Vec<&'static FieldDescriptor>>>> {
    let fields = match params.media_type {
        Some(media_type) => fields::list_fields(media_type),
        None => fields::FIELDS.iter().collect(),
    };
    Ok(Json(DataResponse::new(fields)))
}
