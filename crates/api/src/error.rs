//! HTTP error mapping.
//!
//! Every handler returns [`AppResult`]. Errors render as
//! `{ "error": <message>, "code": <CODE> }`:
//!
//! ```text
//! Validation        400 VALIDATION_ERROR
//! Unauthorized      401 UNAUTHORIZED
//! Forbidden         403 FORBIDDEN
//! NotFound          404 NOT_FOUND
//! Conflict          409 CONFLICT       (also unique violations on uq_* constraints)
//! External          502 EXTERNAL_ERROR (catalog / deletion collaborator failed)
//! Internal          500 INTERNAL_ERROR (message withheld)
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use curator_core::error::CoreError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

const WITHHELD: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(err) => classify_core_error(err),
            AppError::Database(err) => classify_sqlx_error(err),
        };
        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::External(msg) => {
            tracing::warn!(error = %msg, "Collaborator call failed");
            (StatusCode::BAD_GATEWAY, "EXTERNAL_ERROR", msg.clone())
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                WITHHELD.to_string(),
            )
        }
    }
}

/// Missing rows are 404 and unique violations on `uq_*` constraints are 409.
/// Anything else is logged and withheld.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if let sqlx::Error::RowNotFound = err {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        );
    }

    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            if let Some(constraint) = db_err.constraint().filter(|c| c.starts_with("uq_")) {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
        }
    }

    tracing::error!(error = %err, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        WITHHELD.to_string(),
    )
}
