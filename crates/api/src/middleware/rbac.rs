//! Role gates layered on [`AuthUser`].
//!
//! Maintenance and feedback-summary routes take [`RequireAdmin`]; the
//! per-user mark and intent routes take [`RequireAuth`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use curator_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated caller holding the `admin` role. Other roles get 403.
pub struct RequireAdmin(pub AuthUser);

/// Any authenticated caller.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::debug!(user_id = user.user_id, role = %user.role, "Admin route refused");
            return Err(CoreError::Forbidden("Admin role required".into()).into());
        }
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_request_parts(parts, state).await.map(Self)
    }
}
