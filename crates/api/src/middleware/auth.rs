//! Caller identity from the `Authorization: Bearer <jwt>` header.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use curator_core::error::CoreError;
use curator_core::roles::ROLE_ADMIN;
use curator_core::types::DbId;

use crate::auth::jwt::TokenError;
use crate::error::AppError;
use crate::state::AppState;

/// The verified caller of a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

fn unauthorized(message: &str) -> AppError {
    CoreError::Unauthorized(message.to_string()).into()
}

/// Pull the raw token out of the `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| unauthorized("Authorization header is not valid ASCII"))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| unauthorized("Expected Authorization: Bearer <token>"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.config.jwt.verify(token).map_err(|e| match e {
            TokenError::Expired => unauthorized("Token has expired"),
            TokenError::Invalid(reason) => {
                tracing::debug!(%reason, "Rejected bearer token");
                unauthorized("Invalid token")
            }
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
