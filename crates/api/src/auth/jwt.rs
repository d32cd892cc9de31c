//! Bearer-token verification.
//!
//! Access tokens are minted by the identity service in front of the admin
//! UI and signed with a shared HS256 secret. Curator only reads the subject
//! and role. [`JwtConfig::issue`] mints tokens for local tooling and tests.

use curator_core::types::DbId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::env_or;

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id in the identity service.
    pub sub: DbId,
    /// `"admin"` or `"user"`.
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Why a presented token was refused.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(err.to_string()),
        }
    }
}

/// Shared-secret settings for issuing and verifying access tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of tokens minted by [`JwtConfig::issue`].
    pub access_token_expiry_mins: i64,
    /// Clock skew tolerated when checking `exp`.
    pub leeway_secs: u64,
}

impl JwtConfig {
    /// | Env Var                  | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `JWT_SECRET`             | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS` | no       | `15`    |
    /// | `JWT_LEEWAY_SECS`        | no       | `30`    |
    ///
    /// Panics on a missing or empty secret and on unparseable numbers.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set and non-empty");

        Self {
            secret,
            access_token_expiry_mins: env_or("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS),
            leeway_secs: env_or("JWT_LEEWAY_SECS", DEFAULT_LEEWAY_SECS),
        }
    }

    /// Mint a token for `user_id` with `role`, valid for the configured expiry.
    pub fn issue(&self, user_id: DbId, role: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            role: role.to_string(),
            exp: iat + self.access_token_expiry_mins * 60,
            iat,
            jti: Uuid::new_v4().to_string(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Check the signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 15,
            leeway_secs: 0,
        }
    }

    #[test]
    fn issued_token_verifies() {
        let config = config("curator-test-secret");
        let claims = config.verify(&config.issue(7, "admin").unwrap()).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let config = JwtConfig {
            access_token_expiry_mins: -10,
            ..config("curator-test-secret")
        };
        let token = config.issue(1, "user").unwrap();
        assert_matches!(config.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn foreign_secret_is_invalid() {
        let token = config("secret-alpha").issue(1, "user").unwrap();
        assert_matches!(
            config("secret-bravo").verify(&token),
            Err(TokenError::Invalid(_))
        );
        assert_matches!(config("secret-alpha").verify("garbage"), Err(TokenError::Invalid(_)));
    }
}
