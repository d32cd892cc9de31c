//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: i64 = 50;
/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 200;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped with [`clamp_limit`] / [`clamp_offset`] before they
/// reach the repository layer.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// `(limit, offset)` after clamping with the default bounds.
    pub fn resolve(&self) -> (i64, i64) {
        (
            clamp_limit(self.limit, DEFAULT_LIMIT, MAX_LIMIT),
            clamp_offset(self.offset),
        )
    }
}

/// Clamp a requested page size into `1..=max`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Negative or missing offsets become zero.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
