//! Role name constants shared by the auth layer.

/// Full administrative access, required for every maintenance mutation.
pub const ROLE_ADMIN: &str = "admin";

/// Regular library user. May leave marks and watch intents.
pub const ROLE_USER: &str = "user";
