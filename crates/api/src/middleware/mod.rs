//! Request extractors for authentication ([`auth`]) and role checks ([`rbac`]).

pub mod auth;
pub mod rbac;
