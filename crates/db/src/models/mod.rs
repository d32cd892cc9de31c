//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches, where the
//!   entity is mutable

pub mod maintenance_candidate;
pub mod maintenance_rule;
pub mod maintenance_scan;
pub mod media_feedback;
