//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod maintenance_candidate_repo;
pub mod maintenance_rule_repo;
pub mod maintenance_scan_repo;
pub mod user_media_mark_repo;
pub mod user_watch_intent_repo;

pub use maintenance_candidate_repo::MaintenanceCandidateRepo;
pub use maintenance_rule_repo::MaintenanceRuleRepo;
pub use maintenance_scan_repo::MaintenanceScanRepo;
pub use user_media_mark_repo::UserMediaMarkRepo;
pub use user_watch_intent_repo::UserWatchIntentRepo;
