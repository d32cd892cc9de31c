//! Maintenance engine.
//!
//! Contains the scan executor that evaluates a rule against the catalog and
//! records candidates, plus the review workflow that approves, rejects and
//! deletes those candidates.

pub mod review;
pub mod scan_executor;
