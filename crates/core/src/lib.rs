//! Curator domain core.
//!
//! Pure logic shared by the database and API layers, with no I/O of its own:
//!
//! - [`criteria`]: rule criteria trees, the field registry, validation and
//!   evaluation.
//! - [`scan`] / [`review`]: scan lifecycle and candidate review state machines.
//! - [`feedback`]: mark and intent types plus the deletion-score heuristic.
//! - [`schedule`]: rule schedule expressions.
//! - [`catalog`]: the adapter traits through which the engine reaches the
//!   media catalog.

pub mod catalog;
pub mod criteria;
pub mod error;
pub mod feedback;
pub mod media;
pub mod review;
pub mod roles;
pub mod scan;
pub mod schedule;
pub mod status;
pub mod types;
