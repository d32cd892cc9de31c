//! Scan lifecycle rules and per-chunk evaluation tallies.
//!
//! A scan moves `PENDING -> RUNNING -> {COMPLETED, FAILED, CANCELLED}`.
//! `PENDING` may also go straight to `FAILED` or `CANCELLED` when the run
//! never starts. Terminal scans are immutable.

use std::iter::Sum;
use std::ops::Add;

use crate::error::CoreError;
use crate::status::ScanStatus;
use crate::types::DbId;

/// Maximum length of a stored scan error message.
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 2_000;

impl ScanStatus {
    /// No further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Counts towards the one-active-scan-per-rule limit.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    pub fn can_transition_to(self, next: ScanStatus) -> bool {
        use ScanStatus::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Cancelled)
        )
    }
}

/// Check a scan transition, producing a conflict error when it is illegal.
pub fn validate_scan_transition(
    scan_id: DbId,
    from: ScanStatus,
    to: ScanStatus,
) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Scan {scan_id} cannot move from {from} to {to}"
        )))
    }
}

/// Truncate an error message to the storable length on a char boundary.
pub fn truncate_error_message(message: &str) -> String {
    if message.len() <= MAX_ERROR_MESSAGE_LENGTH {
        return message.to_string();
    }
    let mut end = MAX_ERROR_MESSAGE_LENGTH;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message[..end].to_string()
}

/// A catalog item that matched a rule during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedItem {
    pub key: String,
    pub title: String,
}

/// Result of evaluating one chunk of items. Chunks combine with `+`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanTally {
    pub scanned: i64,
    pub flagged: Vec<FlaggedItem>,
}

impl Add for ScanTally {
    type Output = ScanTally;

    fn add(mut self, rhs: ScanTally) -> ScanTally {
        self.scanned += rhs.scanned;
        self.flagged.extend(rhs.flagged);
        self
    }
}

impl Sum for ScanTally {
    fn sum<I: Iterator<Item = ScanTally>>(iter: I) -> ScanTally {
        iter.fold(ScanTally::default(), Add::add)
    }
}
