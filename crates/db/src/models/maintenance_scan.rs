//! Maintenance scan model.

use curator_core::status::ScanStatus;
use curator_core::types::{DbId, StatusId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `maintenance_scans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaintenanceScan {
    pub id: DbId,
    pub rule_id: DbId,
    pub status_id: StatusId,
    pub items_scanned: i64,
    pub items_flagged: i64,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub error_message: Option<String>,
    /// Admin user who started the scan; `None` for scheduled runs.
    pub triggered_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MaintenanceScan {
    pub fn status(&self) -> Option<ScanStatus> {
        ScanStatus::from_id(self.status_id)
    }
}

/// API view of a scan with its status name alongside the id.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    #[serde(flatten)]
    pub scan: MaintenanceScan,
    pub status: Option<ScanStatus>,
}

impl From<MaintenanceScan> for ScanResponse {
    fn from(scan: MaintenanceScan) -> Self {
        let status = scan.status();
        Self { scan, status }
    }
}
