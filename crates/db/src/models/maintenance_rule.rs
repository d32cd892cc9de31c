//! Maintenance rule model and DTOs.

use curator_core::criteria::{self, Criteria};
use curator_core::error::CoreError;
use curator_core::media::{ActionType, MediaType};
use curator_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `maintenance_rules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaintenanceRule {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub media_type: String,
    pub criteria: serde_json::Value,
    pub action_type: String,
    pub schedule: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MaintenanceRule {
    /// The rule's target media type.
    pub fn target(&self) -> Result<MediaType, CoreError> {
        self.media_type.parse()
    }

    pub fn action(&self) -> Result<ActionType, CoreError> {
        self.action_type.parse()
    }

    /// Decode the stored criteria tree.
    pub fn parsed_criteria(&self) -> Result<Criteria, CoreError> {
        criteria::from_json(&self.criteria)
    }
}

/// DTO for creating a new rule.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMaintenanceRule {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub media_type: MediaType,
    pub criteria: serde_json::Value,
    pub action_type: ActionType,
    pub schedule: Option<String>,
}

/// DTO for patching a rule. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMaintenanceRule {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub media_type: Option<MediaType>,
    pub criteria: Option<serde_json::Value>,
    pub action_type: Option<ActionType>,
    pub schedule: Option<String>,
}
