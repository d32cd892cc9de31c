//! Maintenance criteria engine.
//!
//! A rule's criteria is a finite AND/OR tree whose leaves are atomic
//! predicates over the fields in [`fields`]. This module holds the tree
//! model; validation and evaluation live in their own submodules and have no
//! database dependencies.

pub mod evaluate;
pub mod fields;
pub mod validate;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::media::MediaType;

pub use evaluate::evaluate;
pub use validate::{validate, CriteriaViolation};

/// Comparison applied by a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    LessThanOrEqual,
    GreaterThanOrEqual,
    OlderThan,
    In,
    ContainsAny,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::LessThanOrEqual => "lessThanOrEqual",
            Self::GreaterThanOrEqual => "greaterThanOrEqual",
            Self::OlderThan => "olderThan",
            Self::In => "in",
            Self::ContainsAny => "containsAny",
        }
    }
}

/// How a group combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupOperator {
    And,
    Or,
}

/// Leaf predicate: `item[field] <operator> value [valueUnit]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: String,
    pub field: String,
    pub operator: Operator,
    pub value: Value,
    #[serde(
        rename = "valueUnit",
        alias = "value_unit",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub value_unit: Option<String>,
}

/// Interior node combining an ordered, non-empty list of children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub operator: GroupOperator,
    pub conditions: Vec<CriteriaNode>,
}

/// Either a leaf condition or a nested group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CriteriaNode {
    Condition(Condition),
    Group(Group),
}

/// The root of a rule's criteria is always a group.
pub type Criteria = Group;

impl Condition {
    pub fn new(id: &str, field: &str, operator: Operator, value: Value) -> Self {
        Self {
            id: id.to_string(),
            field: field.to_string(),
            operator,
            value,
            value_unit: None,
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.value_unit = Some(unit.to_string());
        self
    }
}

impl Group {
    pub fn new(id: &str, operator: GroupOperator, conditions: Vec<CriteriaNode>) -> Self {
        Self {
            id: id.to_string(),
            operator,
            conditions,
        }
    }

    /// Number of leaf conditions anywhere below this group.
    pub fn leaf_count(&self) -> usize {
        self.conditions
            .iter()
            .map(|node| match node {
                CriteriaNode::Condition(_) => 1,
                CriteriaNode::Group(g) => g.leaf_count(),
            })
            .sum()
    }

    /// Nesting depth, counting this group as 1.
    pub fn depth(&self) -> usize {
        1 + self
            .conditions
            .iter()
            .map(|node| match node {
                CriteriaNode::Condition(_) => 0,
                CriteriaNode::Group(g) => g.depth(),
            })
            .max()
            .unwrap_or(0)
    }
}

impl From<Condition> for CriteriaNode {
    fn from(value: Condition) -> Self {
        Self::Condition(value)
    }
}

impl From<Group> for CriteriaNode {
    fn from(value: Group) -> Self {
        Self::Group(value)
    }
}

/// Decode stored or submitted criteria JSON into the typed tree.
pub fn from_json(value: &Value) -> Result<Criteria, CoreError> {
    Criteria::deserialize(value)
        .map_err(|e| CoreError::Validation(format!("Malformed criteria: {e}")))
}

/// Decode criteria JSON and validate it for `media_type` in one step.
///
/// Used at the rule create/update boundary so that nothing invalid is ever
/// persisted.
pub fn parse_and_validate(value: &Value, media_type: MediaType) -> Result<Criteria, CoreError> {
    let criteria = from_json(value)?;
    validate(&criteria, media_type).map_err(|violations| validate::into_error(&violations))?;
    Ok(criteria)
}
