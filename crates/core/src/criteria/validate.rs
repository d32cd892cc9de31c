//! Structural and semantic validation of criteria trees.
//!
//! Runs at rule create/update time. Every violation in the tree is collected
//! rather than stopping at the first, so an editor can highlight all of them.

use serde::Serialize;
use serde_json::Value;

use super::fields::{self, FieldDescriptor, Unit, ValueType};
use super::{Condition, Criteria, CriteriaNode, Group, Operator};
use crate::error::CoreError;
use crate::media::MediaType;

/// Maximum group nesting depth accepted for a rule.
pub const MAX_DEPTH: usize = 16;

/// A single problem found in a criteria tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriteriaViolation {
    /// Id of the group or condition the problem was found on.
    pub node_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

/// Validate a criteria tree for rules targeting `media_type`.
pub fn validate(criteria: &Criteria, media_type: MediaType) -> Result<(), Vec<CriteriaViolation>> {
    let mut violations = Vec::new();
    validate_group(criteria, media_type, 1, &mut violations);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Collapse violations into a single [`CoreError::Validation`].
pub fn into_error(violations: &[CriteriaViolation]) -> CoreError {
    let joined = violations
        .iter()
        .map(|v| format!("[{}] {}", v.node_id, v.message))
        .collect::<Vec<_>>()
        .join("; ");
    CoreError::Validation(format!("Invalid criteria: {joined}"))
}

fn validate_group(
    group: &Group,
    media_type: MediaType,
    depth: usize,
    out: &mut Vec<CriteriaViolation>,
) {
    if group.id.trim().is_empty() {
        out.push(group_violation(group, "Group id must not be empty"));
    }
    if depth > MAX_DEPTH {
        out.push(group_violation(
            group,
            &format!("Groups may be nested at most {MAX_DEPTH} levels deep"),
        ));
        return;
    }
    // An empty group has no defined truth value.
    if group.conditions.is_empty() {
        out.push(group_violation(group, "Group must contain at least one condition"));
    }

    for node in &group.conditions {
        match node {
            CriteriaNode::Condition(c) => validate_condition(c, media_type, out),
            CriteriaNode::Group(g) => validate_group(g, media_type, depth + 1, out),
        }
    }
}

fn validate_condition(condition: &Condition, media_type: MediaType, out: &mut Vec<CriteriaViolation>) {
    if condition.id.trim().is_empty() {
        out.push(condition_violation(condition, "Condition id must not be empty"));
    }

    let Some(descriptor) = fields::describe(&condition.field) else {
        out.push(condition_violation(
            condition,
            &format!("Unknown field '{}'", condition.field),
        ));
        return;
    };

    if !descriptor.applies_to(media_type) {
        out.push(condition_violation(
            condition,
            &format!(
                "Field '{}' does not apply to {media_type} rules",
                descriptor.name
            ),
        ));
    }

    if !descriptor.supports(condition.operator) {
        let allowed = descriptor
            .operators
            .iter()
            .map(|op| op.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        out.push(condition_violation(
            condition,
            &format!(
                "Operator '{}' is not supported for field '{}'. Allowed: {allowed}",
                condition.operator.as_str(),
                descriptor.name
            ),
        ));
        return;
    }

    let unit = match check_unit(condition, descriptor) {
        Ok(unit) => unit,
        Err(message) => {
            out.push(condition_violation(condition, &message));
            return;
        }
    };

    if let Err(message) = check_value(condition, descriptor, unit) {
        out.push(condition_violation(condition, &message));
    }
}

fn check_unit(condition: &Condition, descriptor: &FieldDescriptor) -> Result<Option<Unit>, String> {
    match condition.value_unit.as_deref() {
        None if descriptor.unit_required => Err(format!(
            "Field '{}' requires a unit ({})",
            descriptor.name,
            unit_list(descriptor)
        )),
        None => Ok(None),
        Some(raw) if descriptor.units.is_empty() => Err(format!(
            "Field '{}' does not take a unit, got '{raw}'",
            descriptor.name
        )),
        Some(raw) => match Unit::parse(raw) {
            Some(unit) if descriptor.units.contains(&unit) => Ok(Some(unit)),
            _ => Err(format!(
                "Unit '{raw}' is not valid for field '{}'. Allowed: {}",
                descriptor.name,
                unit_list(descriptor)
            )),
        },
    }
}

fn check_value(
    condition: &Condition,
    descriptor: &FieldDescriptor,
    unit: Option<Unit>,
) -> Result<(), String> {
    let value = &condition.value;
    match (condition.operator, descriptor.value_type) {
        (Operator::Equals, ValueType::Boolean) => expect(value.is_boolean(), "a boolean"),
        (Operator::Equals, ValueType::String) => expect(value.is_string(), "a string"),
        (_, ValueType::Ordinal(ranks)) => match value.as_str() {
            Some(label) if fields::ordinal_rank(ranks, label).is_some() => Ok(()),
            _ => Err(format!("Value must be one of: {}", ranks.join(", "))),
        },
        (Operator::OlderThan, _) => match value.as_f64() {
            Some(n) if n.is_finite() && n >= 0.0 => Ok(()),
            _ => Err("Value must be a non-negative number".to_string()),
        },
        (Operator::In, _) | (Operator::ContainsAny, _) => match value.as_array() {
            Some(items) if items.is_empty() => Err("Value list must not be empty".to_string()),
            Some(items) if items.iter().all(|v| v.is_string() || v.is_number()) => Ok(()),
            _ => Err("Value must be a list of strings".to_string()),
        },
        (_, ValueType::Number) | (_, ValueType::Bytes) => {
            let Some(n) = value.as_f64().filter(|n| n.is_finite()) else {
                return Err("Value must be a number".to_string());
            };
            check_range(descriptor, n * unit.map_or(1.0, Unit::factor))
        }
        _ => Err(format!(
            "Operator '{}' cannot be applied to field '{}'",
            condition.operator.as_str(),
            descriptor.name
        )),
    }
}

/// Semantic range check (e.g. rating within 0..=10, non-negative counts).
fn check_range(descriptor: &FieldDescriptor, canonical: f64) -> Result<(), String> {
    match descriptor.range {
        Some((min, max)) if canonical < min || canonical > max => {
            if max == f64::MAX {
                Err(format!("Value for '{}' must be at least {min}", descriptor.name))
            } else {
                Err(format!(
                    "Value for '{}' must be between {min} and {max}",
                    descriptor.name
                ))
            }
        }
        _ => Ok(()),
    }
}

fn expect(ok: bool, what: &str) -> Result<(), String> {
    if ok {
        Ok(())
    } else {
        Err(format!("Value must be {what}"))
    }
}

fn unit_list(descriptor: &FieldDescriptor) -> String {
    descriptor
        .units
        .iter()
        .map(|u| u.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn group_violation(group: &Group, message: &str) -> CriteriaViolation {
    CriteriaViolation {
        node_id: group.id.clone(),
        field: None,
        message: message.to_string(),
    }
}

fn condition_violation(condition: &Condition, message: &str) -> CriteriaViolation {
    CriteriaViolation {
        node_id: condition.id.clone(),
        field: Some(condition.field.clone()),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::GroupOperator;
    use serde_json::json;

    fn and(conditions: Vec<CriteriaNode>) -> Group {
        Group::new("root", GroupOperator::And, conditions)
    }

    fn cond(field: &str, operator: Operator, value: Value) -> Condition {
        Condition::new("c1", field, operator, value)
    }

    fn single(condition: Condition) -> Group {
        and(vec![condition.into()])
    }

    fn messages(result: Result<(), Vec<CriteriaViolation>>) -> Vec<String> {
        result.unwrap_err().into_iter().map(|v| v.message).collect()
    }

    #[test]
    fn accepts_typical_rule() {
        let criteria = and(vec![
            cond("neverWatched", Operator::Equals, json!(true)).into(),
            Condition::new("c2", "addedAt", Operator::OlderThan, json!(90))
                .with_unit("days")
                .into(),
        ]);
        assert!(validate(&criteria, MediaType::Movie).is_ok());
    }

    #[test]
    fn rejects_empty_root_group() {
        let msgs = messages(validate(&and(vec![]), MediaType::Movie));
        assert!(msgs[0].contains("at least one condition"));
    }

    #[test]
    fn rejects_empty_nested_group() {
        let criteria = and(vec![
            cond("neverWatched", Operator::Equals, json!(true)).into(),
            Group::new("inner", GroupOperator::Or, vec![]).into(),
        ]);
        let violations = validate(&criteria, MediaType::Movie).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].node_id, "inner");
    }

    #[test]
    fn rejects_unknown_field() {
        let msgs = messages(validate(
            &single(cond("watchTime", Operator::Equals, json!(1))),
            MediaType::Movie,
        ));
        assert!(msgs[0].contains("Unknown field"));
    }

    #[test]
    fn rejects_field_not_applicable_to_media_type() {
        let criteria = single(cond("seasonNumber", Operator::Equals, json!(1)));
        assert!(validate(&criteria, MediaType::Episode).is_ok());
        let msgs = messages(validate(&criteria, MediaType::Movie));
        assert!(msgs[0].contains("does not apply to MOVIE"));
    }

    #[test]
    fn rejects_unsupported_operator() {
        let msgs = messages(validate(
            &single(cond("neverWatched", Operator::OlderThan, json!(3))),
            MediaType::Movie,
        ));
        assert!(msgs[0].contains("not supported"));
    }

    #[test]
    fn rejects_unrecognized_temporal_unit() {
        let criteria = single(
            cond("lastWatchedAt", Operator::OlderThan, json!(2)).with_unit("weeks"),
        );
        let msgs = messages(validate(&criteria, MediaType::Movie));
        assert!(msgs[0].contains("Unit 'weeks'"));
    }

    #[test]
    fn requires_unit_for_temporal_fields() {
        let criteria = single(cond("addedAt", Operator::OlderThan, json!(30)));
        let msgs = messages(validate(&criteria, MediaType::Movie));
        assert!(msgs[0].contains("requires a unit"));
    }

    #[test]
    fn rejects_unit_on_unitless_field() {
        let criteria =
            single(cond("playCount", Operator::LessThanOrEqual, json!(1)).with_unit("days"));
        let msgs = messages(validate(&criteria, MediaType::Movie));
        assert!(msgs[0].contains("does not take a unit"));
    }

    #[test]
    fn file_size_unit_is_optional() {
        let bytes = single(cond("fileSize", Operator::GreaterThanOrEqual, json!(0)));
        let gigabytes =
            single(cond("fileSize", Operator::GreaterThanOrEqual, json!(4)).with_unit("GB"));
        assert!(validate(&bytes, MediaType::Movie).is_ok());
        assert!(validate(&gigabytes, MediaType::Movie).is_ok());
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        for value in [json!(0), json!(10), json!(7.5)] {
            let criteria = single(cond("rating", Operator::GreaterThanOrEqual, value));
            assert!(validate(&criteria, MediaType::Movie).is_ok());
        }
        for value in [json!(-0.1), json!(10.5)] {
            let criteria = single(cond("rating", Operator::LessThanOrEqual, value));
            let msgs = messages(validate(&criteria, MediaType::Movie));
            assert!(msgs[0].contains("between 0 and 10"));
        }
    }

    #[test]
    fn rejects_negative_play_count() {
        let criteria = single(cond("playCount", Operator::LessThanOrEqual, json!(-1)));
        let msgs = messages(validate(&criteria, MediaType::Movie));
        assert!(msgs[0].contains("at least 0"));
    }

    #[test]
    fn rejects_mistyped_values() {
        let cases = [
            cond("neverWatched", Operator::Equals, json!("yes")),
            cond("rating", Operator::GreaterThanOrEqual, json!("high")),
            cond("resolution", Operator::GreaterThanOrEqual, json!("8K")),
            cond("libraryId", Operator::In, json!("1")),
            cond("labels", Operator::ContainsAny, json!([])),
        ];
        for condition in cases {
            let field = condition.field.clone();
            assert!(
                validate(&single(condition), MediaType::Movie).is_err(),
                "expected {field} to be rejected"
            );
        }
    }

    #[test]
    fn collects_every_violation() {
        let criteria = and(vec![
            Condition::new("a", "nope", Operator::Equals, json!(1)).into(),
            Condition::new("b", "rating", Operator::GreaterThanOrEqual, json!(11)).into(),
            Group::new("g", GroupOperator::Or, vec![]).into(),
        ]);
        let violations = validate(&criteria, MediaType::Movie).unwrap_err();
        let ids: Vec<_> = violations.iter().map(|v| v.node_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "g"]);
        let err = into_error(&violations);
        assert!(err.to_string().contains("[b]"));
    }

    #[test]
    fn rejects_excessive_nesting() {
        let mut group = Group::new(
            "leaf-group",
            GroupOperator::And,
            vec![cond("neverWatched", Operator::Equals, json!(true)).into()],
        );
        for i in 0..MAX_DEPTH {
            group = Group::new(&format!("g{i}"), GroupOperator::Or, vec![group.into()]);
        }
        let msgs = messages(validate(&group, MediaType::Movie));
        assert!(msgs.iter().any(|m| m.contains("nested at most")));
    }
}
