//! Criteria evaluator: pure logic, no I/O.
//!
//! Evaluation never fails. A field that is absent, `null`, or of the wrong
//! shape makes its condition false, unless the field's descriptor declares
//! missing-is-true for the operator in use.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::fields::{self, FieldDescriptor, Unit, ValueType};
use super::{Condition, Criteria, CriteriaNode, Group, GroupOperator, Operator};
use crate::catalog::MediaItemSnapshot;
use crate::types::Timestamp;

/// Evaluate a rule's criteria against one item snapshot at time `now`.
pub fn evaluate(criteria: &Criteria, item: &MediaItemSnapshot, now: Timestamp) -> bool {
    evaluate_group(criteria, item, now)
}

fn evaluate_group(group: &Group, item: &MediaItemSnapshot, now: Timestamp) -> bool {
    if group.conditions.is_empty() {
        return false;
    }
    let mut children = group.conditions.iter().map(|node| match node {
        CriteriaNode::Condition(c) => evaluate_condition(c, item, now),
        CriteriaNode::Group(g) => evaluate_group(g, item, now),
    });
    match group.operator {
        GroupOperator::And => children.all(|matched| matched),
        GroupOperator::Or => children.any(|matched| matched),
    }
}

fn evaluate_condition(condition: &Condition, item: &MediaItemSnapshot, now: Timestamp) -> bool {
    let Some(descriptor) = fields::describe(&condition.field) else {
        return false;
    };
    let Some(actual) = item.get(descriptor.name) else {
        return descriptor.missing_is_true.contains(&condition.operator);
    };
    let unit = condition.value_unit.as_deref().and_then(Unit::parse);

    match condition.operator {
        Operator::Equals => equals(descriptor, actual, &condition.value),
        Operator::LessThanOrEqual => compare(descriptor, actual, &condition.value, unit)
            .is_some_and(|ord| ord.is_le()),
        Operator::GreaterThanOrEqual => compare(descriptor, actual, &condition.value, unit)
            .is_some_and(|ord| ord.is_ge()),
        Operator::OlderThan => older_than(actual, &condition.value, unit, now),
        Operator::In => scalar_key(actual).is_some_and(|key| {
            condition
                .value
                .as_array()
                .is_some_and(|set| set.iter().filter_map(scalar_key).any(|k| k == key))
        }),
        Operator::ContainsAny => contains_any(actual, &condition.value),
    }
}

fn equals(descriptor: &FieldDescriptor, actual: &Value, expected: &Value) -> bool {
    match descriptor.value_type {
        ValueType::Ordinal(ranks) => match (rank(ranks, actual), rank(ranks, expected)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        ValueType::Number | ValueType::Bytes => match (actual.as_f64(), expected.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        _ => actual == expected,
    }
}

fn compare(
    descriptor: &FieldDescriptor,
    actual: &Value,
    threshold: &Value,
    unit: Option<Unit>,
) -> Option<std::cmp::Ordering> {
    match descriptor.value_type {
        ValueType::Ordinal(ranks) => Some(rank(ranks, actual)?.cmp(&rank(ranks, threshold)?)),
        ValueType::Number | ValueType::Bytes => {
            let threshold = threshold.as_f64()? * unit.map_or(1.0, Unit::factor);
            actual.as_f64()?.partial_cmp(&threshold)
        }
        _ => None,
    }
}

/// True iff at least the normalized threshold (in whole days) has elapsed.
fn older_than(actual: &Value, threshold: &Value, unit: Option<Unit>, now: Timestamp) -> bool {
    let Some(at) = parse_timestamp(actual) else {
        return false;
    };
    let Some(threshold) = threshold.as_f64() else {
        return false;
    };
    let threshold_days = threshold * unit.map_or(1.0, Unit::factor);
    let elapsed_days = (now - at).num_days() as f64;
    elapsed_days >= threshold_days
}

fn contains_any(actual: &Value, wanted: &Value) -> bool {
    let (Some(have), Some(wanted)) = (actual.as_array(), wanted.as_array()) else {
        return false;
    };
    have.iter()
        .filter_map(scalar_key)
        .any(|label| wanted.iter().filter_map(scalar_key).any(|w| w == label))
}

fn rank(ranks: &[&str], value: &Value) -> Option<usize> {
    fields::ordinal_rank(ranks, value.as_str()?)
}

/// Timestamps arrive as RFC 3339 strings or Unix seconds.
fn parse_timestamp(value: &Value) -> Option<Timestamp> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => DateTime::from_timestamp(n.as_i64()?, 0),
        _ => None,
    }
}

fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
