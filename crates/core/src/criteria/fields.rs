//! Field registry: the fixed set of item fields criteria may reference.
//!
//! Descriptors are declared once in [`FIELDS`] and indexed by name on first
//! use. Nothing mutates the registry at runtime.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

use super::Operator;
use crate::media::MediaType;

/// Rank order for the `resolution` field, lowest first.
pub const RESOLUTION_RANKS: &[&str] = &["480p", "720p", "1080p", "4K"];

/// Days per month when normalizing temporal thresholds.
pub const DAYS_PER_MONTH: f64 = 30.0;
/// Days per year when normalizing temporal thresholds.
pub const DAYS_PER_YEAR: f64 = 365.0;

const MIB: f64 = 1024.0 * 1024.0;

/// Value shape of a field, which decides legal operators and comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "ranks", rename_all = "snake_case")]
pub enum ValueType {
    Boolean,
    Number,
    /// RFC 3339 timestamp, compared as elapsed days.
    Temporal,
    /// Size in bytes.
    Bytes,
    /// Label with a fixed rank order.
    Ordinal(&'static [&'static str]),
    String,
    StringSet,
}

/// Units accepted in `Condition::value_unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    #[serde(rename = "days")]
    Days,
    #[serde(rename = "months")]
    Months,
    #[serde(rename = "years")]
    Years,
    #[serde(rename = "MB")]
    Megabytes,
    #[serde(rename = "GB")]
    Gigabytes,
    #[serde(rename = "TB")]
    Terabytes,
}

impl Unit {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "days" => Some(Self::Days),
            "months" => Some(Self::Months),
            "years" => Some(Self::Years),
            "MB" => Some(Self::Megabytes),
            "GB" => Some(Self::Gigabytes),
            "TB" => Some(Self::Terabytes),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Months => "months",
            Self::Years => "years",
            Self::Megabytes => "MB",
            Self::Gigabytes => "GB",
            Self::Terabytes => "TB",
        }
    }

    /// Multiplier into the field's canonical unit (days or bytes).
    pub fn factor(self) -> f64 {
        match self {
            Self::Days => 1.0,
            Self::Months => DAYS_PER_MONTH,
            Self::Years => DAYS_PER_YEAR,
            Self::Megabytes => MIB,
            Self::Gigabytes => MIB * 1024.0,
            Self::Terabytes => MIB * 1024.0 * 1024.0,
        }
    }
}

/// Static description of one evaluable field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub value_type: ValueType,
    pub operators: &'static [Operator],
    pub units: &'static [Unit],
    pub unit_required: bool,
    pub media_types: &'static [MediaType],
    /// Operators for which an absent value satisfies the condition.
    pub missing_is_true: &'static [Operator],
    /// Inclusive bounds on the value, in the field's canonical unit.
    pub range: Option<(f64, f64)>,
}

impl FieldDescriptor {
    pub fn supports(&self, operator: Operator) -> bool {
        self.operators.contains(&operator)
    }

    pub fn applies_to(&self, media_type: MediaType) -> bool {
        self.media_types.contains(&media_type)
    }
}

const ALL_MEDIA: &[MediaType] = &[MediaType::Movie, MediaType::TvSeries, MediaType::Episode];
const TEMPORAL_UNITS: &[Unit] = &[Unit::Days, Unit::Months, Unit::Years];
const SIZE_UNITS: &[Unit] = &[Unit::Megabytes, Unit::Gigabytes, Unit::Terabytes];
const COMPARISONS: &[Operator] = &[Operator::LessThanOrEqual, Operator::GreaterThanOrEqual];

/// Every field the engine knows about.
pub static FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "neverWatched",
        value_type: ValueType::Boolean,
        operators: &[Operator::Equals],
        units: &[],
        unit_required: false,
        media_types: ALL_MEDIA,
        missing_is_true: &[],
        range: None,
    },
    FieldDescriptor {
        name: "lastWatchedAt",
        value_type: ValueType::Temporal,
        operators: &[Operator::OlderThan],
        units: TEMPORAL_UNITS,
        unit_required: true,
        media_types: ALL_MEDIA,
        // "Watched long ago or never".
        missing_is_true: &[Operator::OlderThan],
        range: None,
    },
    FieldDescriptor {
        name: "addedAt",
        value_type: ValueType::Temporal,
        operators: &[Operator::OlderThan],
        units: TEMPORAL_UNITS,
        unit_required: true,
        media_types: ALL_MEDIA,
        missing_is_true: &[],
        range: None,
    },
    FieldDescriptor {
        name: "playCount",
        value_type: ValueType::Number,
        operators: COMPARISONS,
        units: &[],
        unit_required: false,
        media_types: ALL_MEDIA,
        missing_is_true: &[],
        range: Some((0.0, f64::MAX)),
    },
    FieldDescriptor {
        name: "fileSize",
        value_type: ValueType::Bytes,
        operators: COMPARISONS,
        units: SIZE_UNITS,
        unit_required: false,
        media_types: ALL_MEDIA,
        missing_is_true: &[],
        range: Some((0.0, f64::MAX)),
    },
    FieldDescriptor {
        name: "resolution",
        value_type: ValueType::Ordinal(RESOLUTION_RANKS),
        operators: &[
            Operator::Equals,
            Operator::LessThanOrEqual,
            Operator::GreaterThanOrEqual,
        ],
        units: &[],
        unit_required: false,
        media_types: &[MediaType::Movie, MediaType::Episode],
        missing_is_true: &[],
        range: None,
    },
    FieldDescriptor {
        name: "rating",
        value_type: ValueType::Number,
        operators: COMPARISONS,
        units: &[],
        unit_required: false,
        media_types: ALL_MEDIA,
        missing_is_true: &[],
        range: Some((0.0, 10.0)),
    },
    FieldDescriptor {
        name: "libraryId",
        value_type: ValueType::String,
        operators: &[Operator::In],
        units: &[],
        unit_required: false,
        media_types: ALL_MEDIA,
        missing_is_true: &[],
        range: None,
    },
    FieldDescriptor {
        name: "labels",
        value_type: ValueType::StringSet,
        operators: &[Operator::ContainsAny],
        units: &[],
        unit_required: false,
        media_types: ALL_MEDIA,
        missing_is_true: &[],
        range: None,
    },
    FieldDescriptor {
        name: "seasonNumber",
        value_type: ValueType::Number,
        operators: &[
            Operator::Equals,
            Operator::LessThanOrEqual,
            Operator::GreaterThanOrEqual,
        ],
        units: &[],
        unit_required: false,
        media_types: &[MediaType::Episode],
        missing_is_true: &[],
        range: Some((0.0, f64::MAX)),
    },
];

static REGISTRY: LazyLock<HashMap<&'static str, &'static FieldDescriptor>> =
    LazyLock::new(|| FIELDS.iter().map(|f| (f.name, f)).collect());

/// Look up a field by its exact name.
pub fn describe(name: &str) -> Option<&'static FieldDescriptor> {
    REGISTRY.get(name).copied()
}

/// Fields usable in rules targeting `media_type`, in declaration order.
pub fn list_fields(media_type: MediaType) -> Vec<&'static FieldDescriptor> {
    FIELDS.iter().filter(|f| f.applies_to(media_type)).collect()
}

/// Position of an ordinal label in `ranks`, ignoring ASCII case.
pub fn ordinal_rank(ranks: &[&str], label: &str) -> Option<usize> {
    ranks.iter().position(|r| r.eq_ignore_ascii_case(label))
}
