use std::cmp::Ordering;
use std::fmt;

use schemars::JsonSchema;
use serde::Serialize;

use crate::schema::FieldType;

/// A single dataset cell.
///
/// Ordering is `Null` < numbers < text; `-0.0` and `0.0` land in the same
/// group.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum Value {
    Null,
    Float(f64),
    Text(String),
}

impl Value {
    /// Parse a raw CSV cell as the given field type.
    ///
    /// Empty cells become `Null`. Non-finite floats are normalized to `0.0`.
    /// Returns `None` when a numeric cell does not parse.
    pub fn parse(field_type: FieldType, raw: &str) -> Option<Value> {
        if raw.is_empty() {
            return Some(Value::Null);
        }
        match field_type {
            FieldType::Text | FieldType::Category => Some(Value::Text(raw.to_string())),
            FieldType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .map(|value| Value::Float(finite_or_zero(value))),
        }
    }

    /// Numeric view of the value; `Null` and text are `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            Value::Null | Value::Text(_) => None,
        }
    }

    /// Numeric operand for arithmetic: missing or non-numeric counts as zero.
    pub fn to_f64_or_zero(&self) -> f64 {
        self.as_f64().unwrap_or(0.0)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Cell text as written to CSV.
    pub fn to_csv(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Float(value) => value.to_string(),
            Value::Text(value) => value.clone(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Float(_) => 1,
            Value::Text(_) => 2,
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("(empty)"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(finite_or_zero(value))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => {
                if a == b { Ordering::Equal } else { a.total_cmp(b) }
            }
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}
