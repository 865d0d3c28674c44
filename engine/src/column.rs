//! Column types and scalar type inference.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Warehouse column types a row may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Int,
    Float,
    Boolean,
    Datetime,
    /// Serialized nested object or array
    Json,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::String => write!(f, "string"),
            ColumnType::Int => write!(f, "int"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Datetime => write!(f, "datetime"),
            ColumnType::Json => write!(f, "json"),
        }
    }
}

impl ColumnType {
    /// Infer the column type for a JSON value.
    ///
    /// Returns `None` for null, which never produces a column. Whole-valued
    /// floats such as `3.0` infer `Int`.
    pub fn infer(value: &Value) -> Option<ColumnType> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ColumnType::Boolean),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(ColumnType::Int),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 => Some(ColumnType::Int),
                _ => Some(ColumnType::Float),
            },
            Value::String(s) if is_datetime(s) => Some(ColumnType::Datetime),
            Value::String(_) => Some(ColumnType::String),
            Value::Array(_) | Value::Object(_) => Some(ColumnType::Json),
        }
    }
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M:%S%.fZ",
];

/// Whether a string is a timestamp in one of the recognized formats.
pub fn is_datetime(s: &str) -> bool {
    // Shortest accepted form is a bare date.
    if s.len() < 10 || !s.as_bytes()[0].is_ascii_digit() {
        return false;
    }
    if DateTime::parse_from_rfc3339(s).is_ok()
        || DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z").is_ok()
    {
        return true;
    }
    if NAIVE_DATETIME_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
    {
        return true;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
