//! Typed values produced by parsed cells.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Cell Value
// =============================================================================

/// A cell's parsed, typed value.
///
/// This is what flows from a validated cell into a model property, and back
/// again through the reverse pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// Free text.
    Text(String),
    /// Whole number.
    Integer(i64),
    /// Decimal number.
    Float(f64),
    /// Truth value.
    Boolean(bool),
    /// Calendar date.
    Date(NaiveDate),
}

impl CellValue {
    /// Lowercase name of the value type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Text(_) => "text",
            CellValue::Integer(_) => "integer",
            CellValue::Float(_) => "float",
            CellValue::Boolean(_) => "boolean",
            CellValue::Date(_) => "date",
        }
    }

    /// Get the text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the integer if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the float if this is a float value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the boolean if this is a boolean value.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the date if this is a date value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Build a value from a plain JSON scalar. `Null` maps to `None`.
    ///
    /// Dates travel as strings in JSON records; the reverse pipeline parses
    /// them against the column's date format.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(CellValue::Boolean(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(CellValue::Integer(i))
                } else {
                    n.as_f64().map(CellValue::Float)
                }
            }
            Value::String(s) => Some(CellValue::Text(s.clone())),
            _ => None,
        }
    }

    /// Plain JSON scalar form of the value.
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Integer(i) => Value::from(*i),
            CellValue::Float(f) => Value::from(*f),
            CellValue::Boolean(b) => Value::Bool(*b),
            CellValue::Date(d) => Value::String(d.to_string()),
        }
    }
}
