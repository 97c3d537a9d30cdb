//! Cell type variants and their per-type behavior.
//!
//! A [`CellKind`] decides three things about a raw string that already
//! passed presence checks and column rules: whether it satisfies the type's
//! requirements, what typed [`CellValue`] it parses to, and how a typed
//! value turns back into a raw string.

use crate::cell::value::CellValue;
use crate::error::{ConfigError, ConfigResult, ReverseError, ReverseResult};
use crate::rules::{render, MessageCatalog};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static INTEGER_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

// Number with "." or "," separator, optionally followed by a unit after
// whitespace or a backslash ("100,12\zł", "9.999   kg").
static FLOAT_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+(?:[.,][0-9]+)?)(?:[\s\\]+.*)?$").unwrap());

// =============================================================================
// Cell Kind
// =============================================================================

/// The type of a column's cells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellKind {
    /// Free text. Always satisfied.
    Text,

    /// Whole number, decimal digits only.
    Integer,

    /// Decimal number with `.` or `,` separator and an optional unit
    /// suffix after whitespace or a backslash.
    Float,

    /// Membership test against truthy labels. Never a type failure: any
    /// value outside `true_values` parses as `false`.
    Boolean {
        #[serde(default = "default_true_values")]
        true_values: Vec<String>,
        #[serde(default = "default_false_values")]
        false_values: Vec<String>,
    },

    /// Calendar date in a chrono format, with common fallbacks.
    Date {
        #[serde(default = "default_date_format")]
        format: String,
    },

    /// Closed set of raw keys mapped to stored values, in declared order.
    Dictionary { entries: Vec<(String, String)> },
}

fn default_true_values() -> Vec<String> {
    vec![
        "true".to_string(),
        "1".to_string(),
        "yes".to_string(),
        "y".to_string(),
    ]
}

fn default_false_values() -> Vec<String> {
    vec![
        "false".to_string(),
        "0".to_string(),
        "no".to_string(),
        "n".to_string(),
    ]
}

fn default_date_format() -> String {
    "%d.%m.%Y".to_string()
}

impl CellKind {
    /// Boolean cell with the default truthy and falsy labels.
    pub fn boolean() -> Self {
        CellKind::Boolean {
            true_values: default_true_values(),
            false_values: default_false_values(),
        }
    }

    /// Date cell with the default `%d.%m.%Y` format.
    pub fn date() -> Self {
        CellKind::Date {
            format: default_date_format(),
        }
    }

    /// Lowercase name of the cell type, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            CellKind::Text => "text",
            CellKind::Integer => "integer",
            CellKind::Float => "float",
            CellKind::Boolean { .. } => "boolean",
            CellKind::Date { .. } => "date",
            CellKind::Dictionary { .. } => "dictionary",
        }
    }

    /// Reject type parameters a run could only trip over mid-row.
    pub(crate) fn validate(&self) -> ConfigResult<()> {
        match self {
            CellKind::Date { format } => check_date_format(format),
            _ => Ok(()),
        }
    }

    /// The catalog template announcing this type's requirement failure.
    pub(crate) fn requirement_template(&self, catalog: &MessageCatalog) -> String {
        match self {
            // Text and boolean cells cannot fail their requirements
            CellKind::Text | CellKind::Boolean { .. } => String::new(),
            CellKind::Integer => catalog.integer.clone(),
            CellKind::Float => catalog.float.clone(),
            CellKind::Date { .. } => catalog.date.clone(),
            CellKind::Dictionary { .. } => catalog.dictionary.clone(),
        }
    }

    /// Type requirement check for a present, rule-approved raw value.
    pub(crate) fn check(&self, raw: &str, template: &str) -> Result<(), String> {
        let satisfied = match self {
            CellKind::Text | CellKind::Boolean { .. } => true,
            CellKind::Integer => INTEGER_VALUE.is_match(raw) && raw.parse::<i64>().is_ok(),
            CellKind::Float => self.parse(raw).is_some(),
            CellKind::Date { .. } => self.parse(raw).is_some(),
            CellKind::Dictionary { entries } => entries.iter().any(|(key, _)| key == raw),
        };

        if satisfied {
            Ok(())
        } else {
            let mut params = vec![("value", raw)];
            if let CellKind::Date { format } = self {
                params.push(("format", format.as_str()));
            }
            Err(render(template, &params))
        }
    }

    /// Parse a raw value into its typed form.
    ///
    /// Returns `None` exactly when [`check`](Self::check) would fail.
    pub(crate) fn parse(&self, raw: &str) -> Option<CellValue> {
        match self {
            CellKind::Text => Some(CellValue::Text(raw.to_string())),
            CellKind::Integer => raw.parse::<i64>().ok().map(CellValue::Integer),
            CellKind::Float => {
                let captures = FLOAT_VALUE.captures(raw)?;
                let number = captures.get(1)?.as_str().replace(',', ".");
                number.parse::<f64>().ok().map(CellValue::Float)
            }
            CellKind::Boolean { true_values, .. } => {
                let normalized = raw.to_lowercase();
                let truthy = true_values
                    .iter()
                    .any(|label| label.to_lowercase() == normalized);
                Some(CellValue::Boolean(truthy))
            }
            CellKind::Date { format } => parse_date(raw, format).map(CellValue::Date),
            CellKind::Dictionary { entries } => entries
                .iter()
                .find(|(key, _)| key == raw)
                .map(|(_, value)| CellValue::Text(value.clone())),
        }
    }

    /// Human-presentable echo of a raw value.
    pub(crate) fn display(&self, raw: &str) -> String {
        match self {
            // "100,12\zł" reads as "100,12 zł"
            CellKind::Float => raw.replace('\\', " "),
            _ => raw.to_string(),
        }
    }

    /// Turn a typed value back into the raw string this cell type expects.
    ///
    /// An absent value is an empty cell. A value type the cell cannot
    /// express is a [`ReverseError::Unrepresentable`].
    pub fn reverse(&self, value: Option<&CellValue>) -> ReverseResult<String> {
        let value = match value {
            Some(value) => value,
            None => return Ok(String::new()),
        };

        match (self, value) {
            (CellKind::Text, CellValue::Text(s)) => Ok(s.clone()),
            (CellKind::Text, CellValue::Integer(i)) => Ok(i.to_string()),
            (CellKind::Text, CellValue::Float(f)) => Ok(f.to_string()),
            (CellKind::Integer, CellValue::Integer(i)) => Ok(i.to_string()),
            (CellKind::Float, CellValue::Float(f)) => Ok(f.to_string()),
            (CellKind::Float, CellValue::Integer(i)) => Ok(i.to_string()),
            (
                CellKind::Boolean {
                    true_values,
                    false_values,
                },
                CellValue::Boolean(b),
            ) => {
                let labels = if *b { true_values } else { false_values };
                Ok(labels.first().cloned().unwrap_or_default())
            }
            (CellKind::Date { format }, CellValue::Date(date)) => {
                check_date_format(format)?;
                Ok(date.format(format).to_string())
            }
            (CellKind::Date { format }, CellValue::Text(s)) => {
                check_date_format(format)?;
                match parse_date(s, format) {
                    Some(date) => Ok(date.format(format).to_string()),
                    None => Err(self.unrepresentable(value)),
                }
            }
            // Reverse lookup: first key whose stored value matches.
            // Unknown values reverse to an empty cell, like absent ones.
            (CellKind::Dictionary { entries }, CellValue::Text(s)) => Ok(entries
                .iter()
                .find(|(_, stored)| stored == s)
                .map(|(key, _)| key.clone())
                .unwrap_or_default()),
            _ => Err(self.unrepresentable(value)),
        }
    }

    fn unrepresentable(&self, value: &CellValue) -> ReverseError {
        ReverseError::Unrepresentable {
            cell_type: self.name(),
            value_type: value.type_name(),
        }
    }
}

/// Reject date formats chrono cannot interpret, before they reach a run.
pub(crate) fn check_date_format(format: &str) -> ConfigResult<()> {
    use chrono::format::{Item, StrftimeItems};

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidDateFormat(format.to_string()));
    }
    Ok(())
}

fn parse_date(raw: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, format)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d.%m.%Y"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}
