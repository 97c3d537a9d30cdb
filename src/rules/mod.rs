//! Validation rules and their message templates.
//!
//! Two unrelated capability sets, deliberately kept as separate types:
//!
//! - [`CellRuleSpec`] / [`CellRule`] - judge one raw cell value
//! - [`RowRuleSpec`] / [`RowRule`] - judge the complete row set of a run
//!
//! Every failure message is a `%name%` template: rules carry their own
//! template (from the rule's `message` parameter or the catalog) and render
//! it with their parameters and findings.

use serde::{Deserialize, Serialize};

pub mod cell;
pub mod row_set;

pub use cell::{CellRule, CellRuleSpec};
pub use row_set::{RowRule, RowRuleSpec, UniqueRule};

// =============================================================================
// Template Rendering
// =============================================================================

/// Substitute `%name%` variables in a message template.
pub fn render(template: &str, params: &[(&str, &str)]) -> String {
    let mut message = template.to_string();
    for (name, value) in params {
        message = message.replace(&format!("%{}%", name), value);
    }
    message
}

// =============================================================================
// Message Catalog
// =============================================================================

/// Message templates for every built-in failure.
///
/// A definition file may override any subset (translations live here, not
/// in the engine); a rule's own `message` parameter wins over the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MessageCatalog {
    /// Required cell left blank.
    pub required: String,
    /// Integer cell fed a non-digit value. `%value%`.
    pub integer: String,
    /// Float cell fed a non-numeric value. `%value%`.
    pub float: String,
    /// Date cell fed an unparseable value. `%value%`, `%format%`.
    pub date: String,
    /// Dictionary cell fed an unknown key. `%value%`.
    pub dictionary: String,
    /// Length rule failure. `%minLength%`, `%maxLength%`.
    pub length: String,
    /// Regex rule failure. `%pattern%`.
    pub regex: String,
    /// Unique rule failure. `%fields%`, `%nonUniqueValues%`.
    pub unique: String,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            required: "a value is required".into(),
            integer: "'%value%' is not a whole number".into(),
            float: "'%value%' is not a number".into(),
            date: "'%value%' is not a date in format %format%".into(),
            dictionary: "'%value%' is not one of the allowed values".into(),
            length: "must be between %minLength% and %maxLength% characters long".into(),
            regex: "does not match the pattern %pattern%".into(),
            unique: "values of %fields% must be unique, duplicates found: %nonUniqueValues%"
                .into(),
        }
    }
}

// =============================================================================
// Reference
// =============================================================================

/// Get a description of all cell types and rules for the CLI reference.
pub fn reference() -> String {
    r#"Available cell types:

| Type | Description | Parameters |
|------|-------------|------------|
| text | Free text, always valid | - |
| integer | Whole number, digits only | - |
| float | Decimal number, "." or "," separator, optional unit suffix | - |
| boolean | Membership test against truthy labels, never fails | true_values, false_values: label lists |
| date | Calendar date in a chrono format | format: date format (default "%d.%m.%Y") |
| dictionary | Closed set of raw keys mapped to stored values | entries: ordered [key, value] pairs |

Available cell rules (run in declared order, first failure wins):

| Rule | Description | Parameters |
|------|-------------|------------|
| length | Raw length within [min, max], inclusive | min (default 0), max, message: template with %minLength% %maxLength% |
| regex | Case-insensitive match of the whole value | pattern, message: template with %pattern% |

Available row rules (run once over the complete row set):

| Rule | Description | Parameters |
|------|-------------|------------|
| unique | Tuple of the named properties must not repeat | fields: property names, message: template with %fields% %nonUniqueValues% |

Every failing check appends "<label>- <message>" to its row's report."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_all_params() {
        let out = render(
            "between %minLength% and %maxLength%",
            &[("minLength", "0"), ("maxLength", "12")],
        );
        assert_eq!(out, "between 0 and 12");
    }

    #[test]
    fn test_render_ignores_unknown_params() {
        let out = render("hello %name%", &[("other", "x")]);
        assert_eq!(out, "hello %name%");
    }

    #[test]
    fn test_render_repeated_param() {
        let out = render("%v% and %v%", &[("v", "a")]);
        assert_eq!(out, "a and a");
    }

    #[test]
    fn test_catalog_partial_override() {
        let catalog: MessageCatalog =
            serde_json::from_str(r#"{"required": "pflichtfeld"}"#).unwrap();
        assert_eq!(catalog.required, "pflichtfeld");
        assert_eq!(catalog.length, MessageCatalog::default().length);
    }

    #[test]
    fn test_reference_mentions_every_type() {
        let text = reference();
        for name in [
            "text",
            "integer",
            "float",
            "boolean",
            "date",
            "dictionary",
            "length",
            "regex",
            "unique",
        ] {
            assert!(text.contains(name), "missing {}", name);
        }
    }
}
