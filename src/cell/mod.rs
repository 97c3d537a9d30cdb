//! Typed cells: one value holder per column and row.
//!
//! A [`Cell`] is configured once (type, label, requiredness, rules) and then
//! cloned as a skeleton for every row. Assigning a raw value with
//! [`Cell::set_raw`] is the only mutation: it normalizes the input and runs
//! the full check sequence, leaving at most one error on the cell.
//!
//! Check order is fixed: presence first, then column rules in declared
//! order, then the type's own requirements. The first failure wins, and a
//! failed cell yields no typed value.

use crate::error::ConfigResult;
use crate::rules::{render, CellRule, CellRuleSpec, MessageCatalog};

pub mod kind;
pub mod value;

pub use kind::CellKind;
pub use value::CellValue;

// =============================================================================
// Cell
// =============================================================================

/// A single spreadsheet cell bound to a column's configuration.
#[derive(Debug, Clone)]
pub struct Cell {
    kind: CellKind,
    label: String,
    required: bool,
    rules: Vec<CellRule>,
    required_message: String,
    requirement_template: String,
    raw: Option<String>,
    error: Option<String>,
}

impl Cell {
    /// Build the skeleton cell for a column. Rules and type parameters are
    /// compiled here, so a bad definition fails before any row exists.
    pub(crate) fn skeleton(
        kind: CellKind,
        label: &str,
        required: bool,
        rules: &[CellRuleSpec],
        catalog: &MessageCatalog,
    ) -> ConfigResult<Self> {
        kind.validate()?;
        let compiled = rules
            .iter()
            .map(|spec| spec.compile(catalog))
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Self {
            required_message: catalog.required.clone(),
            requirement_template: kind.requirement_template(catalog),
            kind,
            label: label.to_string(),
            required,
            rules: compiled,
            raw: None,
            error: None,
        })
    }

    /// Assign the raw value and run every check.
    ///
    /// Blank input (empty or whitespace-only) counts as absent. An absent
    /// value only fails the presence check of a required cell; a present
    /// value runs the column rules in order, then the type requirements.
    pub fn set_raw(&mut self, raw: &str) {
        let trimmed = raw.trim();
        self.raw = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self.error = None;

        match &self.raw {
            None => {
                if self.required {
                    self.fail(render(&self.required_message, &[]));
                }
            }
            Some(value) => {
                for rule in &self.rules {
                    if !rule.is_valid(value) {
                        let message = rule.message();
                        self.fail(message);
                        return;
                    }
                }
                if let Err(message) = self.kind.check(value, &self.requirement_template) {
                    self.fail(message);
                }
            }
        }
    }

    fn fail(&mut self, message: String) {
        self.error = Some(format!("{}- {}", self.label, message));
    }

    /// The normalized raw value, if present.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// The typed value. `None` when the value is absent or any check
    /// failed; repeated calls give equal results.
    pub fn value(&self) -> Option<CellValue> {
        if self.error.is_some() {
            return None;
        }
        self.raw.as_deref().and_then(|raw| self.kind.parse(raw))
    }

    /// Human-presentable echo of the raw input. Absent values show empty.
    pub fn display_value(&self) -> String {
        match &self.raw {
            Some(raw) => self.kind.display(raw),
            None => String::new(),
        }
    }

    /// The label-prefixed error message, if any check failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn kind(&self) -> &CellKind {
        &self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellKind, label: &str, required: bool, rules: &[CellRuleSpec]) -> Cell {
        Cell::skeleton(kind, label, required, rules, &MessageCatalog::default()).unwrap()
    }

    #[test]
    fn test_required_blank_fails_presence() {
        for raw in ["", "   ", "\t"] {
            let mut c = cell(CellKind::Text, "First name", true, &[]);
            c.set_raw(raw);
            assert!(c.has_error(), "raw {:?} should fail", raw);
            assert_eq!(c.error(), Some("First name- a value is required"));
            assert_eq!(c.value(), None);
        }
    }

    #[test]
    fn test_optional_blank_is_clean() {
        let mut c = cell(CellKind::Integer, "Age", false, &[]);
        c.set_raw("   ");
        assert!(!c.has_error());
        assert_eq!(c.value(), None);
        assert_eq!(c.display_value(), "");
    }

    #[test]
    fn test_value_is_idempotent() {
        let mut c = cell(CellKind::Integer, "Age", true, &[]);
        c.set_raw("42");
        let first = c.value();
        let second = c.value();
        assert_eq!(first, second);
        assert_eq!(first, Some(CellValue::Integer(42)));
    }

    #[test]
    fn test_input_is_trimmed() {
        let mut c = cell(CellKind::Integer, "Age", true, &[]);
        c.set_raw("  42  ");
        assert_eq!(c.raw(), Some("42"));
        assert_eq!(c.value(), Some(CellValue::Integer(42)));
    }

    #[test]
    fn test_rules_run_before_type_requirements() {
        let rules = [CellRuleSpec::Length {
            min: 0,
            max: 3,
            message: None,
        }];
        let mut c = cell(CellKind::Integer, "Code", true, &rules);
        c.set_raw("12345");
        let err = c.error().unwrap();
        assert!(err.contains("between 0 and 3"));
        assert!(!err.contains("whole number"));
        assert_eq!(c.value(), None);
    }

    #[test]
    fn test_rules_run_for_optional_present_values() {
        let rules = [CellRuleSpec::Regex {
            pattern: "[0-9]+".into(),
            message: None,
        }];
        let mut c = cell(CellKind::Text, "Code", false, &rules);
        c.set_raw("abc");
        assert!(c.has_error());
        assert_eq!(c.value(), None);
    }

    #[test]
    fn test_type_requirement_failure_is_prefixed() {
        let mut c = cell(CellKind::Integer, "Age", true, &[]);
        c.set_raw("12a");
        assert_eq!(c.error(), Some("Age- '12a' is not a whole number"));
    }

    #[test]
    fn test_reassignment_replaces_state() {
        let mut c = cell(CellKind::Integer, "Age", true, &[]);
        c.set_raw("12a");
        assert!(c.has_error());
        c.set_raw("12");
        assert!(!c.has_error());
        assert_eq!(c.value(), Some(CellValue::Integer(12)));
    }

    #[test]
    fn test_presence_failure_wins_over_rules() {
        let rules = [CellRuleSpec::Length {
            min: 2,
            max: 4,
            message: None,
        }];
        let mut c = cell(CellKind::Text, "Code", true, &rules);
        c.set_raw("");
        assert_eq!(c.error(), Some("Code- a value is required"));
    }

    #[test]
    fn test_display_value_echoes_raw() {
        let mut c = cell(CellKind::Float, "Price", true, &[]);
        c.set_raw("100,12\\zł");
        assert_eq!(c.display_value(), "100,12 zł");
        assert_eq!(c.value(), Some(CellValue::Float(100.12)));
    }

    #[test]
    fn test_bad_rule_fails_at_skeleton_time() {
        let rules = [CellRuleSpec::Regex {
            pattern: "([".into(),
            message: None,
        }];
        let result = Cell::skeleton(
            CellKind::Text,
            "Code",
            false,
            &rules,
            &MessageCatalog::default(),
        );
        assert!(result.is_err());
    }
}
