//! Import-scoped rules: judge the complete row set of one run.

use crate::error::{ConfigError, ConfigResult};
use crate::row::Row;
use crate::rules::{render, MessageCatalog};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// =============================================================================
// Rule Specs (declarative)
// =============================================================================

/// A rule over the whole row set, as written in a definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowRuleSpec {
    /// The tuple of the named properties' raw values must not repeat
    /// across rows.
    Unique {
        fields: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl RowRuleSpec {
    /// Compile against a definition's property -> column-key bindings.
    ///
    /// A field that matches no configured property fails here, before any
    /// row is processed. Compiled row rules hold per-run findings, so every
    /// run compiles its own fresh set.
    pub fn compile(
        &self,
        bindings: &[(String, String)],
        catalog: &MessageCatalog,
    ) -> ConfigResult<RowRule> {
        match self {
            RowRuleSpec::Unique { fields, message } => {
                let mut columns = Vec::with_capacity(fields.len());
                for field in fields {
                    let key = bindings
                        .iter()
                        .find(|(property, _)| property == field)
                        .map(|(_, key)| key.clone())
                        .ok_or_else(|| ConfigError::UnknownRuleField(field.clone()))?;
                    columns.push(key);
                }
                Ok(RowRule::Unique(UniqueRule {
                    fields: fields.clone(),
                    columns,
                    message: message.clone().unwrap_or_else(|| catalog.unique.clone()),
                    duplicates: Vec::new(),
                }))
            }
        }
    }
}

// =============================================================================
// Compiled Rules
// =============================================================================

/// A compiled row-set rule carrying its per-run findings.
#[derive(Debug, Clone)]
pub enum RowRule {
    Unique(UniqueRule),
}

impl RowRule {
    /// Judge the whole row set, recording findings on the rule.
    pub fn check(&mut self, rows: &[Row]) -> bool {
        match self {
            RowRule::Unique(rule) => rule.check(rows),
        }
    }

    /// Rendered failure message using the recorded findings.
    pub fn message(&self) -> String {
        match self {
            RowRule::Unique(rule) => rule.message(),
        }
    }

    /// Whether `row` belongs to one of the recorded findings.
    pub fn implicates(&self, row: &Row) -> bool {
        match self {
            RowRule::Unique(rule) => rule.implicates(row),
        }
    }
}

/// Uniqueness of a column tuple across the whole run.
///
/// One instance is valid for exactly one run: [`check`](Self::check)
/// records every duplicated tuple, and [`message`](Self::message)
/// interpolates them into the template.
#[derive(Debug, Clone)]
pub struct UniqueRule {
    fields: Vec<String>,
    columns: Vec<String>,
    message: String,
    duplicates: Vec<Vec<String>>,
}

impl UniqueRule {
    /// Scan the rows once; false when any tuple repeats.
    pub fn check(&mut self, rows: &[Row]) -> bool {
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        for row in rows {
            let tuple = self.tuple(row);
            if !seen.insert(tuple.clone()) && !self.duplicates.contains(&tuple) {
                self.duplicates.push(tuple);
            }
        }
        self.duplicates.is_empty()
    }

    /// The duplicated tuples found by [`check`](Self::check), in first-seen
    /// order.
    pub fn duplicates(&self) -> &[Vec<String>] {
        &self.duplicates
    }

    pub fn message(&self) -> String {
        let tuples: Vec<String> = self
            .duplicates
            .iter()
            .map(|tuple| tuple.join(", "))
            .collect();
        render(
            &self.message,
            &[
                ("fields", self.fields.join(", ").as_str()),
                ("nonUniqueValues", tuples.join("; ").as_str()),
            ],
        )
    }

    pub fn implicates(&self, row: &Row) -> bool {
        self.duplicates.contains(&self.tuple(row))
    }

    fn tuple(&self, row: &Row) -> Vec<String> {
        self.columns
            .iter()
            .map(|key| {
                row.cell(key)
                    .and_then(|cell| cell.raw())
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, CellKind};

    fn row(number: usize, values: &[(&str, &str)]) -> Row {
        let cells = values
            .iter()
            .map(|(key, raw)| {
                let mut cell = Cell::skeleton(
                    CellKind::Text,
                    key,
                    false,
                    &[],
                    &MessageCatalog::default(),
                )
                .unwrap();
                cell.set_raw(raw);
                ((*key).to_string(), cell)
            })
            .collect();
        Row::new(number, cells)
    }

    fn unique_rule(fields: &[&str]) -> RowRule {
        let bindings: Vec<(String, String)> = fields
            .iter()
            .map(|f| ((*f).to_string(), (*f).to_string()))
            .collect();
        RowRuleSpec::Unique {
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
            message: None,
        }
        .compile(&bindings, &MessageCatalog::default())
        .unwrap()
    }

    #[test]
    fn test_unique_passes_on_distinct_tuples() {
        let rows = vec![
            row(1, &[("A", "x"), ("B", "1")]),
            row(2, &[("A", "x"), ("B", "2")]),
            row(3, &[("A", "y"), ("B", "1")]),
        ];
        let mut rule = unique_rule(&["A", "B"]);
        assert!(rule.check(&rows));
    }

    #[test]
    fn test_unique_captures_exactly_duplicated_tuples() {
        let rows = vec![
            row(1, &[("A", "x"), ("B", "1")]),
            row(2, &[("A", "x"), ("B", "1")]),
            row(3, &[("A", "y"), ("B", "2")]),
            row(4, &[("A", "x"), ("B", "1")]),
        ];
        let mut rule = unique_rule(&["A", "B"]);
        assert!(!rule.check(&rows));

        let RowRule::Unique(inner) = &rule;
        assert_eq!(inner.duplicates(), &[vec!["x".to_string(), "1".to_string()]]);
    }

    #[test]
    fn test_unique_message_interpolates_findings() {
        let rows = vec![
            row(1, &[("A", "x"), ("B", "1")]),
            row(2, &[("A", "x"), ("B", "1")]),
        ];
        let mut rule = unique_rule(&["A", "B"]);
        rule.check(&rows);
        let message = rule.message();
        assert!(message.contains("A, B"));
        assert!(message.contains("x, 1"));
    }

    #[test]
    fn test_implicates_only_duplicated_rows() {
        let rows = vec![
            row(1, &[("A", "x")]),
            row(2, &[("A", "y")]),
            row(3, &[("A", "x")]),
        ];
        let mut rule = unique_rule(&["A"]);
        rule.check(&rows);
        assert!(rule.implicates(&rows[0]));
        assert!(!rule.implicates(&rows[1]));
        assert!(rule.implicates(&rows[2]));
    }

    #[test]
    fn test_unknown_field_is_config_error() {
        let bindings = vec![("name".to_string(), "A".to_string())];
        let result = RowRuleSpec::Unique {
            fields: vec!["missing".into()],
            message: None,
        }
        .compile(&bindings, &MessageCatalog::default());
        assert!(matches!(result, Err(ConfigError::UnknownRuleField(_))));
    }

    #[test]
    fn test_absent_cells_compare_as_empty() {
        let rows = vec![row(1, &[("A", "")]), row(2, &[("A", "  ")])];
        let mut rule = unique_rule(&["A"]);
        assert!(!rule.check(&rows));
    }
}
