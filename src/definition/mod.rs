//! Sheet definitions: the declarative mapping between columns and models.
//!
//! A [`SheetDefinition`] names the target model and describes every column:
//! where its raw value sits in a record (the key), which model property it
//! binds to, how its cells behave and which rules judge them. Definitions
//! are plain serde structures, so they live equally well in code (builder
//! methods) and in JSON files checked against an embedded schema.
//!
//! Definitions are immutable once built; [`SheetDefinition::compile`] turns
//! one into ready-to-clone skeleton cells and surfaces every configuration
//! mistake before any row is processed.
//!
//! # Example (JSON form)
//! ```ignore
//! {
//!   "model": "Member",
//!   "columns": [
//!     {
//!       "key": "A",
//!       "property": "member_id",
//!       "label": "Member ID",
//!       "required": true,
//!       "cell": { "type": "text" },
//!       "rules": [{ "type": "regex", "pattern": "M-[0-9]{4}" }]
//!     }
//!   ],
//!   "row_rules": [{ "type": "unique", "fields": ["member_id"] }]
//! }
//! ```

use crate::cell::{Cell, CellKind};
use crate::error::{ConfigError, ConfigResult};
use crate::rules::{CellRuleSpec, MessageCatalog, RowRule, RowRuleSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

// =============================================================================
// Column Definition
// =============================================================================

/// One column of a sheet definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDef {
    /// Column key locating the raw value in a record: a generated letter
    /// (`A`, `B`, ...) or a header name, depending on how the grid was read.
    pub key: String,

    /// Model property this column binds to. Defaults to the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,

    /// Human name prefixed to every error message of this column.
    pub label: String,

    /// Whether a value must be present.
    #[serde(default)]
    pub required: bool,

    /// Cell type of the column.
    pub cell: CellKind,

    /// Rules run against present values, in declared order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<CellRuleSpec>,
}

impl ColumnDef {
    /// Create a column with the fields every column needs.
    pub fn new(key: impl Into<String>, label: impl Into<String>, cell: CellKind) -> Self {
        Self {
            key: key.into(),
            property: None,
            label: label.into(),
            required: false,
            cell,
            rules: Vec::new(),
        }
    }

    /// Bind the column to a model property other than its key.
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Mark the column as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: CellRuleSpec) -> Self {
        self.rules.push(rule);
        self
    }

    /// The bound property name (the key when not overridden).
    pub fn property_name(&self) -> &str {
        self.property.as_deref().unwrap_or(&self.key)
    }
}

// =============================================================================
// Sheet Definition
// =============================================================================

/// Declarative description of one sheet-to-model mapping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SheetDefinition {
    /// Name of the target model, used in reports and binding errors.
    pub model: String,

    /// Columns in sheet order.
    pub columns: Vec<ColumnDef>,

    /// Rules over the complete row set of a run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub row_rules: Vec<RowRuleSpec>,

    /// Message templates. Override any subset to translate or reword.
    #[serde(default, skip_serializing_if = "is_default_catalog")]
    pub messages: MessageCatalog,
}

fn is_default_catalog(catalog: &MessageCatalog) -> bool {
    *catalog == MessageCatalog::default()
}

impl SheetDefinition {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            columns: Vec::new(),
            row_rules: Vec::new(),
            messages: MessageCatalog::default(),
        }
    }

    /// Append a column.
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Append a row-set rule.
    pub fn row_rule(mut self, rule: RowRuleSpec) -> Self {
        self.row_rules.push(rule);
        self
    }

    /// Replace the message catalog.
    pub fn with_messages(mut self, messages: MessageCatalog) -> Self {
        self.messages = messages;
        self
    }

    /// Property -> column-key bindings, in column order.
    pub fn bindings(&self) -> Vec<(String, String)> {
        self.columns
            .iter()
            .map(|column| (column.property_name().to_string(), column.key.clone()))
            .collect()
    }

    /// Load a definition from JSON text.
    ///
    /// The text is checked against the embedded schema first, so unknown
    /// cell types or rule identifiers come back as readable messages
    /// instead of bare serde rejections.
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ConfigError::InvalidDefinition(e.to_string()))?;
        check_definition(&value).map_err(|errors| {
            ConfigError::InvalidDefinition(errors.join("; "))
        })?;
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidDefinition(e.to_string()))
    }

    /// Serialize to pretty JSON, the format [`from_json`](Self::from_json)
    /// reads.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Compile into skeleton cells, surfacing every configuration mistake.
    pub fn compile(&self) -> ConfigResult<CompiledSheet> {
        let mut seen: HashSet<&str> = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.key.as_str()) {
                return Err(ConfigError::DuplicateColumn(column.key.clone()));
            }
        }

        let mut columns = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let skeleton = Cell::skeleton(
                column.cell.clone(),
                &column.label,
                column.required,
                &column.rules,
                &self.messages,
            )?;
            columns.push(CompiledColumn {
                key: column.key.clone(),
                property: column.property_name().to_string(),
                skeleton,
            });
        }

        // Row rules are compiled fresh per run; probing them here makes
        // compile() the single gate for every definition mistake.
        self.compile_row_rules()?;

        Ok(CompiledSheet {
            model: self.model.clone(),
            columns,
        })
    }

    /// Compile the row-set rules for one run.
    ///
    /// Compiled row rules accumulate findings, so they must never be shared
    /// between runs; callers compile a fresh set each time.
    pub fn compile_row_rules(&self) -> ConfigResult<Vec<RowRule>> {
        let bindings = self.bindings();
        self.row_rules
            .iter()
            .map(|spec| spec.compile(&bindings, &self.messages))
            .collect()
    }
}

// =============================================================================
// Compiled Sheet
// =============================================================================

/// A definition compiled into ready-to-clone skeleton cells.
#[derive(Debug, Clone)]
pub struct CompiledSheet {
    pub(crate) model: String,
    pub(crate) columns: Vec<CompiledColumn>,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledColumn {
    pub(crate) key: String,
    pub(crate) property: String,
    pub(crate) skeleton: Cell,
}

impl CompiledSheet {
    /// Name of the target model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Configured column keys, in sheet order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.key.as_str())
    }
}

// =============================================================================
// Schema Check
// =============================================================================

/// Valide une définition brute contre le schéma embarqué.
///
/// # Returns
/// * `Ok(())` si valide
/// * `Err(Vec<String>)` avec les erreurs sinon
pub fn check_definition(data: &Value) -> Result<(), Vec<String>> {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/sheet-definition.json"))
        .expect("Invalid embedded schema");

    let validator =
        jsonschema::draft7::new(&schema).map_err(|e| vec![format!("Schéma invalide: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// =============================================================================
// Example
// =============================================================================

/// A complete example definition, used by the CLI and the docs.
pub fn example_definition() -> SheetDefinition {
    SheetDefinition::new("Member")
        .column(
            ColumnDef::new("A", "Member ID", CellKind::Text)
                .with_property("member_id")
                .required()
                .with_rule(CellRuleSpec::Regex {
                    pattern: "M-[0-9]{4}".into(),
                    message: None,
                }),
        )
        .column(
            ColumnDef::new("B", "Full name", CellKind::Text)
                .with_property("full_name")
                .required()
                .with_rule(CellRuleSpec::Length {
                    min: 1,
                    max: 60,
                    message: None,
                }),
        )
        .column(ColumnDef::new("C", "Age", CellKind::Integer).with_property("age"))
        .column(
            ColumnDef::new(
                "D",
                "Country",
                CellKind::Dictionary {
                    entries: vec![
                        ("PL".into(), "Poland".into()),
                        ("DE".into(), "Germany".into()),
                        ("FR".into(), "France".into()),
                    ],
                },
            )
            .with_property("country"),
        )
        .column(ColumnDef::new("E", "Newsletter", CellKind::boolean()).with_property("newsletter"))
        .column(ColumnDef::new("F", "Joined on", CellKind::date()).with_property("joined_on"))
        .row_rule(RowRuleSpec::Unique {
            fields: vec!["member_id".into()],
            message: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_defaults_to_key() {
        let column = ColumnDef::new("A", "Name", CellKind::Text);
        assert_eq!(column.property_name(), "A");

        let column = column.with_property("name");
        assert_eq!(column.property_name(), "name");
    }

    #[test]
    fn test_duplicate_key_is_config_error() {
        let definition = SheetDefinition::new("Member")
            .column(ColumnDef::new("A", "Name", CellKind::Text))
            .column(ColumnDef::new("A", "Other", CellKind::Text));
        assert!(matches!(
            definition.compile(),
            Err(ConfigError::DuplicateColumn(key)) if key == "A"
        ));
    }

    #[test]
    fn test_compile_builds_one_skeleton_per_column() {
        let sheet = example_definition().compile().unwrap();
        assert_eq!(sheet.model(), "Member");
        assert_eq!(sheet.columns.len(), 6);
        let keys: Vec<&str> = sheet.keys().collect();
        assert_eq!(keys, vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn test_compile_propagates_requiredness() {
        let sheet = example_definition().compile().unwrap();
        let mut id_cell = sheet.columns[0].skeleton.clone();
        id_cell.set_raw("");
        assert!(id_cell.has_error());

        let mut age_cell = sheet.columns[2].skeleton.clone();
        age_cell.set_raw("");
        assert!(!age_cell.has_error());
    }

    #[test]
    fn test_compile_rejects_bad_rule_params() {
        let definition = SheetDefinition::new("M").column(
            ColumnDef::new("A", "Code", CellKind::Text).with_rule(CellRuleSpec::Regex {
                pattern: "([".into(),
                message: None,
            }),
        );
        assert!(matches!(
            definition.compile(),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_compile_rejects_unknown_rule_field() {
        let definition = SheetDefinition::new("M")
            .column(ColumnDef::new("A", "Name", CellKind::Text).with_property("name"))
            .row_rule(RowRuleSpec::Unique {
                fields: vec!["nickname".into()],
                message: None,
            });
        assert!(matches!(
            definition.compile(),
            Err(ConfigError::UnknownRuleField(field)) if field == "nickname"
        ));
    }

    #[test]
    fn test_row_rules_compile_fresh() {
        let definition = SheetDefinition::new("M")
            .column(ColumnDef::new("A", "Name", CellKind::Text))
            .row_rule(RowRuleSpec::Unique {
                fields: vec!["A".into()],
                message: None,
            });
        let first = definition.compile_row_rules().unwrap();
        let second = definition.compile_row_rules().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let definition = example_definition();
        let text = definition.to_json().unwrap();
        let restored = SheetDefinition::from_json(&text).unwrap();
        assert_eq!(definition, restored);
    }

    #[test]
    fn test_example_passes_embedded_schema() {
        let value = serde_json::to_value(example_definition()).unwrap();
        assert!(check_definition(&value).is_ok());
    }

    #[test]
    fn test_from_json_rejects_unknown_cell_type() {
        let text = r#"{
            "model": "M",
            "columns": [
                { "key": "A", "label": "Name", "cell": { "type": "decimal" } }
            ]
        }"#;
        assert!(matches!(
            SheetDefinition::from_json(text),
            Err(ConfigError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_missing_model() {
        let text = r#"{ "columns": [] }"#;
        assert!(SheetDefinition::from_json(text).is_err());
    }

    #[test]
    fn test_from_json_applies_defaults() {
        let text = r#"{
            "model": "M",
            "columns": [
                { "key": "A", "label": "Name", "cell": { "type": "text" } }
            ]
        }"#;
        let definition = SheetDefinition::from_json(text).unwrap();
        assert!(!definition.columns[0].required);
        assert_eq!(definition.columns[0].property_name(), "A");
        assert_eq!(definition.messages, MessageCatalog::default());
    }
}
