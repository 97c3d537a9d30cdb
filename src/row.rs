//! Assembled rows: ordered cells plus row-scoped error messages.

use crate::cell::Cell;
use serde_json::{json, Map, Value};

/// One imported sheet row.
///
/// Cells keep their column order. Row-scoped messages come from row-set
/// rules (for example uniqueness) and live next to the per-cell errors.
#[derive(Debug, Clone)]
pub struct Row {
    number: usize,
    cells: Vec<(String, Cell)>,
    errors: Vec<String>,
}

impl Row {
    pub(crate) fn new(number: usize, cells: Vec<(String, Cell)>) -> Self {
        Self {
            number,
            cells,
            errors: Vec::new(),
        }
    }

    /// 1-based sheet row number, as a user would see it in the source.
    pub fn number(&self) -> usize {
        self.number
    }

    /// The cell under a column key.
    pub fn cell(&self, key: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, cell)| cell)
    }

    /// All cells in column order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(k, cell)| (k.as_str(), cell))
    }

    pub(crate) fn push_error(&mut self, message: String) {
        self.errors.push(message);
    }

    /// Row-scoped messages only (no cell errors).
    pub fn row_errors(&self) -> &[String] {
        &self.errors
    }

    /// Whether any cell failed or any row-scoped message was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || self.cells.iter().any(|(_, cell)| cell.has_error())
    }

    /// Every error of this row: cell errors in column order, then
    /// row-scoped messages.
    pub fn error_messages(&self) -> Vec<String> {
        let mut messages: Vec<String> = self
            .cells
            .iter()
            .filter_map(|(_, cell)| cell.error().map(str::to_string))
            .collect();
        messages.extend(self.errors.iter().cloned());
        messages
    }

    /// JSON report form: raw values under their column keys plus the
    /// merged error list.
    pub fn to_json(&self) -> Value {
        let mut values = Map::new();
        for (key, cell) in &self.cells {
            values.insert(
                key.clone(),
                Value::String(cell.raw().unwrap_or_default().to_string()),
            );
        }
        json!({
            "row": self.number,
            "values": Value::Object(values),
            "errors": self.error_messages(),
        })
    }
}
