//! High-level import API: grids in, validated rows and typed models out.
//!
//! Functions here combine all steps: grid acquisition, definition
//! compilation, row assembly, cell checks, row-set rules and model binding.
//!
//! # Example
//!
//! ```rust,ignore
//! use sheetload::pipeline::{import_csv_file, ImportOptions};
//!
//! let import = import_csv_file::<Member, _>("members.csv", ImportOptions::default())?;
//! if import.has_errors() {
//!     for (number, messages) in import.error_report() {
//!         eprintln!("Row {}: {}", number, messages.join("; "));
//!     }
//! } else {
//!     println!("Loaded {} members", import.models().len());
//! }
//! ```

use std::path::Path;

use serde_json::Value;

use crate::cell::Cell;
use crate::definition::{CompiledSheet, SheetDefinition};
use crate::error::{ConfigError, ImportError, ImportResult};
use crate::grid::{grid_from_json, read_csv_bytes, read_csv_file, Grid, KeyMode};
use crate::model::RowModel;
use crate::row::Row;
use crate::rules::RowRule;

// =============================================================================
// Options
// =============================================================================

/// Options for an import run.
#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Treat the first grid record as a header and skip it.
    ///
    /// CSV files read with [`KeyMode::HeaderRow`] consume their header while
    /// reading, so this stays `false` for them; grids keyed by column
    /// letters usually still carry the header as their first record.
    pub skip_first_row: bool,

    /// How CSV columns are keyed when an entry point reads CSV itself.
    pub csv_keys: KeyMode,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            skip_first_row: false,
            csv_keys: KeyMode::HeaderRow,
        }
    }
}

// =============================================================================
// Import Result
// =============================================================================

/// Result of a complete import run.
///
/// Rows are always present so the caller can report every problem at once;
/// models exist only when no row carries any error.
#[derive(Debug)]
pub struct Import<M> {
    rows: Vec<Row>,
    models: Vec<M>,
}

impl<M> Import<M> {
    /// Assembled rows in input order, failed ones included.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// One model per row. Empty when any row has errors.
    pub fn models(&self) -> &[M] {
        &self.models
    }

    /// Consume the import, keeping only the models.
    pub fn into_models(self) -> Vec<M> {
        self.models
    }

    /// Whether any row failed any check.
    pub fn has_errors(&self) -> bool {
        self.rows.iter().any(Row::has_errors)
    }

    /// Number of rows without errors.
    pub fn valid_count(&self) -> usize {
        self.rows.len() - self.invalid_count()
    }

    /// Number of rows with at least one error.
    pub fn invalid_count(&self) -> usize {
        self.rows.iter().filter(|row| row.has_errors()).count()
    }

    /// Row number and merged messages for every failed row.
    pub fn error_report(&self) -> Vec<(usize, Vec<String>)> {
        self.rows
            .iter()
            .filter(|row| row.has_errors())
            .map(|row| (row.number(), row.error_messages()))
            .collect()
    }

    /// All rows as a pretty JSON array of `{row, values, errors}` objects.
    pub fn rows_as_json(&self) -> serde_json::Result<String> {
        let rows: Vec<Value> = self.rows.iter().map(Row::to_json).collect();
        serde_json::to_string_pretty(&rows)
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Import a CSV file into typed models.
///
/// This is the main entry point for file imports. It:
/// 1. Reads the CSV with encoding and delimiter detection
/// 2. Compiles the model's sheet definition
/// 3. Assembles one checked row per record
/// 4. Runs row-set rules over the complete run
/// 5. Binds typed values to models when every row is clean
pub fn import_csv_file<M: RowModel, P: AsRef<Path>>(
    path: P,
    options: ImportOptions,
) -> ImportResult<Import<M>> {
    let csv = read_csv_file(path, options.csv_keys)?;
    import_grid(&csv.grid, options)
}

/// Import CSV bytes.
///
/// Same as [`import_csv_file`] but accepts raw bytes instead of a path.
pub fn import_csv_bytes<M: RowModel>(
    bytes: &[u8],
    options: ImportOptions,
) -> ImportResult<Import<M>> {
    let csv = read_csv_bytes(bytes, options.csv_keys)?;
    import_grid(&csv.grid, options)
}

/// Import a JSON array of records.
pub fn import_json_str<M: RowModel>(text: &str, options: ImportOptions) -> ImportResult<Import<M>> {
    let grid = grid_from_json(text)?;
    import_grid(&grid, options)
}

/// Import an already-acquired grid into typed models.
///
/// Useful when the grid comes from somewhere other than CSV or JSON text.
pub fn import_grid<M: RowModel>(grid: &Grid, options: ImportOptions) -> ImportResult<Import<M>> {
    let definition = M::definition();
    let sheet = definition.compile()?;
    let rows = checked_rows(&definition, &sheet, grid, options)?;

    let models = if rows.iter().any(Row::has_errors) {
        Vec::new()
    } else {
        build_models(&rows, &sheet)?
    };

    Ok(Import { rows, models })
}

/// Check a grid against a definition without binding models.
///
/// This drives report-only flows, where the definition comes from a JSON
/// file and no Rust model exists for it.
pub fn validate_grid(
    definition: &SheetDefinition,
    grid: &Grid,
    options: ImportOptions,
) -> ImportResult<Vec<Row>> {
    let sheet = definition.compile()?;
    checked_rows(definition, &sheet, grid, options)
}

// =============================================================================
// Internals
// =============================================================================

/// Internal: assemble rows and run the row-set rules over them.
fn checked_rows(
    definition: &SheetDefinition,
    sheet: &CompiledSheet,
    grid: &Grid,
    options: ImportOptions,
) -> ImportResult<Vec<Row>> {
    let mut rows = assemble_rows(grid, sheet, options.skip_first_row)?;
    apply_row_rules(&mut rows, definition.compile_row_rules()?);
    Ok(rows)
}

/// Internal: one Row per grid record, cells cloned from the skeletons.
///
/// A record missing a configured key aborts the run; partial rows never
/// reach the caller. Row numbers count grid records from 1, so with a
/// skipped header the first data row is number 2.
fn assemble_rows(grid: &Grid, sheet: &CompiledSheet, skip_first_row: bool) -> ImportResult<Vec<Row>> {
    let mut rows = Vec::with_capacity(grid.len());
    for (index, record) in grid.records.iter().enumerate() {
        if skip_first_row && index == 0 {
            continue;
        }
        let number = index + 1;

        let mut cells = Vec::with_capacity(sheet.columns.len());
        for column in &sheet.columns {
            let raw = record
                .get(&column.key)
                .ok_or_else(|| ImportError::MissingColumn {
                    row: number,
                    key: column.key.clone(),
                })?;
            let mut cell = column.skeleton.clone();
            cell.set_raw(raw);
            cells.push((column.key.clone(), cell));
        }
        rows.push(Row::new(number, cells));
    }
    Ok(rows)
}

/// Internal: run row-set rules, attaching each failure to every implicated
/// row.
fn apply_row_rules(rows: &mut [Row], rules: Vec<RowRule>) {
    for mut rule in rules {
        if rule.check(rows) {
            continue;
        }
        let message = rule.message();
        for row in rows.iter_mut() {
            if rule.implicates(row) {
                row.push_error(message.clone());
            }
        }
    }
}

/// Internal: bind one model per row.
///
/// Only non-absent values are offered to setters. A setter refusing its
/// value means the definition and the model disagree on a property's type,
/// which is a configuration mistake, not a data problem.
fn build_models<M: RowModel>(rows: &[Row], sheet: &CompiledSheet) -> ImportResult<Vec<M>> {
    let mut models = Vec::with_capacity(rows.len());
    for row in rows {
        let mut model = M::default();
        for column in &sheet.columns {
            if let Some(value) = row.cell(&column.key).and_then(Cell::value) {
                model
                    .set_value(&column.property, value)
                    .map_err(|source| ConfigError::Binding {
                        model: sheet.model().to_string(),
                        source,
                    })?;
            }
        }
        models.push(model);
    }
    Ok(models)
}
