//! Error types for the sheetload import pipeline.
//!
//! This module defines a hierarchy of error types following best practices:
//!
//! - [`ConfigError`] - Sheet definition errors (developer-facing, fail fast)
//! - [`GridError`] - Raw grid acquisition errors (CSV/JSON reading)
//! - [`BindError`] - A model property rejecting a typed value
//! - [`ImportError`] - Top-level orchestration errors
//! - [`ReverseError`] - Typed value to raw cell conversion errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Note that per-cell and per-row *data* problems are not errors in this
//! hierarchy: they accumulate as messages on rows and never abort a run.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors in a sheet definition.
///
/// These are raised when a definition is compiled, before any row is
/// processed, so a misconfigured import never half-runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two columns share the same key.
    #[error("Duplicate column key '{0}' in sheet definition")]
    DuplicateColumn(String),

    /// A rule pattern does not compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    /// A date format string chrono cannot interpret.
    #[error("Invalid date format '{0}'")]
    InvalidDateFormat(String),

    /// A row rule references a property no column is bound to.
    #[error("Rule field '{0}' does not match any configured property")]
    UnknownRuleField(String),

    /// A definition file failed schema or serde checks.
    #[error("Invalid sheet definition: {0}")]
    InvalidDefinition(String),

    /// A model setter rejected a typed value.
    #[error("Model '{model}' rejected a value: {source}")]
    Binding {
        model: String,
        #[source]
        source: BindError,
    },
}

// =============================================================================
// Grid Errors
// =============================================================================

/// Errors while acquiring a raw grid.
#[derive(Debug, Error)]
pub enum GridError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode input bytes.
    #[error("Failed to decode input as {0}")]
    EncodingError(String),

    /// Malformed CSV input.
    #[error("Invalid CSV: {0}")]
    CsvError(#[from] csv::Error),

    /// Malformed JSON input.
    #[error("Invalid JSON grid: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Structurally wrong grid shape.
    #[error("Invalid grid: {0}")]
    ShapeError(String),

    /// Empty grid.
    #[error("Grid is empty")]
    EmptyGrid,
}

// =============================================================================
// Model Binding Errors
// =============================================================================

/// A model property refusing the typed value offered to it.
///
/// Returned by [`crate::model::RowModel::set_value`]. The pipeline wraps it
/// into [`ConfigError::Binding`]: a type mismatch between a column and its
/// property is a definition bug, not a data problem.
#[derive(Debug, Error)]
#[error("property '{property}' cannot accept a {value_type} value")]
pub struct BindError {
    pub property: String,
    pub value_type: &'static str,
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level import orchestration errors.
///
/// This is the main error type returned by [`crate::pipeline::import_grid`].
/// It wraps all lower-level errors and adds the structural variants that
/// abort a run before rows are returned.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Grid acquisition error.
    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    /// Sheet definition error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A record is missing a configured column key.
    #[error("Row {row} has no column '{key}'")]
    MissingColumn { row: usize, key: String },
}

// =============================================================================
// Reverse Errors
// =============================================================================

/// Errors while turning typed values back into raw cells.
#[derive(Debug, Error)]
pub enum ReverseError {
    /// The value type has no raw representation in this cell type.
    #[error("Cannot express a {value_type} value as a raw {cell_type} cell")]
    Unrepresentable {
        cell_type: &'static str,
        value_type: &'static str,
    },

    /// Sheet definition error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for definition operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type for reverse operations.
pub type ReverseResult<T> = Result<T, ReverseError>;
