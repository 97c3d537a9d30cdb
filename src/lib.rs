//! # Sheetload - spreadsheet imports into typed Rust models
//!
//! Sheetload validates spreadsheet exports (CSV or JSON grids) against a
//! declarative sheet definition and loads clean rows into typed models.
//! Cell and row failures are collected and reported per row; models are
//! only built from runs with zero errors.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV / JSON │────▶│    Grid     │────▶│    Rows     │────▶│   Models    │
//! │ (ISO/UTF8)  │     │ (raw cells) │     │  (checked)  │     │   (typed)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sheetload::{import_csv_file, ImportOptions};
//!
//! let import = import_csv_file::<Member, _>("members.csv", ImportOptions::default())?;
//! if import.has_errors() {
//!     eprintln!("{}", import.rows_as_json()?);
//! } else {
//!     println!("Loaded {} members", import.models().len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`grid`] - Raw grid acquisition (CSV with auto-detection, JSON)
//! - [`cell`] - Typed cells and cell kinds
//! - [`rules`] - Cell rules, row-set rules and message templates
//! - [`definition`] - Sheet definitions and their compilation
//! - [`model`] - The trait imported models implement
//! - [`row`] - Assembled rows and their reports
//! - [`pipeline`] - End-to-end import runs
//! - [`reverse`] - Models back out as raw records

// Core modules
pub mod error;
pub mod model;
pub mod row;

// Grid acquisition
pub mod grid;

// Cells and rules
pub mod cell;
pub mod rules;

// Definitions
pub mod definition;

// Pipelines
pub mod pipeline;
pub mod reverse;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    BindError,
    ConfigError,
    ConfigResult,
    GridError,
    GridResult,
    ImportError,
    ImportResult,
    ReverseError,
    ReverseResult,
};

// =============================================================================
// Re-exports - Grid
// =============================================================================

pub use grid::{
    column_letter,
    decode_content,
    detect_delimiter,
    detect_encoding,
    grid_from_json,
    read_csv_bytes,
    read_csv_file,
    read_csv_str,
    write_csv,
    write_csv_file,
    CsvGrid,
    Grid,
    KeyMode,
    Record,
};

// =============================================================================
// Re-exports - Cells
// =============================================================================

pub use cell::{Cell, CellKind, CellValue};

// =============================================================================
// Re-exports - Rules
// =============================================================================

pub use rules::{
    reference,
    render,
    CellRule,
    CellRuleSpec,
    MessageCatalog,
    RowRule,
    RowRuleSpec,
    UniqueRule,
};

// =============================================================================
// Re-exports - Definitions
// =============================================================================

pub use definition::{
    check_definition,
    example_definition,
    ColumnDef,
    CompiledSheet,
    SheetDefinition,
};

// =============================================================================
// Re-exports - Models and Rows
// =============================================================================

pub use model::{reject, RowModel};
pub use row::Row;

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    import_csv_bytes,
    import_csv_file,
    import_grid,
    import_json_str,
    validate_grid,
    Import,
    ImportOptions,
};

// =============================================================================
// Re-exports - Reverse
// =============================================================================

pub use reverse::{reverse_json_record, reverse_json_records, reverse_model, reverse_models};
