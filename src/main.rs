//! Sheetload CLI - Validate spreadsheet exports against sheet definitions
//!
//! # Main Commands
//!
//! ```bash
//! sheetload check data.csv -d members.json     # Validate a grid, report per row
//! sheetload reverse data.json -d members.json  # Records back out as CSV
//! ```
//!
//! # Definition Commands
//!
//! ```bash
//! sheetload definition check members.json      # Check a definition file
//! sheetload definition example                 # Print a complete example
//! sheetload rules                              # Show cell types and rules
//! ```

use clap::{Parser, Subcommand};
use serde_json::Value;
use sheetload::{
    check_definition, example_definition, grid_from_json, read_csv_file, reverse_json_records,
    validate_grid, write_csv, Grid, ImportOptions, KeyMode, Row, SheetDefinition,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetload")]
#[command(about = "Validate spreadsheet exports and load them into typed models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a CSV or JSON grid against a sheet definition
    Check {
        /// Input grid: CSV, or a JSON array of records (picked by extension)
        input: PathBuf,

        /// Sheet definition JSON file
        #[arg(short, long)]
        definition: PathBuf,

        /// Key CSV columns by generated letters (A, B, ...) instead of the header row
        #[arg(long)]
        letters: bool,

        /// Skip the first grid record (the header row)
        #[arg(long)]
        skip_first_row: bool,

        /// Write the JSON row report to a file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Reverse JSON records into a CSV through a sheet definition
    Reverse {
        /// Input JSON file (array of {property: value} records)
        input: PathBuf,

        /// Sheet definition JSON file
        #[arg(short, long)]
        definition: PathBuf,

        /// CSV delimiter for the output
        #[arg(long, default_value = ";")]
        delimiter: char,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Work with sheet definition files
    Definition {
        #[command(subcommand)]
        action: DefinitionAction,
    },

    /// Show the cell type and rule reference
    Rules,
}

#[derive(Subcommand)]
enum DefinitionAction {
    /// Check a definition file against the embedded schema
    Check {
        /// Definition JSON file
        file: PathBuf,
    },

    /// Print a complete example definition
    Example,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            input,
            definition,
            letters,
            skip_first_row,
            output,
        } => cmd_check(
            &input,
            &definition,
            letters,
            skip_first_row,
            output.as_deref(),
        ),

        Commands::Reverse {
            input,
            definition,
            delimiter,
            output,
        } => cmd_reverse(&input, &definition, delimiter, output.as_deref()),

        Commands::Definition { action } => cmd_definition(action),

        Commands::Rules => cmd_rules(),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_check(
    input: &Path,
    definition_path: &Path,
    letters: bool,
    skip_first_row: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Checking: {}", input.display());

    let definition = load_definition(definition_path)?;
    eprintln!(
        "   Definition: {} ({} columns)",
        definition.model,
        definition.columns.len()
    );

    let keys = if letters {
        KeyMode::ColumnLetters
    } else {
        KeyMode::HeaderRow
    };
    let grid = load_grid(input, keys)?;
    eprintln!("   Records: {}", grid.len());

    let options = ImportOptions {
        skip_first_row,
        csv_keys: keys,
    };
    let rows = validate_grid(&definition, &grid, options)?;

    let invalid: Vec<&Row> = rows.iter().filter(|row| row.has_errors()).collect();
    if invalid.is_empty() {
        eprintln!("✅ All {} rows valid!", rows.len());
    } else {
        eprintln!("❌ Invalid: {} of {}", invalid.len(), rows.len());
        for row in invalid.iter().take(5) {
            eprintln!("\n   Row {}:", row.number());
            for message in row.error_messages().iter().take(3) {
                eprintln!("     - {}", message);
            }
        }
    }

    let report: Vec<Value> = rows.iter().map(Row::to_json).collect();
    let json = serde_json::to_string_pretty(&report)?;
    write_output(&json, output)?;

    if !invalid.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_reverse(
    input: &Path,
    definition_path: &Path,
    delimiter: char,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📤 Reversing: {}", input.display());

    let definition = load_definition(definition_path)?;
    let content = fs::read_to_string(input)?;
    let records: Vec<Value> = serde_json::from_str(&content)?;
    eprintln!("   {} records", records.len());

    let reversed = reverse_json_records(&definition, &records)?;
    let csv = write_csv(&reversed, delimiter)?;
    write_output(&csv, output)?;

    eprintln!("✅ Reversed {} records", reversed.len());
    Ok(())
}

fn cmd_definition(action: DefinitionAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DefinitionAction::Check { file } => {
            eprintln!("✔️  Checking definition: {}", file.display());

            let content = fs::read_to_string(&file)?;
            let value: Value = serde_json::from_str(&content)?;
            if let Err(errors) = check_definition(&value) {
                eprintln!("❌ Definition is invalid:");
                for err in errors.iter().take(10) {
                    eprintln!("   - {}", err);
                }
                std::process::exit(1);
            }

            // The schema cannot see pattern or date-format mistakes.
            let definition: SheetDefinition = serde_json::from_value(value)?;
            if let Err(e) = definition.compile() {
                eprintln!("❌ Definition does not compile: {}", e);
                std::process::exit(1);
            }
            eprintln!(
                "✅ Definition is valid ({} columns)",
                definition.columns.len()
            );
        }

        DefinitionAction::Example => {
            let definition = example_definition();
            println!("{}", definition.to_json()?);
        }
    }
    Ok(())
}

fn cmd_rules() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", sheetload::reference());
    Ok(())
}

fn load_definition(path: &Path) -> Result<SheetDefinition, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    Ok(SheetDefinition::from_json(&content)?)
}

fn load_grid(input: &Path, keys: KeyMode) -> Result<Grid, Box<dyn std::error::Error>> {
    let is_json = input.extension().and_then(|e| e.to_str()) == Some("json");
    if is_json {
        let content = fs::read_to_string(input)?;
        Ok(grid_from_json(&content)?)
    } else {
        let csv = read_csv_file(input, keys)?;
        eprintln!("   Encoding: {}", csv.encoding);
        eprintln!("   Delimiter: '{}'", format_delimiter(csv.delimiter));
        Ok(csv.grid)
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
