//! Reverse pipeline: typed models back out as raw grid records.
//!
//! Each configured column reads its model property and renders the value
//! the way the cell type expects, so a reversed record imports cleanly
//! again. Records are plain key to string mappings, ready for
//! [`crate::grid::write_csv`] or any other grid writer.

use serde_json::Value;

use crate::cell::CellValue;
use crate::definition::{CompiledSheet, SheetDefinition};
use crate::error::ReverseResult;
use crate::grid::Record;
use crate::model::RowModel;

/// Reverse one model into a raw record.
pub fn reverse_model<M: RowModel>(model: &M) -> ReverseResult<Record> {
    let sheet = M::definition().compile()?;
    reverse_one(&sheet, |property| model.value(property))
}

/// Reverse a batch of models, compiling the definition once.
pub fn reverse_models<M: RowModel>(models: &[M]) -> ReverseResult<Vec<Record>> {
    let sheet = M::definition().compile()?;
    models
        .iter()
        .map(|model| reverse_one(&sheet, |property| model.value(property)))
        .collect()
}

/// Reverse a JSON object of `{property: value}` pairs against a definition.
///
/// This is the no-model path: definitions loaded from JSON files can push
/// records back out without any Rust type existing for them.
pub fn reverse_json_record(definition: &SheetDefinition, record: &Value) -> ReverseResult<Record> {
    let sheet = definition.compile()?;
    reverse_json_one(&sheet, record)
}

/// Reverse a JSON array of records, compiling the definition once.
pub fn reverse_json_records(
    definition: &SheetDefinition,
    records: &[Value],
) -> ReverseResult<Vec<Record>> {
    let sheet = definition.compile()?;
    records
        .iter()
        .map(|record| reverse_json_one(&sheet, record))
        .collect()
}

fn reverse_json_one(sheet: &CompiledSheet, record: &Value) -> ReverseResult<Record> {
    reverse_one(sheet, |property| {
        record.get(property).and_then(CellValue::from_json)
    })
}

fn reverse_one<F>(sheet: &CompiledSheet, value_of: F) -> ReverseResult<Record>
where
    F: Fn(&str) -> Option<CellValue>,
{
    let mut record = Record::new();
    for column in &sheet.columns {
        let value = value_of(&column.property);
        let raw = column.skeleton.kind().reverse(value.as_ref())?;
        record.push(column.key.clone(), raw);
    }
    Ok(record)
}
