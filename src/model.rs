//! The model seam: how validated rows become typed structs.
//!
//! There is no reflection or attribute scanning here. A type that wants to
//! be loaded from sheets implements [`RowModel`]: it hands out its own
//! [`SheetDefinition`] and moves values in and out by property name. The
//! trait is the metadata.

use crate::cell::CellValue;
use crate::definition::SheetDefinition;
use crate::error::BindError;

/// A struct that sheet rows load into.
pub trait RowModel: Default {
    /// The sheet definition binding columns to this model's properties.
    fn definition() -> SheetDefinition;

    /// Accept a typed value for `property`.
    ///
    /// Only non-absent values of error-free rows ever arrive here.
    /// Rejecting one (unknown property, wrong value type) is reported as a
    /// configuration error of the whole run, not as a data error.
    fn set_value(&mut self, property: &str, value: CellValue) -> Result<(), BindError>;

    /// Read the live value of `property`, for the reverse pipeline.
    /// `None` means an empty cell.
    fn value(&self, property: &str) -> Option<CellValue>;
}

/// Build the rejection for a property that cannot take `value`.
///
/// ```ignore
/// fn set_value(&mut self, property: &str, value: CellValue) -> Result<(), BindError> {
///     match (property, value) {
///         ("age", CellValue::Integer(age)) => {
///             self.age = Some(age);
///             Ok(())
///         }
///         (_, value) => Err(reject(property, &value)),
///     }
/// }
/// ```
pub fn reject(property: &str, value: &CellValue) -> BindError {
    BindError {
        property: property.to_string(),
        value_type: value.type_name(),
    }
}
