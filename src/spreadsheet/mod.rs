//! # Spreadsheet Processing Module
//!
//! Reads Excel 2007+ workbooks (`.xlsx`, `.xlsm`) directly from their ZIP/XML parts
//! and turns one named worksheet into a [`Table`](crate::table::Table). Cell types are
//! detected from the cell type attribute and the workbook's number formats, so date
//! cells come back as calendar dates in either the 1900 or the 1904 date system.
use thiserror::Error;

pub(crate) mod cell;
pub(crate) mod excel;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Workbook contains no worksheets")]
    SpreadsheetEmptyError,

    #[error("Sheet '{0}' not found, available sheets: {1:?}")]
    SheetNotFoundError(String, Vec<String>),

    #[error("Workbook part '{0}' is missing")]
    MissingPartError(String),

    #[error("Shared string #{0} is out of range")]
    SharedStringError(usize),
}
