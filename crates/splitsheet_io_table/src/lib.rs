//! `splitsheet_io_table` v1:
//! Dataset loader for CSV and spreadsheet inputs.
//!
//! Module layout:
//! - `spec`   : input formats/options/errors
//! - `reader` : format dispatch, polars CSV and calamine workbook readers
//! - `util`   : cell-grid to DataFrame helpers

pub mod reader;
pub mod spec;
pub mod util;

pub use reader::read_table;
pub use spec::{EnumTableFormat, SpecTableReadOptions, TUP_TABLE_SUFFIXES, TableReadError};
