//! `splitsheet_io_xlsx` v1:
//! Multi-sheet XLSX writer for partitioned tables.
//!
//! Module layout:
//! - `conf`   : Excel limits and default style presets
//! - `spec`   : formats/options/reports/errors
//! - `util`   : sheet naming, slicing and cell normalization
//! - `writer` : rust_xlsxwriter-backed workbook writer
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, derive_default_xlsx_formats,
};
pub use spec::{
    EnumCellValue, EnumColumnKind, EnumHAlign, SpecAutofitPolicy, SpecCellFormat,
    SpecMissingMarkers, SpecScientificPolicy, SpecSheetSlice, SpecXlsxFormats, SpecXlsxReport,
    SpecXlsxSheetWriteOptions, SpecXlsxWriteOptions, XlsxWriteError,
};
pub use util::{plan_sheet_slices, sanitize_sheet_name};
pub use writer::{XlsxWriter, derive_column_kinds};
