//! Formats, write options, sheet reports and writer errors.

use std::ops::Range;

use polars::prelude::PolarsError;
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region Formats

/// Horizontal alignment of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumHAlign {
    /// Flush left.
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Backend-independent cell style; turned into a `rust_xlsxwriter::Format`
/// once per column and sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family, e.g. `Calibri`.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<u8>,
    /// Bold font.
    pub bold: Option<bool>,
    /// Thin border on all four sides.
    pub border: Option<bool>,
    /// Horizontal alignment.
    pub align: Option<EnumHAlign>,
    /// Excel number format code, e.g. `0.0000` or `yyyy-mm-dd`.
    pub num_format: Option<String>,
}

impl SpecCellFormat {
    /// `self` with every field set in `patch` taking precedence.
    pub fn patched(&self, patch: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: patch.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: patch.font_size.or(self.font_size),
            bold: patch.bold.or(self.bold),
            border: patch.border.or(self.border),
            align: patch.align.or(self.align),
            num_format: patch.num_format.clone().or_else(|| self.num_format.clone()),
        }
    }
}

/// One style per column kind, plus the header row style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxFormats {
    /// Strings, booleans and anything else written as text.
    pub text: SpecCellFormat,
    /// Integer columns.
    pub integer: SpecCellFormat,
    /// Float columns in the ordinary magnitude range.
    pub decimal: SpecCellFormat,
    /// Float columns flagged by [`SpecScientificPolicy`].
    pub scientific: SpecCellFormat,
    /// `Date` columns.
    pub date: SpecCellFormat,
    /// `Datetime` columns.
    pub datetime: SpecCellFormat,
    /// Header row.
    pub header: SpecCellFormat,
}

impl SpecXlsxFormats {
    /// Body style of a column kind.
    pub fn for_kind(&self, kind: EnumColumnKind) -> &SpecCellFormat {
        match kind {
            EnumColumnKind::Text => &self.text,
            EnumColumnKind::Integer => &self.integer,
            EnumColumnKind::Decimal => &self.decimal,
            EnumColumnKind::Scientific => &self.scientific,
            EnumColumnKind::Date => &self.date,
            EnumColumnKind::Datetime => &self.datetime,
        }
    }
}

impl Default for SpecXlsxFormats {
    fn default() -> Self {
        crate::conf::derive_default_xlsx_formats()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Cells

/// A cell value ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Empty cell.
    Blank,
    /// String cell.
    Text(String),
    /// Numbers, and dates as Excel serial numbers.
    Number(f64),
}

/// How a whole column is written and formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumColumnKind {
    /// Written as strings.
    Text,
    /// Integer dtypes.
    Integer,
    /// Float dtypes.
    Decimal,
    /// Float column holding very large or very small magnitudes.
    Scientific,
    /// Polars `Date`.
    Date,
    /// Polars `Datetime`.
    Datetime,
}

/// Text written in place of missing or non-finite values when
/// [`SpecXlsxWriteOptions::keep_missing_values`] is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMissingMarkers {
    /// Null cells.
    pub null: String,
    /// NaN floats.
    pub nan: String,
    /// Positive infinity.
    pub inf_pos: String,
    /// Negative infinity.
    pub inf_neg: String,
}

impl SpecMissingMarkers {
    /// Marker of a non-finite float; `None` for finite values.
    pub fn for_non_finite(&self, n_value: f64) -> Option<&str> {
        if n_value.is_nan() {
            Some(&self.nan)
        } else if n_value == f64::INFINITY {
            Some(&self.inf_pos)
        } else if n_value == f64::NEG_INFINITY {
            Some(&self.inf_neg)
        } else {
            None
        }
    }
}

impl Default for SpecMissingMarkers {
    fn default() -> Self {
        Self {
            null: "NA".to_string(),
            nan: "NaN".to_string(),
            inf_pos: "Inf".to_string(),
            inf_neg: "-Inf".to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// When a float column switches to the scientific number format.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecScientificPolicy {
    /// Turn detection on or off.
    pub enabled: bool,
    /// Non-zero magnitudes below this trigger scientific format.
    pub abs_min: f64,
    /// Magnitudes at or above this trigger scientific format.
    pub abs_max: f64,
    /// Leading rows inspected per column.
    pub rows_sampled: usize,
}

impl Default for SpecScientificPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            abs_min: 1e-4,
            abs_max: 1e12,
            rows_sampled: 20_000,
        }
    }
}

/// Header-based column width fitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitPolicy {
    /// Turn fitting on or off.
    pub enabled: bool,
    /// Narrowest column width, in characters.
    pub width_min: usize,
    /// Widest column width, in characters.
    pub width_max: usize,
    /// Characters added to the header width.
    pub padding: usize,
}

impl Default for SpecAutofitPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            width_min: 8,
            width_max: 60,
            padding: 2,
        }
    }
}

/// Options shared by every sheet of one writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Write missing/NaN/Inf as marker text instead of blank cells.
    pub keep_missing_values: bool,
    /// Marker text used when `keep_missing_values` is on.
    pub missing_markers: SpecMissingMarkers,
    /// Applied on top of every body format.
    pub base_format_patch: SpecCellFormat,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            keep_missing_values: false,
            missing_markers: SpecMissingMarkers::default(),
            base_format_patch: SpecCellFormat {
                border: Some(false),
                ..Default::default()
            },
        }
    }
}

/// Options of one `write_sheet` call.
#[derive(Debug, Clone)]
pub struct SpecXlsxSheetWriteOptions {
    /// Freeze the header row.
    pub freeze_header: bool,
    /// Column width fitting.
    pub autofit: SpecAutofitPolicy,
    /// Scientific number format detection.
    pub scientific: SpecScientificPolicy,
}

impl Default for SpecXlsxSheetWriteOptions {
    fn default() -> Self {
        Self {
            freeze_header: true,
            autofit: SpecAutofitPolicy::default(),
            scientific: SpecScientificPolicy::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Reports

/// Part of a DataFrame that landed on one worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSlice {
    /// Final, unique sheet name.
    pub sheet_name: String,
    /// Source rows, header excluded.
    pub rows: Range<usize>,
    /// Source columns.
    pub cols: Range<usize>,
}

impl SpecSheetSlice {
    /// Data rows on the sheet, header excluded.
    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// What one `write_sheet` call produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Label passed by the caller, before sanitizing.
    pub label: String,
    /// Sheets written for the label, in workbook order.
    pub sheets: Vec<SpecSheetSlice>,
    /// Renames and splits the caller may want to surface.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Record a warning.
    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures raised while building or saving the workbook.
#[derive(Debug, Error)]
pub enum XlsxWriteError {
    /// Backend rejected a call or could not save the file.
    #[error("xlsx backend error: {0}")]
    Xlsx(#[from] XlsxError),
    /// A source column could not be read.
    #[error("failed to read source cell: {0}")]
    Polars(#[from] PolarsError),
    /// Sheet options out of range.
    #[error("invalid sheet option: {0}")]
    InvalidOption(String),
    /// Row or column index past the Excel address space.
    #[error("{axis} index {value} does not fit in a worksheet")]
    IndexOverflow {
        /// `row` or `column`.
        axis: &'static str,
        /// Offending zero-based index.
        value: usize,
    },
    /// `write_sheet` after `close`.
    #[error("workbook already saved")]
    Closed,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
