//! Input formats, read options and loader errors.

use std::path::{Path, PathBuf};

use polars::prelude::PolarsError;
use thiserror::Error;

/// Supported input suffixes, matched case-insensitively.
pub const TUP_TABLE_SUFFIXES: [&str; 4] = [".csv", ".xlsx", ".xls", ".ods"];

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Input file format, chosen purely by filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumTableFormat {
    /// Comma (or custom separator) delimited text.
    Csv,
    /// Office Open XML workbook.
    Xlsx,
    /// Legacy BIFF workbook.
    Xls,
    /// OpenDocument spreadsheet.
    Ods,
}

impl EnumTableFormat {
    /// Detect the format from the suffix of `path`.
    ///
    /// No content sniffing is done: `data.csv` holding XLSX bytes is read as
    /// CSV and fails there.
    pub fn from_path(path: &Path) -> Result<Self, TableReadError> {
        let c_path_lower = path.to_string_lossy().to_lowercase();
        for enum_format in [Self::Csv, Self::Xlsx, Self::Xls, Self::Ods] {
            if c_path_lower.ends_with(enum_format.suffix()) {
                return Ok(enum_format);
            }
        }
        Err(TableReadError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }

    /// Canonical lowercase suffix, dot included.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Xlsx => ".xlsx",
            Self::Xls => ".xls",
            Self::Ods => ".ods",
        }
    }

    /// Whether the format is a workbook read through calamine.
    pub fn is_spreadsheet(self) -> bool {
        !matches!(self, Self::Csv)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Options for [`crate::reader::read_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTableReadOptions {
    /// CSV field separator.
    pub csv_separator: u8,
    /// Rows used for CSV schema inference; `None` scans the whole file.
    pub infer_schema_length: Option<usize>,
    /// Zero-based worksheet index for spreadsheet inputs.
    pub sheet_index: usize,
}

impl Default for SpecTableReadOptions {
    fn default() -> Self {
        Self {
            csv_separator: b',',
            infer_schema_length: None,
            sheet_index: 0,
        }
    }
}

/// Dataset loading failures.
#[derive(Debug, Error)]
pub enum TableReadError {
    /// Suffix is not one of [`TUP_TABLE_SUFFIXES`].
    #[error(
        "Unsupported file format: {}. Please provide a {} file.",
        .path.display(),
        TUP_TABLE_SUFFIXES.join(", ")
    )]
    UnsupportedFormat {
        /// Rejected input path.
        path: PathBuf,
    },
    /// polars failed to parse the CSV file.
    #[error("Failed to read CSV {}: {source}", .path.display())]
    Csv {
        /// Input path.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: PolarsError,
    },
    /// calamine failed to open or parse the workbook.
    #[error("Failed to read spreadsheet {}: {source}", .path.display())]
    Spreadsheet {
        /// Input path.
        path: PathBuf,
        /// Underlying reader error.
        #[source]
        source: calamine::Error,
    },
    /// Requested worksheet index does not exist.
    #[error("Sheet index {index} out of range: workbook has {count} sheet(s)")]
    SheetNotFound {
        /// Requested zero-based index.
        index: usize,
        /// Number of sheets in the workbook.
        count: usize,
    },
    /// Cells could not be assembled into a DataFrame.
    #[error("Failed to build table from {}: {source}", .path.display())]
    Build {
        /// Input path.
        path: PathBuf,
        /// Underlying polars error.
        #[source]
        source: PolarsError,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
