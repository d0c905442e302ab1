//! Pipeline configuration, run report and error aggregation.

use std::fmt;
use std::path::PathBuf;

use splitsheet_io_table::{SpecTableReadOptions, TableReadError};
use splitsheet_io_xlsx::{SpecXlsxSheetWriteOptions, SpecXlsxWriteOptions, XlsxWriteError};
use splitsheet_partition::{EnumPartitionMode, PartitionError};
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region Config

/// Everything one pipeline run needs. Passed explicitly through the stages.
#[derive(Debug, Clone)]
pub struct SpecSplitConfig {
    /// Input table (`.csv`, `.xlsx`, `.xls`, `.ods`).
    pub path_file_in: PathBuf,
    /// Output workbook; overwritten when present.
    pub path_file_out: PathBuf,
    /// Group by this column.
    pub column_name: Option<String>,
    /// Or chunk by this many rows.
    pub number: Option<usize>,
    /// Loader options.
    pub read_options: SpecTableReadOptions,
    /// Writer-wide options.
    pub write_options: SpecXlsxWriteOptions,
    /// Per-sheet options, shared by every group sheet.
    pub sheet_options: SpecXlsxSheetWriteOptions,
}

impl SpecSplitConfig {
    /// Config with default loader/writer options and no partition mode set.
    pub fn new(path_file_in: impl Into<PathBuf>, path_file_out: impl Into<PathBuf>) -> Self {
        Self {
            path_file_in: path_file_in.into(),
            path_file_out: path_file_out.into(),
            column_name: None,
            number: None,
            read_options: SpecTableReadOptions::default(),
            write_options: SpecXlsxWriteOptions::default(),
            sheet_options: SpecXlsxSheetWriteOptions::default(),
        }
    }

    /// Group rows by `column_name`.
    pub fn with_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = Some(column_name.into());
        self
    }

    /// Chunk rows by `number`.
    pub fn with_number(mut self, number: usize) -> Self {
        self.number = Some(number);
        self
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Report

/// Outcome of one successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSplit {
    /// Written workbook.
    pub path_file_out: PathBuf,
    /// Partition branch taken.
    pub mode: EnumPartitionMode,
    /// Rows loaded from the input.
    pub n_rows: usize,
    /// Group labels, in sheet order.
    pub l_labels: Vec<String>,
    /// Sheet names actually emitted (after sanitizing and deduplication).
    pub l_sheets: Vec<String>,
    /// Writer warnings (renamed or split sheets).
    pub warnings: Vec<String>,
}

impl fmt::Display for ReportSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Data has been split and saved to {}",
            self.path_file_out.display()
        )
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Any failure of the pipeline. Nothing is retried.
#[derive(Debug, Error)]
pub enum SplitSheetError {
    /// Input could not be loaded.
    #[error(transparent)]
    Read(#[from] TableReadError),
    /// Bad directive or missing grouping column.
    #[error(transparent)]
    Partition(#[from] PartitionError),
    /// Building or saving the output workbook failed.
    #[error("Failed to write output workbook {}: {source}", .path.display())]
    WriteFailed {
        /// Output path.
        path: PathBuf,
        /// Backend failure.
        source: XlsxWriteError,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
