//! Pure helpers behind the writer: cell normalization, sheet naming and
//! Excel-limit slicing.

use std::collections::BTreeSet;

use polars::prelude::TimeUnit;

use crate::conf::{
    C_SHEET_NAME_FALLBACK, C_SHEET_NAME_REPLACEMENT, C_SHEET_NAME_RESERVED,
    N_EXCEL_SERIAL_UNIX_EPOCH, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    N_ROWS_HEADER, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumCellValue, SpecMissingMarkers, SpecSheetSlice, SpecXlsxReport};

////////////////////////////////////////////////////////////////////////////////
// #region Cells

/// Replace missing and non-finite values by blanks, or by marker text when
/// `if_keep_missing_values` is set.
pub fn normalize_cell_value(
    value: EnumCellValue,
    if_keep_missing_values: bool,
    markers: &SpecMissingMarkers,
) -> EnumCellValue {
    let c_marker = match &value {
        EnumCellValue::Blank => markers.null.as_str(),
        EnumCellValue::Number(n) => match markers.for_non_finite(*n) {
            Some(c_marker) => c_marker,
            None => return value,
        },
        EnumCellValue::Text(_) => return value,
    };

    if if_keep_missing_values {
        EnumCellValue::Text(c_marker.to_string())
    } else {
        EnumCellValue::Blank
    }
}

/// Excel serial number of a polars `Date` (days since 1970-01-01).
pub fn convert_days_to_excel_serial(n_days: i32) -> f64 {
    f64::from(n_days) + N_EXCEL_SERIAL_UNIX_EPOCH
}

/// Excel serial number of a polars `Datetime` payload.
pub fn convert_datetime_to_excel_serial(n_value: i64, time_unit: TimeUnit) -> f64 {
    let n_units_per_day = match time_unit {
        TimeUnit::Nanoseconds => 86_400e9,
        TimeUnit::Microseconds => 86_400e6,
        TimeUnit::Milliseconds => 86_400e3,
    };
    n_value as f64 / n_units_per_day + N_EXCEL_SERIAL_UNIX_EPOCH
}

/// Rough display width; non-ASCII characters count as 1.6 columns.
pub fn estimate_display_width(s: &str) -> usize {
    let (n_ascii, n_wide) = s.chars().fold((0usize, 0usize), |(n_ascii, n_wide), chr| {
        if chr.is_ascii() {
            (n_ascii + 1, n_wide)
        } else {
            (n_ascii, n_wide + 1)
        }
    });
    n_ascii + (n_wide as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNames

/// Turn a group label into a legal Excel sheet name.
///
/// Illegal characters become `_`, leading and trailing apostrophes are
/// dropped, an empty result becomes `Sheet`, and the name is cut to 31
/// characters. Whitespace is kept as is.
pub fn sanitize_sheet_name(label: &str) -> String {
    let c_replaced: String = label
        .chars()
        .map(|chr| {
            if TUP_EXCEL_ILLEGAL.contains(&chr) {
                C_SHEET_NAME_REPLACEMENT
            } else {
                chr
            }
        })
        .collect();

    let c_trimmed = c_replaced.trim_matches('\'');
    if c_trimmed.is_empty() {
        return C_SHEET_NAME_FALLBACK.to_string();
    }
    // Excel reserves `History` for its change log.
    if c_trimmed.eq_ignore_ascii_case(C_SHEET_NAME_RESERVED) {
        return format!("{c_trimmed}{C_SHEET_NAME_REPLACEMENT}");
    }
    let c_name: String = c_trimmed.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect();
    c_name.trim_end_matches('\'').to_string()
}

/// Reserve `name`, or the first free `name__2`, `name__3`, ... when taken.
///
/// Names are compared case-insensitively, as Excel does.
pub fn derive_unique_sheet_name(set_names_used: &mut BTreeSet<String>, name: &str) -> String {
    if set_names_used.insert(name.to_lowercase()) {
        return name.to_string();
    }

    (2usize..)
        .map(|n_idx| append_sheet_suffix(name, &format!("__{n_idx}")))
        .find(|c_candidate| set_names_used.insert(c_candidate.to_lowercase()))
        .unwrap_or_else(|| name.to_string())
}

/// `base` + `suffix`, cutting `base` so the result stays within 31 characters.
pub fn append_sheet_suffix(base: &str, suffix: &str) -> String {
    let n_len_base_max = N_LEN_EXCEL_SHEET_NAME_MAX
        .saturating_sub(suffix.chars().count())
        .max(1);
    let c_base: String = base.chars().take(n_len_base_max).collect();
    format!("{c_base}{suffix}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Slicing

fn split_range(n_len: usize, n_step: usize) -> Vec<std::ops::Range<usize>> {
    if n_len == 0 {
        return vec![0..0];
    }
    (0..n_len)
        .step_by(n_step)
        .map(|n_start| n_start..usize::min(n_len, n_start + n_step))
        .collect()
}

/// Cut a `height x width` frame into slices that each fit one worksheet.
///
/// A frame that fits keeps `sheet_name`; otherwise slices are named
/// `<sheet_name>_1`, `<sheet_name>_2`, ... (column blocks first, then row
/// blocks) and a warning is added to `report`. An empty frame still yields
/// one (header-only) slice.
pub fn plan_sheet_slices(
    height: usize,
    width: usize,
    sheet_name: &str,
    report: &mut SpecXlsxReport,
) -> Vec<SpecSheetSlice> {
    let l_row_ranges = split_range(height, N_NROWS_EXCEL_MAX - N_ROWS_HEADER);
    let l_col_ranges = split_range(width, N_NCOLS_EXCEL_MAX);
    let n_parts = l_row_ranges.len() * l_col_ranges.len();

    let l_slices: Vec<SpecSheetSlice> = l_col_ranges
        .iter()
        .flat_map(|cols| l_row_ranges.iter().map(move |rows| (rows.clone(), cols.clone())))
        .enumerate()
        .map(|(n_idx_part, (rows, cols))| SpecSheetSlice {
            sheet_name: if n_parts == 1 {
                sheet_name.to_string()
            } else {
                append_sheet_suffix(sheet_name, &format!("_{}", n_idx_part + 1))
            },
            rows,
            cols,
        })
        .collect();

    if n_parts > 1 {
        report.warn(format!(
            "{sheet_name:?} exceeds the worksheet size limit; split into {n_parts} sheets."
        ));
    }
    l_slices
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
