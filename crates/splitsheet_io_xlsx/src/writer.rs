//! Workbook writer: one `write_sheet` call per group, one `close` per run.

use std::collections::BTreeSet;
use std::path::PathBuf;

use polars::prelude::{AnyValue, Column, DataFrame, DataType};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::conf::N_ROWS_HEADER;
use crate::spec::{
    EnumCellValue, EnumColumnKind, EnumHAlign, SpecAutofitPolicy, SpecCellFormat,
    SpecScientificPolicy, SpecSheetSlice, SpecXlsxFormats, SpecXlsxReport,
    SpecXlsxSheetWriteOptions, SpecXlsxWriteOptions, XlsxWriteError,
};
use crate::util::{
    convert_datetime_to_excel_serial, convert_days_to_excel_serial, derive_unique_sheet_name,
    estimate_display_width, normalize_cell_value, plan_sheet_slices, sanitize_sheet_name,
};

/// Buffers a workbook in memory and saves it on [`XlsxWriter::close`].
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    formats: SpecXlsxFormats,
    write_options: SpecXlsxWriteOptions,
    set_sheet_names_used: BTreeSet<String>,
    l_reports: Vec<SpecXlsxReport>,
    if_closed: bool,
}

impl XlsxWriter {
    pub fn new(
        path_file_out: impl Into<PathBuf>,
        formats: SpecXlsxFormats,
        write_options: SpecXlsxWriteOptions,
    ) -> Self {
        Self {
            path_file_out: path_file_out.into(),
            workbook: Workbook::new(),
            formats,
            write_options,
            set_sheet_names_used: BTreeSet::new(),
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    /// Reports of every `write_sheet` call so far, in call order.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Save the workbook. Later calls are no-ops.
    pub fn close(&mut self) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook.save(&self.path_file_out)?;
        self.if_closed = true;
        log::debug!(
            "saved {} ({} sheet(s))",
            self.path_file_out.display(),
            self.set_sheet_names_used.len()
        );
        Ok(())
    }

    /// Append `df` as a new sheet named after `label`.
    ///
    /// The label is sanitized; a name already taken in this workbook gets a
    /// `__N` suffix, and a frame larger than one worksheet is spread over
    /// `<name>_1`, `<name>_2`, ... Both cases add a report warning.
    pub fn write_sheet(
        &mut self,
        df: &DataFrame,
        label: &str,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<(), XlsxWriteError> {
        if self.if_closed {
            return Err(XlsxWriteError::Closed);
        }
        validate_sheet_options(options)?;

        let mut report = SpecXlsxReport {
            label: label.to_string(),
            ..Default::default()
        };
        let l_kinds = derive_column_kinds(df, &options.scientific)?;
        let l_slices = plan_sheet_slices(
            df.height(),
            df.width(),
            &sanitize_sheet_name(label),
            &mut report,
        );

        for slice in l_slices {
            let c_sheet_name =
                derive_unique_sheet_name(&mut self.set_sheet_names_used, &slice.sheet_name);
            if c_sheet_name != slice.sheet_name {
                report.warn(format!(
                    "sheet name {:?} already used; written as {c_sheet_name:?}",
                    slice.sheet_name
                ));
            }

            let worksheet = self.workbook.add_worksheet();
            worksheet.set_name(&c_sheet_name)?;
            write_slice(
                worksheet,
                df,
                &slice,
                &l_kinds[slice.cols.clone()],
                &self.formats,
                &self.write_options,
                options,
            )?;
            report.sheets.push(SpecSheetSlice {
                sheet_name: c_sheet_name,
                ..slice
            });
        }

        for c_warning in &report.warnings {
            log::warn!("{c_warning}");
        }
        self.l_reports.push(report);
        Ok(())
    }
}

// #region SheetBody

fn write_slice(
    worksheet: &mut Worksheet,
    df: &DataFrame,
    slice: &SpecSheetSlice,
    l_kinds: &[EnumColumnKind],
    formats: &SpecXlsxFormats,
    write_options: &SpecXlsxWriteOptions,
    options: &SpecXlsxSheetWriteOptions,
) -> Result<(), XlsxWriteError> {
    let fmt_header = derive_rust_xlsx_format(&formats.header);
    let l_cols: Vec<Column> = df.get_columns()[slice.cols.clone()]
        .iter()
        .map(|col| col.slice(slice.rows.start as i64, slice.height()))
        .collect();

    for (n_idx_col, col) in l_cols.iter().enumerate() {
        worksheet.write_string_with_format(
            0,
            cast_col_num(n_idx_col)?,
            col.name().as_str(),
            &fmt_header,
        )?;
    }
    if options.freeze_header {
        worksheet.set_freeze_panes(cast_row_num(N_ROWS_HEADER)?, 0)?;
    }

    for (n_idx_col, (col, kind)) in l_cols.iter().zip(l_kinds).enumerate() {
        let fmt_body = derive_rust_xlsx_format(
            &formats
                .for_kind(*kind)
                .patched(&write_options.base_format_patch),
        );
        let n_col = cast_col_num(n_idx_col)?;
        for n_idx_row in 0..col.len() {
            let value = normalize_cell_value(
                derive_cell_value_from_any_value(col.get(n_idx_row)?),
                write_options.keep_missing_values,
                &write_options.missing_markers,
            );
            let n_row = cast_row_num(N_ROWS_HEADER + n_idx_row)?;
            match value {
                EnumCellValue::Blank => worksheet.write_blank(n_row, n_col, &fmt_body)?,
                EnumCellValue::Text(s) => {
                    worksheet.write_string_with_format(n_row, n_col, &s, &fmt_body)?
                }
                EnumCellValue::Number(n) => {
                    worksheet.write_number_with_format(n_row, n_col, n, &fmt_body)?
                }
            };
        }
    }

    if options.autofit.enabled {
        for (n_idx_col, col) in l_cols.iter().enumerate() {
            let n_width = derive_fitted_width(col.name().as_str(), &options.autofit);
            worksheet.set_column_width(cast_col_num(n_idx_col)?, n_width as f64)?;
        }
    }
    Ok(())
}

fn derive_fitted_width(header: &str, policy: &SpecAutofitPolicy) -> usize {
    (estimate_display_width(header) + policy.padding)
        .max(policy.width_min)
        .min(policy.width_max)
        .min(255)
}

fn validate_sheet_options(options: &SpecXlsxSheetWriteOptions) -> Result<(), XlsxWriteError> {
    let autofit = &options.autofit;
    if autofit.width_min == 0 || autofit.width_max < autofit.width_min {
        return Err(XlsxWriteError::InvalidOption(format!(
            "autofit widths must satisfy 1 <= min <= max (got min={}, max={})",
            autofit.width_min, autofit.width_max
        )));
    }
    let scientific = &options.scientific;
    if !(scientific.abs_min >= 0.0 && scientific.abs_min <= scientific.abs_max) {
        return Err(XlsxWriteError::InvalidOption(format!(
            "scientific bounds must satisfy 0 <= min <= max (got min={}, max={})",
            scientific.abs_min, scientific.abs_max
        )));
    }
    Ok(())
}

// #endregion
// #region ColumnKinds

/// Decide how every column of `df` is written.
///
/// Dates and datetimes keep their calendar kind; integer dtypes are
/// `Integer`; float columns are `Scientific` when a sampled magnitude falls
/// outside the policy bounds and `Decimal` otherwise; the rest is `Text`.
pub fn derive_column_kinds(
    df: &DataFrame,
    policy: &SpecScientificPolicy,
) -> Result<Vec<EnumColumnKind>, XlsxWriteError> {
    df.get_columns()
        .iter()
        .map(|col| -> Result<EnumColumnKind, XlsxWriteError> {
            let kind = match col.dtype() {
                DataType::Date => EnumColumnKind::Date,
                DataType::Datetime(_, _) => EnumColumnKind::Datetime,
                dtype if dtype.is_integer() => EnumColumnKind::Integer,
                dtype if dtype.is_float() => {
                    if has_scientific_magnitude(col, policy)? {
                        EnumColumnKind::Scientific
                    } else {
                        EnumColumnKind::Decimal
                    }
                }
                _ => EnumColumnKind::Text,
            };
            Ok(kind)
        })
        .collect()
}

fn has_scientific_magnitude(
    col: &Column,
    policy: &SpecScientificPolicy,
) -> Result<bool, XlsxWriteError> {
    if !policy.enabled {
        return Ok(false);
    }
    for n_idx_row in 0..col.len().min(policy.rows_sampled) {
        let Some(n_value) = derive_f64_from_any_value(&col.get(n_idx_row)?) else {
            continue;
        };
        let n_abs = n_value.abs();
        let if_out_of_bounds = n_abs >= policy.abs_max || (n_abs > 0.0 && n_abs < policy.abs_min);
        if n_abs.is_finite() && if_out_of_bounds {
            return Ok(true);
        }
    }
    Ok(false)
}

fn derive_f64_from_any_value(value: &AnyValue<'_>) -> Option<f64> {
    let n_value = match *value {
        AnyValue::Int8(n) => f64::from(n),
        AnyValue::Int16(n) => f64::from(n),
        AnyValue::Int32(n) => f64::from(n),
        AnyValue::Int64(n) => n as f64,
        AnyValue::UInt8(n) => f64::from(n),
        AnyValue::UInt16(n) => f64::from(n),
        AnyValue::UInt32(n) => f64::from(n),
        AnyValue::UInt64(n) => n as f64,
        AnyValue::Float32(n) => f64::from(n),
        AnyValue::Float64(n) => n,
        _ => return None,
    };
    Some(n_value)
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::Blank,
        AnyValue::String(s) => EnumCellValue::Text(s.to_string()),
        AnyValue::StringOwned(s) => EnumCellValue::Text(s.to_string()),
        AnyValue::Boolean(b) => EnumCellValue::Text(if b { "True" } else { "False" }.to_string()),
        AnyValue::Date(n_days) => EnumCellValue::Number(convert_days_to_excel_serial(n_days)),
        AnyValue::Datetime(n_value, time_unit, _) => {
            EnumCellValue::Number(convert_datetime_to_excel_serial(n_value, time_unit))
        }
        other => match derive_f64_from_any_value(&other) {
            Some(n) => EnumCellValue::Number(n),
            None => EnumCellValue::Text(other.to_string()),
        },
    }
}

// #endregion
// #region Backend

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();
    if let Some(c_font) = &spec.font_name {
        format = format.set_font_name(c_font.as_str());
    }
    if let Some(n_size) = spec.font_size {
        format = format.set_font_size(f64::from(n_size));
    }
    if spec.bold == Some(true) {
        format = format.set_bold();
    }
    if let Some(if_border) = spec.border {
        format = format.set_border(if if_border {
            FormatBorder::Thin
        } else {
            FormatBorder::None
        });
    }
    if let Some(align) = spec.align {
        format = format.set_align(match align {
            EnumHAlign::Left => FormatAlign::Left,
            EnumHAlign::Center => FormatAlign::Center,
            EnumHAlign::Right => FormatAlign::Right,
        });
    }
    if let Some(c_num_format) = &spec.num_format {
        format = format.set_num_format(c_num_format.as_str());
    }
    format.set_align(FormatAlign::VerticalCenter)
}

fn cast_row_num(value: usize) -> Result<u32, XlsxWriteError> {
    u32::try_from(value).map_err(|_| XlsxWriteError::IndexOverflow { axis: "row", value })
}

fn cast_col_num(value: usize) -> Result<u16, XlsxWriteError> {
    u16::try_from(value).map_err(|_| XlsxWriteError::IndexOverflow { axis: "column", value })
}

// #endregion
