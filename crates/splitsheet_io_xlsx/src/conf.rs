//! Excel limits and the default style presets.

use crate::spec::{EnumHAlign, SpecCellFormat, SpecXlsxFormats};

/// Rows per worksheet, header included.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Columns per worksheet.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Characters per sheet name.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters Excel refuses in sheet names.
pub const TUP_EXCEL_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];
/// Replacement for [`TUP_EXCEL_ILLEGAL`] characters.
pub const C_SHEET_NAME_REPLACEMENT: char = '_';
/// Name used when a label sanitizes to nothing.
pub const C_SHEET_NAME_FALLBACK: &str = "Sheet";
/// Sheet name Excel keeps for itself, compared case-insensitively.
pub const C_SHEET_NAME_RESERVED: &str = "History";
/// Excel serial day number of 1970-01-01 (1900 date system).
pub const N_EXCEL_SERIAL_UNIX_EPOCH: f64 = 25_569.0;
/// Header rows written above the data.
pub const N_ROWS_HEADER: usize = 1;

fn derive_number_format(
    base: &SpecCellFormat,
    num_format: &str,
    align: EnumHAlign,
) -> SpecCellFormat {
    base.patched(&SpecCellFormat {
        num_format: Some(num_format.to_string()),
        align: Some(align),
        ..Default::default()
    })
}

/// Calibri 11 body cells, bold centered header, one number format per kind.
pub fn derive_default_xlsx_formats() -> SpecXlsxFormats {
    let base = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        border: Some(true),
        align: Some(EnumHAlign::Left),
        ..Default::default()
    };

    SpecXlsxFormats {
        integer: derive_number_format(&base, "0", EnumHAlign::Right),
        decimal: derive_number_format(&base, "0.0000", EnumHAlign::Right),
        scientific: derive_number_format(&base, "0.00E+0", EnumHAlign::Right),
        date: derive_number_format(&base, "yyyy-mm-dd", EnumHAlign::Left),
        datetime: derive_number_format(&base, "yyyy-mm-dd hh:mm:ss", EnumHAlign::Left),
        header: base.patched(&SpecCellFormat {
            bold: Some(true),
            align: Some(EnumHAlign::Center),
            ..Default::default()
        }),
        text: base,
    }
}
