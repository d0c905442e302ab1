//! Load a CSV or spreadsheet file into one in-memory DataFrame.

use std::path::Path;

use calamine::{Reader, open_workbook_auto};
use polars::prelude::{CsvReadOptions, DataFrame, SerReader};

use crate::spec::{EnumTableFormat, SpecTableReadOptions, TableReadError};
use crate::util::build_dataframe_from_range;

/// Read `path` into a fully materialized DataFrame.
///
/// The format comes from the filename suffix only (see
/// [`EnumTableFormat::from_path`]); an unsupported suffix fails before the
/// file is touched.
pub fn read_table<P>(path: P, options: &SpecTableReadOptions) -> Result<DataFrame, TableReadError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let enum_format = EnumTableFormat::from_path(path)?;

    let df = if enum_format.is_spreadsheet() {
        read_spreadsheet(path, options)?
    } else {
        read_csv(path, options)?
    };

    log::info!(
        "loaded {} as {}: {} rows x {} columns",
        path.display(),
        enum_format.suffix(),
        df.height(),
        df.width()
    );
    Ok(df)
}

fn read_csv(path: &Path, options: &SpecTableReadOptions) -> Result<DataFrame, TableReadError> {
    let n_separator = options.csv_separator;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(options.infer_schema_length)
        .map_parse_options(|parse_options| parse_options.with_separator(n_separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|source| TableReadError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn read_spreadsheet(
    path: &Path,
    options: &SpecTableReadOptions,
) -> Result<DataFrame, TableReadError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| TableReadError::Spreadsheet {
        path: path.to_path_buf(),
        source,
    })?;

    let l_sheet_names = workbook.sheet_names();
    let Some(c_sheet_name) = l_sheet_names.get(options.sheet_index) else {
        return Err(TableReadError::SheetNotFound {
            index: options.sheet_index,
            count: l_sheet_names.len(),
        });
    };
    log::debug!("reading sheet {c_sheet_name:?} of {}", path.display());

    let range = workbook
        .worksheet_range(c_sheet_name)
        .map_err(|source| TableReadError::Spreadsheet {
            path: path.to_path_buf(),
            source,
        })?;

    build_dataframe_from_range(&range).map_err(|source| TableReadError::Build {
        path: path.to_path_buf(),
        source,
    })
}
