//! Strictly sequential split pipeline: load, partition, write, close.

use splitsheet_io_table::read_table;
use splitsheet_io_xlsx::{SpecXlsxFormats, XlsxWriteError, XlsxWriter};
use splitsheet_partition::{EnumPartitionDirective, partition};

use crate::spec::{ReportSplit, SpecSplitConfig, SplitSheetError};

/// Split `config.path_file_in` into the sheets of `config.path_file_out`.
///
/// The input is loaded before the directive is checked, so a missing input
/// is reported even when the flags are also wrong. Nothing is written unless
/// loading and partitioning both succeed.
pub fn run(config: &SpecSplitConfig) -> Result<ReportSplit, SplitSheetError> {
    let df = read_table(&config.path_file_in, &config.read_options)?;

    let directive =
        EnumPartitionDirective::from_options(config.number, config.column_name.clone())?;
    let result = partition(&df, &directive)?;

    let wrap_write_err = |source: XlsxWriteError| SplitSheetError::WriteFailed {
        path: config.path_file_out.clone(),
        source,
    };

    let mut writer = XlsxWriter::new(
        &config.path_file_out,
        SpecXlsxFormats::default(),
        config.write_options.clone(),
    );
    for group in &result {
        writer
            .write_sheet(&group.df, &group.label(), &config.sheet_options)
            .map_err(wrap_write_err)?;
    }
    writer.close().map_err(wrap_write_err)?;

    let l_reports = writer.report();
    let l_sheets: Vec<String> = l_reports
        .iter()
        .flat_map(|report| report.sheets.iter().map(|slice| slice.sheet_name.clone()))
        .collect();
    let warnings: Vec<String> = l_reports
        .into_iter()
        .flat_map(|report| report.warnings)
        .collect();
    log::info!(
        "wrote {} sheet(s) to {}",
        l_sheets.len(),
        config.path_file_out.display()
    );

    Ok(ReportSplit {
        path_file_out: config.path_file_out.clone(),
        mode: result.mode,
        n_rows: df.height(),
        l_labels: result.labels(),
        l_sheets,
        warnings,
    })
}
