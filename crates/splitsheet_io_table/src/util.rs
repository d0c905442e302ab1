//! Stateless helpers that turn a calamine cell grid into polars columns.

use std::collections::HashSet;

use calamine::{Data, Range};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::{Column, DataFrame, DataType, NamedFrom, PolarsResult, Series, TimeUnit};

/// Excel serial day number of 1970-01-01 (1900 date system).
const N_EXCEL_SERIAL_UNIX_EPOCH: f64 = 25_569.0;
const N_MS_PER_DAY: f64 = 86_400_000.0;

////////////////////////////////////////////////////////////////////////////////
// #region HeaderNormalization

/// Derive unique column names from the header row.
///
/// Empty cells become `Unnamed: <idx>`; repeated names get `.1`, `.2`, ...
/// suffixes in order of appearance.
pub fn derive_column_names(header_cells: &[Data]) -> Vec<String> {
    let mut set_names_used: HashSet<String> = HashSet::new();
    let mut l_names = Vec::with_capacity(header_cells.len());

    for (n_idx_col, cell) in header_cells.iter().enumerate() {
        let c_name_base =
            render_cell_text(cell).unwrap_or_else(|| format!("Unnamed: {n_idx_col}"));

        let mut c_name = c_name_base.clone();
        let mut n_dup = 0usize;
        while set_names_used.contains(&c_name) {
            n_dup += 1;
            c_name = format!("{c_name_base}.{n_dup}");
        }
        set_names_used.insert(c_name.clone());
        l_names.push(c_name);
    }

    l_names
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellConversion

/// Render one cell as text; `None` for empty cells.
pub fn render_cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(n) => Some(n.to_string()),
        Data::Float(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => Some(
            derive_datetime_from_serial(dt.as_f64())
                .map(|dt_naive| dt_naive.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| dt.as_f64().to_string()),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(err) => Some(format!("#{err:?}")),
    }
}

/// Convert an Excel serial number to a naive datetime.
pub fn derive_datetime_from_serial(serial: f64) -> Option<NaiveDateTime> {
    let n_ms = derive_epoch_ms_from_serial(serial)?;
    chrono::DateTime::from_timestamp_millis(n_ms).map(|dt| dt.naive_utc())
}

fn derive_epoch_ms_from_serial(serial: f64) -> Option<i64> {
    if !serial.is_finite() {
        return None;
    }
    Some(((serial - N_EXCEL_SERIAL_UNIX_EPOCH) * N_MS_PER_DAY).round() as i64)
}

/// Parse the ISO strings calamine emits for ODS date cells.
pub fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn derive_epoch_ms(cell: &Data) -> Option<i64> {
    match cell {
        Data::DateTime(dt) => derive_epoch_ms_from_serial(dt.as_f64()),
        Data::DateTimeIso(s) => parse_iso_datetime(s).map(|dt| dt.and_utc().timestamp_millis()),
        _ => None,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnTyping

/// Column dtype inferred from the non-empty cells of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumInferredKind {
    /// Every cell is an integer.
    Integer,
    /// Every cell is a number, at least one not integral in storage.
    Float,
    /// Every cell is a boolean.
    Boolean,
    /// Every cell is a date or datetime.
    Datetime,
    /// Anything else, including all-empty columns.
    Text,
}

/// Infer the dtype of one column from its cells.
pub fn infer_column_kind(cells: &[&Data]) -> EnumInferredKind {
    let mut enum_kind: Option<EnumInferredKind> = None;

    for cell in cells {
        let enum_kind_cell = match cell {
            Data::Empty => continue,
            Data::String(s) if s.is_empty() => continue,
            Data::Int(_) => EnumInferredKind::Integer,
            Data::Float(_) => EnumInferredKind::Float,
            Data::Bool(_) => EnumInferredKind::Boolean,
            Data::DateTime(_) => EnumInferredKind::Datetime,
            Data::DateTimeIso(s) if parse_iso_datetime(s).is_some() => EnumInferredKind::Datetime,
            _ => return EnumInferredKind::Text,
        };

        enum_kind = Some(match (enum_kind, enum_kind_cell) {
            (None, kind) => kind,
            (Some(prev), kind) if prev == kind => kind,
            (Some(EnumInferredKind::Integer), EnumInferredKind::Float)
            | (Some(EnumInferredKind::Float), EnumInferredKind::Integer) => EnumInferredKind::Float,
            _ => return EnumInferredKind::Text,
        });
    }

    enum_kind.unwrap_or(EnumInferredKind::Text)
}

/// Build one typed polars column from the cells below the header.
pub fn derive_column_from_cells(name: &str, cells: &[&Data]) -> PolarsResult<Column> {
    let column = match infer_column_kind(cells) {
        EnumInferredKind::Integer => {
            let l_values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(n) => Some(*n),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), l_values)
        }
        EnumInferredKind::Float => {
            let l_values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Int(n) => Some(*n as f64),
                    Data::Float(n) => Some(*n),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), l_values)
        }
        EnumInferredKind::Boolean => {
            let l_values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), l_values)
        }
        EnumInferredKind::Datetime => {
            let l_values: Vec<Option<i64>> =
                cells.iter().map(|cell| derive_epoch_ms(cell)).collect();
            let series = Series::new(name.into(), l_values)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
            Column::from(series)
        }
        EnumInferredKind::Text => {
            let l_values: Vec<Option<String>> =
                cells.iter().map(|cell| render_cell_text(cell)).collect();
            Column::new(name.into(), l_values)
        }
    };
    Ok(column)
}

/// Build a DataFrame from a worksheet range whose first row is the header.
pub fn build_dataframe_from_range(range: &Range<Data>) -> PolarsResult<DataFrame> {
    let mut iter_rows = range.rows();
    let Some(header_cells) = iter_rows.next() else {
        return Ok(DataFrame::empty());
    };

    let l_names = derive_column_names(header_cells);
    let l_rows: Vec<&[Data]> = iter_rows.collect();

    let mut l_columns = Vec::with_capacity(l_names.len());
    for (n_idx_col, c_name) in l_names.iter().enumerate() {
        let l_cells: Vec<&Data> = l_rows
            .iter()
            .map(|row| row.get(n_idx_col).unwrap_or(&Data::Empty))
            .collect();
        l_columns.push(derive_column_from_cells(c_name, &l_cells)?);
    }

    DataFrame::new(l_columns)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_column_names_fills_empty_and_mangles_duplicates() {
        let l_header = vec![
            Data::String("a".to_string()),
            Data::Empty,
            Data::String("a".to_string()),
            Data::String("a".to_string()),
            Data::Float(2020.0),
        ];
        assert_eq!(
            derive_column_names(&l_header),
            vec!["a", "Unnamed: 1", "a.1", "a.2", "2020"]
        );
    }

    #[test]
    fn test_infer_column_kind() {
        let n_int = Data::Int(1);
        let n_float = Data::Float(1.5);
        let b_true = Data::Bool(true);
        let c_text = Data::String("x".to_string());
        let c_iso = Data::DateTimeIso("2021-05-06".to_string());
        let empty = Data::Empty;

        assert_eq!(infer_column_kind(&[&n_int, &empty]), EnumInferredKind::Integer);
        assert_eq!(infer_column_kind(&[&n_int, &n_float]), EnumInferredKind::Float);
        assert_eq!(infer_column_kind(&[&b_true]), EnumInferredKind::Boolean);
        assert_eq!(infer_column_kind(&[&c_iso, &empty]), EnumInferredKind::Datetime);
        assert_eq!(infer_column_kind(&[&n_int, &c_text]), EnumInferredKind::Text);
        assert_eq!(infer_column_kind(&[&b_true, &n_int]), EnumInferredKind::Text);
        assert_eq!(infer_column_kind(&[&empty]), EnumInferredKind::Text);
    }

    #[test]
    fn test_derive_datetime_from_serial() {
        let dt = derive_datetime_from_serial(43_831.5).expect("datetime");
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2020-01-01 12:00");
    }

    #[test]
    fn test_parse_iso_datetime_variants() {
        assert!(parse_iso_datetime("2021-05-06").is_some());
        assert!(parse_iso_datetime("2021-05-06T07:08:09").is_some());
        assert!(parse_iso_datetime("2021-05-06 07:08:09.5").is_some());
        assert!(parse_iso_datetime("PT1H").is_none());
    }

    #[test]
    fn test_derive_column_from_cells_typed() {
        let l_data = [Data::Int(1), Data::Empty, Data::Int(3)];
        let l_cells: Vec<&Data> = l_data.iter().collect();
        let col = derive_column_from_cells("n", &l_cells).expect("column");
        assert_eq!(col.dtype(), &DataType::Int64);
        assert_eq!(col.null_count(), 1);

        let l_data = [Data::DateTimeIso("2020-01-01".to_string())];
        let l_cells: Vec<&Data> = l_data.iter().collect();
        let col = derive_column_from_cells("d", &l_cells).expect("column");
        assert_eq!(
            col.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
    }
}
