//! Whole-column date detection and year extraction.
//!
//! A column is date-typed when its dtype is `Date`/`Datetime`, or when it is a
//! string column whose every non-empty cell parses with one of the fixed
//! formats below. One unparseable cell makes the whole column categorical.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::{Column, DataType, PolarsResult, TimeUnit};

/// Date-time formats, tried in order before the date-only ones.
pub const TUP_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only formats. Slash dates without a leading year are month-first.
pub const TUP_DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%b %d, %Y",
];

/// Day number of 1970-01-01 counted from 0001-01-01 (CE day 1).
const N_DAYS_CE_TO_UNIX_EPOCH: i32 = 719_163;

/// Parse one cell text to a calendar date; `None` when no format matches.
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for c_format in TUP_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, c_format) {
            return Some(dt.date());
        }
    }
    for c_format in TUP_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, c_format) {
            return Some(date);
        }
    }
    None
}

/// Year of a polars `Date` payload (days since the unix epoch).
pub fn derive_year_from_days(n_days: i32) -> Option<i32> {
    n_days
        .checked_add(N_DAYS_CE_TO_UNIX_EPOCH)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(|date| date.year())
}

/// Year of a polars `Datetime` payload.
pub fn derive_year_from_timestamp(n_value: i64, time_unit: TimeUnit) -> Option<i32> {
    let n_ms = match time_unit {
        TimeUnit::Nanoseconds => n_value.div_euclid(1_000_000),
        TimeUnit::Microseconds => n_value.div_euclid(1_000),
        TimeUnit::Milliseconds => n_value,
    };
    DateTime::from_timestamp_millis(n_ms).map(|dt| dt.year())
}

/// Try to read `col` as dates and return the year of every row.
///
/// Returns `Ok(None)` when the column is not date-typed. Missing cells map to
/// `None` inside the returned vector. A string column with no non-empty cell
/// is not date-typed.
pub fn derive_column_years(col: &Column) -> PolarsResult<Option<Vec<Option<i32>>>> {
    let l_years: Vec<Option<i32>> = match col.dtype() {
        DataType::Date => {
            let col_days = col.cast(&DataType::Int32)?;
            col_days
                .as_materialized_series()
                .i32()?
                .into_iter()
                .map(|n_days| n_days.and_then(derive_year_from_days))
                .collect()
        }
        DataType::Datetime(time_unit, _) => {
            let time_unit = *time_unit;
            let col_ts = col.cast(&DataType::Int64)?;
            col_ts
                .as_materialized_series()
                .i64()?
                .into_iter()
                .map(|n_value| n_value.and_then(|n| derive_year_from_timestamp(n, time_unit)))
                .collect()
        }
        DataType::String => match derive_string_years(col)? {
            Some(l_years) => l_years,
            None => return Ok(None),
        },
        _ => return Ok(None),
    };

    log::debug!(
        "column {:?} is date-typed: {} of {} cells carry a date",
        col.name(),
        l_years.iter().flatten().count(),
        col.len()
    );
    Ok(Some(l_years))
}

fn derive_string_years(col: &Column) -> PolarsResult<Option<Vec<Option<i32>>>> {
    let ca = col.as_materialized_series().str()?;
    let mut l_years = Vec::with_capacity(ca.len());
    let mut n_cells_parsed = 0usize;

    for (n_idx_row, c_value) in ca.into_iter().enumerate() {
        let Some(c_value) = c_value.filter(|s| !s.trim().is_empty()) else {
            l_years.push(None);
            continue;
        };
        let Some(date) = parse_date_str(c_value) else {
            log::debug!(
                "column {:?} is categorical: row {n_idx_row} value {c_value:?} is not a date",
                col.name()
            );
            return Ok(None);
        };
        n_cells_parsed += 1;
        l_years.push(Some(date.year()));
    }

    if n_cells_parsed == 0 {
        return Ok(None);
    }
    Ok(Some(l_years))
}
