//! Split one DataFrame into ordered, disjoint row groups.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use polars::prelude::{AnyValue, Column, DataFrame, IdxCa, IdxSize, PolarsResult};

use crate::date::derive_column_years;
use crate::spec::{
    EnumGroupKey, EnumPartitionDirective, EnumPartitionMode, PartitionError, SpecPartition,
    SpecPartitionResult,
};

/// Partition `df` as instructed by `directive`.
///
/// Every input row lands in exactly one group, groups keep first-occurrence
/// order and rows keep their input order inside a group.
pub fn partition(
    df: &DataFrame,
    directive: &EnumPartitionDirective,
) -> Result<SpecPartitionResult, PartitionError> {
    let result = match directive {
        EnumPartitionDirective::RowCount(n_rows_per_part) => {
            split_by_row_count(df, *n_rows_per_part)
        }
        EnumPartitionDirective::ColumnName(c_name) => split_by_column(df, c_name)?,
    };

    log::info!("{result}");
    for group in &result {
        log::debug!("group {:?}: {} rows", group.label(), group.height());
    }
    Ok(result)
}

/// Consecutive `n`-row slices; the last one holds the remainder.
pub fn split_by_row_count(df: &DataFrame, n_rows_per_part: NonZeroUsize) -> SpecPartitionResult {
    let n_rows_per_part = n_rows_per_part.get();
    let n_height = df.height();

    let groups = (0..n_height)
        .step_by(n_rows_per_part)
        .enumerate()
        .map(|(n_idx_part, n_row_start)| SpecPartition {
            key: EnumGroupKey::Part(n_idx_part + 1),
            df: df.slice(n_row_start as i64, n_rows_per_part),
        })
        .collect();

    SpecPartitionResult {
        mode: EnumPartitionMode::RowCount,
        column_name: None,
        groups,
    }
}

/// Group rows by the year (date-typed column) or literal value of `column_name`.
pub fn split_by_column(
    df: &DataFrame,
    column_name: &str,
) -> Result<SpecPartitionResult, PartitionError> {
    let col = df
        .column(column_name)
        .map_err(|_| PartitionError::ColumnNotFound {
            column: column_name.to_string(),
            available: df
                .get_column_names_str()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })?;

    let (mode, l_keys) = match derive_column_years(col)? {
        Some(l_years) => (
            EnumPartitionMode::ColumnYear,
            l_years
                .into_iter()
                .map(|n_year| n_year.map_or(EnumGroupKey::Blank, EnumGroupKey::Year))
                .collect(),
        ),
        None => (EnumPartitionMode::ColumnValue, derive_value_keys(col)?),
    };

    let mut groups = Vec::new();
    for (key, l_idx) in group_row_indices(l_keys) {
        let df_group = df.take(&IdxCa::from_vec("idx".into(), l_idx))?;
        groups.push(SpecPartition { key, df: df_group });
    }

    Ok(SpecPartitionResult {
        mode,
        column_name: Some(column_name.to_string()),
        groups,
    })
}

// #region Helpers

fn derive_value_keys(col: &Column) -> PolarsResult<Vec<EnumGroupKey>> {
    (0..col.len())
        .map(|n_idx_row| col.get(n_idx_row).map(derive_group_key_from_any_value))
        .collect()
}

/// Stringify one grouping cell. Null, empty text and NaN map to `Blank`.
pub fn derive_group_key_from_any_value(value: AnyValue<'_>) -> EnumGroupKey {
    match value {
        AnyValue::Null => EnumGroupKey::Blank,
        AnyValue::String(s) if s.is_empty() => EnumGroupKey::Blank,
        AnyValue::String(s) => EnumGroupKey::Value(s.to_string()),
        AnyValue::StringOwned(s) if s.is_empty() => EnumGroupKey::Blank,
        AnyValue::StringOwned(s) => EnumGroupKey::Value(s.to_string()),
        AnyValue::Boolean(b) => EnumGroupKey::Value(if b { "True" } else { "False" }.to_string()),
        AnyValue::Float64(n) if n.is_nan() => EnumGroupKey::Blank,
        AnyValue::Float64(n) => EnumGroupKey::Value(n.to_string()),
        AnyValue::Float32(n) if n.is_nan() => EnumGroupKey::Blank,
        AnyValue::Float32(n) => EnumGroupKey::Value(n.to_string()),
        other => EnumGroupKey::Value(other.to_string()),
    }
}

/// Collect row indices per key, keys in first-occurrence order.
fn group_row_indices(keys: Vec<EnumGroupKey>) -> Vec<(EnumGroupKey, Vec<IdxSize>)> {
    let mut dict_slot_by_key: HashMap<EnumGroupKey, usize> = HashMap::new();
    let mut l_groups: Vec<(EnumGroupKey, Vec<IdxSize>)> = Vec::new();

    for (n_idx_row, key) in keys.into_iter().enumerate() {
        let n_slot = *dict_slot_by_key.entry(key).or_insert_with_key(|key| {
            l_groups.push((key.clone(), Vec::new()));
            l_groups.len() - 1
        });
        l_groups[n_slot].1.push(n_idx_row as IdxSize);
    }

    l_groups
}

// #endregion
