//! Partition directives, group keys, results and errors.

use std::fmt;
use std::num::NonZeroUsize;

use polars::prelude::{DataFrame, PolarsError};
use thiserror::Error;

/// Label prefix of row-count groups (`Part_1`, `Part_2`, ...).
pub const C_LABEL_PART_PREFIX: &str = "Part_";
/// Label of the group collecting missing grouping values.
pub const C_LABEL_BLANK: &str = "Blank";

////////////////////////////////////////////////////////////////////////////////
// #region Directive

/// How to split one dataset. Exactly one mode per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumPartitionDirective {
    /// Consecutive chunks of `n` rows; the last chunk holds the remainder.
    RowCount(NonZeroUsize),
    /// One group per distinct value (or year) of the named column.
    ColumnName(String),
}

impl EnumPartitionDirective {
    /// Build the directive from the two optional CLI inputs.
    ///
    /// Fails with [`PartitionError::InvalidDirective`] when both or neither
    /// are given, or when `number` is zero.
    pub fn from_options(
        number: Option<usize>,
        column_name: Option<String>,
    ) -> Result<Self, PartitionError> {
        match (number, column_name) {
            (Some(_), Some(_)) => Err(PartitionError::InvalidDirective(
                "Provide either column_name or number, not both.".to_string(),
            )),
            (None, None) => Err(PartitionError::InvalidDirective(
                "Either column_name or number must be provided.".to_string(),
            )),
            (Some(n), None) => NonZeroUsize::new(n).map(Self::RowCount).ok_or_else(|| {
                PartitionError::InvalidDirective("number must be a positive integer.".to_string())
            }),
            (None, Some(c_name)) => Ok(Self::ColumnName(c_name)),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GroupKeys

/// Branch actually taken by the partitioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumPartitionMode {
    /// Fixed-size row chunks.
    RowCount,
    /// Distinct literal values of a column.
    ColumnValue,
    /// Calendar year of a date-like column.
    ColumnYear,
}

impl EnumPartitionMode {
    /// Short name used in reports and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RowCount => "rows",
            Self::ColumnValue => "value",
            Self::ColumnYear => "year",
        }
    }
}

/// Identity of one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnumGroupKey {
    /// 1-based chunk index.
    Part(usize),
    /// Calendar year.
    Year(i32),
    /// Stringified distinct value.
    Value(String),
    /// Missing value in the grouping column.
    Blank,
}

impl EnumGroupKey {
    /// Human-readable label, later used as the sheet name.
    pub fn label(&self) -> String {
        match self {
            Self::Part(n_idx) => format!("{C_LABEL_PART_PREFIX}{n_idx}"),
            Self::Year(n_year) => n_year.to_string(),
            Self::Value(c_value) => c_value.clone(),
            Self::Blank => C_LABEL_BLANK.to_string(),
        }
    }
}

impl fmt::Display for EnumGroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Results

/// One group: its key and the rows that belong to it.
#[derive(Debug, Clone)]
pub struct SpecPartition {
    /// Group identity.
    pub key: EnumGroupKey,
    /// Rows of the group, original column set and order.
    pub df: DataFrame,
}

impl SpecPartition {
    /// See [`EnumGroupKey::label`].
    pub fn label(&self) -> String {
        self.key.label()
    }

    /// Number of rows in the group.
    pub fn height(&self) -> usize {
        self.df.height()
    }
}

/// Ordered groups produced by one [`crate::partition::partition`] call.
#[derive(Debug, Clone)]
pub struct SpecPartitionResult {
    /// Branch taken.
    pub mode: EnumPartitionMode,
    /// Grouping column, `None` in row-count mode.
    pub column_name: Option<String>,
    /// Groups in first-occurrence (or chunk) order.
    pub groups: Vec<SpecPartition>,
}

impl SpecPartitionResult {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no group was produced (empty input).
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate groups in order.
    pub fn iter(&self) -> std::slice::Iter<'_, SpecPartition> {
        self.groups.iter()
    }

    /// Group labels in order.
    pub fn labels(&self) -> Vec<String> {
        self.groups.iter().map(SpecPartition::label).collect()
    }

    /// Sum of group heights; equals the input height.
    pub fn total_rows(&self) -> usize {
        self.groups.iter().map(SpecPartition::height).sum()
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        match &self.column_name {
            Some(c_name) => format!(
                "{prefix} mode={} column={c_name:?} groups={} rows={}",
                self.mode.as_str(),
                self.len(),
                self.total_rows()
            ),
            None => format!(
                "{prefix} mode={} groups={} rows={}",
                self.mode.as_str(),
                self.len(),
                self.total_rows()
            ),
        }
    }
}

impl fmt::Display for SpecPartitionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[SPLIT]"))
    }
}

impl<'a> IntoIterator for &'a SpecPartitionResult {
    type Item = &'a SpecPartition;
    type IntoIter = std::slice::Iter<'a, SpecPartition>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Partitioning failures. All are raised before any group is built.
#[derive(Debug, Error)]
pub enum PartitionError {
    /// Neither or both modes given, or a zero row count.
    #[error("Invalid partition directive: {0}")]
    InvalidDirective(String),
    /// Grouping column absent from the dataset.
    #[error("Column not found: {column:?} (available: {})", .available.join(", "))]
    ColumnNotFound {
        /// Requested column.
        column: String,
        /// Columns of the loaded dataset.
        available: Vec<String>,
    },
    /// polars failed while slicing or gathering rows.
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_options_accepts_exactly_one_mode() {
        assert_eq!(
            EnumPartitionDirective::from_options(Some(5), None).expect("rows"),
            EnumPartitionDirective::RowCount(NonZeroUsize::new(5).expect("non-zero"))
        );
        assert_eq!(
            EnumPartitionDirective::from_options(None, Some("cat".to_string())).expect("column"),
            EnumPartitionDirective::ColumnName("cat".to_string())
        );
    }

    #[test]
    fn test_from_options_rejects_both_neither_and_zero() {
        for (number, column_name) in [
            (Some(2), Some("cat".to_string())),
            (None, None),
            (Some(0), None),
        ] {
            let err =
                EnumPartitionDirective::from_options(number, column_name).expect_err("must fail");
            assert!(matches!(err, PartitionError::InvalidDirective(_)));
        }
    }

    #[test]
    fn test_group_key_labels() {
        assert_eq!(EnumGroupKey::Part(3).label(), "Part_3");
        assert_eq!(EnumGroupKey::Year(2021).label(), "2021");
        assert_eq!(EnumGroupKey::Value("A".to_string()).to_string(), "A");
        assert_eq!(EnumGroupKey::Blank.label(), "Blank");
    }

    #[test]
    fn test_column_not_found_message_lists_columns() {
        let err = PartitionError::ColumnNotFound {
            column: "cat".to_string(),
            available: vec!["id".to_string(), "name".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Column not found: \"cat\" (available: id, name)"
        );
    }
}
