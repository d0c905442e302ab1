//! `splitsheet_partition` v1:
//! Split one loaded dataset into ordered, disjoint row groups.
//!
//! Module layout:
//! - `spec`      : directive/group key/result types and errors
//! - `date`      : whole-column date detection and year extraction
//! - `partition` : row-count chunking and column-value grouping

pub mod date;
pub mod partition;
pub mod spec;

pub use date::{derive_column_years, parse_date_str};
pub use partition::{partition, split_by_column, split_by_row_count};
pub use spec::{
    C_LABEL_BLANK, C_LABEL_PART_PREFIX, EnumGroupKey, EnumPartitionDirective, EnumPartitionMode,
    PartitionError, SpecPartition, SpecPartitionResult,
};
