//! `splitsheet_cli` v1:
//! Load -> partition -> write pipeline behind the `split-sheet` binary.
//!
//! Module layout:
//! - `spec`     : pipeline config, report and errors
//! - `pipeline` : the sequential `run` entry point

pub mod pipeline;
pub mod spec;

pub use pipeline::run;
pub use spec::{ReportSplit, SpecSplitConfig, SplitSheetError};
