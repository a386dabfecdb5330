//! LOOKBACK - Validation of simulated galaxy catalogs against observations
//!
//! This crate runs configuration-driven validation tests that compare the
//! size-magnitude relation of a simulated galaxy catalog against an observed
//! reference dataset. A run selects galaxies per redshift bin, bins them by
//! magnitude, aggregates the galaxy sizes with a robust statistic, scores
//! each redshift bin with a reduced chi-square against the reference, and
//! writes a summary, per-bin tables, and a multi-panel figure.

pub mod binning;
pub mod catalog;
pub mod comparison;
pub mod config;
pub mod error;
pub mod reference;
pub mod report;
pub mod runner;
pub mod stats;

// Re-export commonly used types for external use
pub use binning::{bin_galaxies, BinPoint, BinnedResult, MIN_GALAXIES_PER_BIN};
pub use catalog::{ColumnCatalog, ColumnLengthError, GalaxyCatalog, SIZE_FIELD};
pub use comparison::{compare_to_reference, ComparisonOutcome};
pub use config::{TestConfig, ZBin};
pub use error::{
    ComparisonError, ConfigError, DataLoadError, InsufficientDataError, ReportError, TestError,
};
pub use reference::ReferenceDataset;
pub use report::{
    write_report, BinOutcome, BinStatus, TestReport, FIGURE_FILENAME, SUMMARY_FILENAME,
};
pub use runner::{run_test, run_test_from_path, run_test_with_statistic};
pub use stats::{AggregateStatistic, BinAggregate, MedianStatistic};
