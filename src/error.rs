use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a test configuration.
///
/// Configuration problems are fatal: no redshift bin is processed when the
/// configuration cannot be trusted.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read config {path:?}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// File contents did not match the expected schema.
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        /// Path that was being parsed.
        path: PathBuf,
        /// Underlying deserialization error, naming the offending key.
        #[source]
        source: serde_json::Error,
    },

    /// A key held a value outside its allowed range.
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue {
        /// Offending configuration key.
        key: &'static str,
        /// Constraint that was violated.
        reason: String,
    },
}

/// Errors raised while loading the observational reference dataset.
///
/// The reference curve is shared by every redshift bin, so any load failure
/// is fatal to the whole run.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// Reference file missing or unreadable.
    #[error("failed to read reference data {path:?}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A data row did not parse as the expected numeric columns.
    #[error("malformed row in {path:?} at line {line}: {reason}")]
    MalformedRow {
        /// Path that was being parsed.
        path: PathBuf,
        /// One-based line number of the offending row.
        line: usize,
        /// What was wrong with the row.
        reason: String,
    },

    /// File contained no data rows.
    #[error("reference data {path:?} contains no data rows")]
    Empty {
        /// Path that was loaded.
        path: PathBuf,
    },
}

/// A single redshift bin lacked usable simulated data.
///
/// Recovered per bin: the bin is reported as skipped and the remaining bins
/// still run.
#[derive(Error, Debug)]
pub enum InsufficientDataError {
    /// No catalog objects fell inside the bin's redshift range.
    #[error("no objects with {z_min} <= z < {z_max}")]
    EmptyRedshiftRange {
        /// Inclusive lower redshift edge.
        z_min: f64,
        /// Exclusive upper redshift edge.
        z_max: f64,
    },

    /// None of the candidate magnitude fields covered a majority of the
    /// selected objects.
    #[error("no magnitude field from {candidates:?} is available for a majority of objects")]
    NoUsableMagnitudeField {
        /// Fields that were tried, in priority order.
        candidates: Vec<String>,
    },

    /// The catalog does not carry the size quantity.
    #[error("catalog does not expose the '{field}' quantity")]
    MissingSizeField {
        /// Name of the missing quantity.
        field: &'static str,
    },

    /// Every magnitude bin fell below the minimum object count.
    #[error("no magnitude bin reached {min_count} objects")]
    NoPopulatedBins {
        /// Minimum objects a bin needs before its statistic is reported.
        min_count: usize,
    },
}

/// A single redshift bin could not be compared against the reference.
///
/// Recovered per bin: the bin is reported as not-evaluable, which is
/// distinct from a failed comparison.
#[derive(Error, Debug)]
pub enum ComparisonError {
    /// No simulated bin center fell inside the reference magnitude domain.
    #[error("no overlap with the reference domain [{ref_min}, {ref_max}]")]
    NoOverlap {
        /// Lower edge of the reference magnitude domain.
        ref_min: f64,
        /// Upper edge of the reference magnitude domain.
        ref_max: f64,
    },
}

/// Errors raised while writing the run's summary and data artifacts.
#[derive(Error, Debug)]
pub enum ReportError {
    /// An artifact could not be written.
    #[error("failed to write {path:?}: {source}")]
    Io {
        /// Path that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Fatal errors for a whole validation run.
#[derive(Error, Debug)]
pub enum TestError {
    /// Configuration could not be loaded or validated.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Reference dataset could not be loaded.
    #[error("reference data error: {0}")]
    DataLoad(#[from] DataLoadError),

    /// Run artifacts could not be written.
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}
