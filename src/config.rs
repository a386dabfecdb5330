//! Test configuration schema, validation, and artifact-name templates.
//!
//! One configuration file describes one comparison: which catalog fields to
//! bin, which reference dataset to compare against, the redshift bins to
//! evaluate, the pass threshold, and the figure styling. The configuration
//! is loaded once and never mutated afterwards.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A half-open redshift interval `[z_min, z_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZBin {
    /// Inclusive lower redshift edge.
    pub z_min: f64,
    /// Exclusive upper redshift edge.
    pub z_max: f64,
}

impl ZBin {
    /// Membership predicate: `z_min <= z < z_max`.
    pub fn contains(&self, z: f64) -> bool {
        z >= self.z_min && z < self.z_max
    }
}

/// Parameters for one size-magnitude comparison test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestConfig {
    /// Comparison implementation the enclosing framework should run.
    pub subclass_name: String,
    /// Which reference dataset variant `data_filename` holds.
    pub observation: String,
    /// Catalog magnitude fields to try, in priority order.
    pub possible_mag_fields: Vec<String>,
    /// Magnitude bin width.
    pub mag_bin_separation: f64,
    /// Template for per-bin artifact names; `{}` slots are filled with
    /// (statistic subject, z_min, z_max).
    pub output_filename_template: String,
    /// Template for panel titles; `{}` slots are filled with (z_min, z_max).
    pub label_template: String,
    /// Reference dataset file, relative to the caller's data root.
    pub data_filename: String,
    /// Legend label for the reference curve.
    pub data_label: String,
    /// Survey the reference data comes from.
    pub survey_label: String,
    /// Redshift bins to evaluate, one figure panel each.
    pub z_bins: Vec<ZBin>,
    /// Figure x-axis label.
    pub fig_xlabel: String,
    /// Figure y-axis label.
    pub fig_ylabel: String,
    /// Panel grid column count.
    pub ncolumns: usize,
    /// Fixed y-axis limits, or derived from the data when absent.
    #[serde(default)]
    pub fig_ylim: Option<[f64; 2]>,
    /// Fixed x-axis limits, or derived from the data when absent.
    #[serde(default)]
    pub fig_xlim: Option<[f64; 2]>,
    /// Legend placement keyword ("best", "upper right", "lower left", ...).
    #[serde(default = "default_legend_location")]
    pub legend_location: String,
    /// Pass threshold on the reduced chi-square.
    pub chisq_max: f64,
    /// Free-text description, display only.
    #[serde(default)]
    pub description: String,
}

fn default_legend_location() -> String {
    "best".to_string()
}

impl TestConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: TestConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value constraint the schema imposes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.possible_mag_fields.is_empty() {
            return Err(invalid(
                "possible_mag_fields",
                "must list at least one field".to_string(),
            ));
        }
        if !(self.mag_bin_separation > 0.0) {
            return Err(invalid(
                "mag_bin_separation",
                format!("must be positive, got {}", self.mag_bin_separation),
            ));
        }
        if !(self.chisq_max > 0.0) {
            return Err(invalid(
                "chisq_max",
                format!("must be positive, got {}", self.chisq_max),
            ));
        }
        if self.data_filename.is_empty() {
            return Err(invalid("data_filename", "must not be empty".to_string()));
        }
        if self.z_bins.is_empty() {
            return Err(invalid("z_bins", "must list at least one bin".to_string()));
        }
        for (i, bin) in self.z_bins.iter().enumerate() {
            if !(bin.z_min < bin.z_max) {
                return Err(invalid(
                    "z_bins",
                    format!(
                        "bin {i} must have z_min < z_max, got [{}, {})",
                        bin.z_min, bin.z_max
                    ),
                ));
            }
        }
        if self.ncolumns == 0 {
            return Err(invalid("ncolumns", "must be at least 1".to_string()));
        }
        if let Some([lo, hi]) = self.fig_xlim {
            if !(lo < hi) {
                return Err(invalid(
                    "fig_xlim",
                    format!("limits must be ordered, got [{lo}, {hi}]"),
                ));
            }
        }
        if let Some([lo, hi]) = self.fig_ylim {
            if !(lo < hi) {
                return Err(invalid(
                    "fig_ylim",
                    format!("limits must be ordered, got [{lo}, {hi}]"),
                ));
            }
        }
        Ok(())
    }

    /// Name of the per-bin data artifact, from `output_filename_template`.
    pub fn artifact_filename(&self, subject: &str, bin: &ZBin) -> String {
        fill_template3(
            &self.output_filename_template,
            subject,
            bin.z_min,
            bin.z_max,
        )
    }

    /// Panel title for `bin`, from `label_template`.
    pub fn panel_label(&self, bin: &ZBin) -> String {
        fill_template2(&self.label_template, bin.z_min, bin.z_max)
    }
}

/// Fixed-point rendering used for redshift values in filled templates.
fn format_z(z: f64) -> String {
    format!("{z:.2}")
}

/// Replace the first `{}` slot with `value`; no-op when no slot remains.
fn fill_next(template: &str, value: &str) -> String {
    template.replacen("{}", value, 1)
}

/// Fill a three-slot template with (subject, z_min, z_max), left to right.
///
/// Surplus `{}` slots are left verbatim.
fn fill_template3(template: &str, subject: &str, z_min: f64, z_max: f64) -> String {
    let filled = fill_next(template, subject);
    let filled = fill_next(&filled, &format_z(z_min));
    fill_next(&filled, &format_z(z_max))
}

/// Fill a two-slot template with (z_min, z_max), left to right.
fn fill_template2(template: &str, z_min: f64, z_max: f64) -> String {
    let filled = fill_next(template, &format_z(z_min));
    fill_next(&filled, &format_z(z_max))
}

fn invalid(key: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidValue { key, reason }
}
