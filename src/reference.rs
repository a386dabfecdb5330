//! Observational reference dataset: loading and interpolation.

use crate::error::DataLoadError;
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Observed size-magnitude relation, sorted by magnitude.
///
/// Each point carries a magnitude, a size, and a size uncertainty. Between
/// points the relation is evaluated by linear interpolation; outside the
/// tabulated magnitude range it is undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceDataset {
    magnitudes: Vec<f64>,
    sizes: Vec<f64>,
    size_errors: Vec<f64>,
}

impl ReferenceDataset {
    /// Load a three-column whitespace-separated text file.
    ///
    /// Columns are magnitude, size, size uncertainty. Blank lines and lines
    /// starting with `#` are skipped. Points are sorted by magnitude after
    /// loading, so the file order does not matter.
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let file = File::open(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut points = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| DataLoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(DataLoadError::MalformedRow {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: format!("expected 3 columns, found {}", fields.len()),
                });
            }
            let mut parsed = [0.0f64; 3];
            for (slot, field) in parsed.iter_mut().zip(&fields) {
                *slot = field.parse().map_err(|_| DataLoadError::MalformedRow {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: format!("'{field}' is not a number"),
                })?;
            }
            points.push((parsed[0], parsed[1], parsed[2]));
        }

        if points.is_empty() {
            return Err(DataLoadError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(Self::from_points(points))
    }

    /// Build a dataset from `(magnitude, size, size_error)` points.
    pub fn from_points(mut points: Vec<(f64, f64, f64)>) -> Self {
        points.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        let magnitudes = points.iter().map(|p| p.0).collect();
        let sizes = points.iter().map(|p| p.1).collect();
        let size_errors = points.iter().map(|p| p.2).collect();
        ReferenceDataset {
            magnitudes,
            sizes,
            size_errors,
        }
    }

    /// Number of tabulated points.
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    /// True when no points are tabulated.
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Covered magnitude interval, or `None` for an empty dataset.
    pub fn mag_range(&self) -> Option<(f64, f64)> {
        let first = self.magnitudes.first()?;
        let last = self.magnitudes.last()?;
        Some((*first, *last))
    }

    /// Interpolated `(size, size_error)` at `mag`.
    ///
    /// Returns `None` outside the tabulated magnitude range and for
    /// non-finite magnitudes.
    pub fn value_at(&self, mag: f64) -> Option<(f64, f64)> {
        if !mag.is_finite() {
            return None;
        }
        let (lo, hi) = self.mag_range()?;
        if mag < lo || mag > hi {
            return None;
        }

        let upper = self.magnitudes.partition_point(|&m| m <= mag);
        if upper == self.magnitudes.len() {
            // mag equals the last tabulated magnitude
            return Some((self.sizes[upper - 1], self.size_errors[upper - 1]));
        }
        let below = upper - 1;
        let span = self.magnitudes[upper] - self.magnitudes[below];
        let t = (mag - self.magnitudes[below]) / span;
        let size = self.sizes[below] + t * (self.sizes[upper] - self.sizes[below]);
        let error =
            self.size_errors[below] + t * (self.size_errors[upper] - self.size_errors[below]);
        Some((size, error))
    }

    /// Iterate over tabulated `(magnitude, size, size_error)` points.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.magnitudes
            .iter()
            .zip(&self.sizes)
            .zip(&self.size_errors)
            .map(|((&m, &s), &e)| (m, s, e))
    }
}
