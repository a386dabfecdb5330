//! Redshift selection and magnitude binning of catalog galaxies.
//!
//! For one redshift bin, the binner selects the member galaxies, picks the
//! first usable magnitude field from the configured candidates, groups the
//! galaxies into fixed-width magnitude bins, and aggregates the galaxy sizes
//! in each bin with the supplied statistic.

use crate::catalog::{GalaxyCatalog, SIZE_FIELD};
use crate::config::{TestConfig, ZBin};
use crate::error::InsufficientDataError;
use crate::stats::AggregateStatistic;
use log::debug;
use std::collections::BTreeMap;

/// Magnitude bins with fewer member galaxies than this are dropped.
pub const MIN_GALAXIES_PER_BIN: usize = 3;

/// Aggregated size statistic for one magnitude bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinPoint {
    /// Center of the magnitude bin.
    pub mag_center: f64,
    /// Aggregated size value.
    pub value: f64,
    /// Uncertainty on the aggregated value.
    pub uncertainty: f64,
    /// Number of galaxies that entered the aggregate.
    pub count: usize,
}

/// Binned size-magnitude relation for one redshift bin.
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedResult {
    /// Redshift bin the galaxies were selected from.
    pub z_bin: ZBin,
    /// Magnitude field the binning actually used.
    pub mag_field: String,
    /// Per-magnitude-bin aggregates, ascending in magnitude.
    pub points: Vec<BinPoint>,
}

/// Bin the catalog galaxies inside `z_bin` and aggregate their sizes.
pub fn bin_galaxies<C: GalaxyCatalog + ?Sized>(
    catalog: &C,
    z_bin: &ZBin,
    config: &TestConfig,
    statistic: &dyn AggregateStatistic,
) -> Result<BinnedResult, InsufficientDataError> {
    let selected: Vec<usize> = catalog
        .redshifts()
        .iter()
        .enumerate()
        .filter(|(_, &z)| z_bin.contains(z))
        .map(|(i, _)| i)
        .collect();
    if selected.is_empty() {
        return Err(InsufficientDataError::EmptyRedshiftRange {
            z_min: z_bin.z_min,
            z_max: z_bin.z_max,
        });
    }

    let (mag_field, magnitudes) =
        select_mag_field(catalog, &selected, &config.possible_mag_fields)?;
    let sizes = catalog
        .column(SIZE_FIELD)
        .ok_or(InsufficientDataError::MissingSizeField { field: SIZE_FIELD })?;

    // Group sizes by magnitude bin index; BTreeMap keeps bins ascending.
    let width = config.mag_bin_separation;
    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for &i in &selected {
        let mag = magnitudes[i];
        let size = sizes[i];
        if !mag.is_finite() || !size.is_finite() {
            continue;
        }
        let idx = (mag / width).floor() as i64;
        groups.entry(idx).or_default().push(size);
    }

    let mut points = Vec::new();
    for (idx, group) in &groups {
        if group.len() < MIN_GALAXIES_PER_BIN {
            continue;
        }
        if let Some(aggregate) = statistic.aggregate(group) {
            points.push(BinPoint {
                mag_center: (*idx as f64 + 0.5) * width,
                value: aggregate.value,
                uncertainty: aggregate.uncertainty,
                count: group.len(),
            });
        }
    }
    if points.is_empty() {
        return Err(InsufficientDataError::NoPopulatedBins {
            min_count: MIN_GALAXIES_PER_BIN,
        });
    }

    Ok(BinnedResult {
        z_bin: *z_bin,
        mag_field: mag_field.to_string(),
        points,
    })
}

/// Pick the first candidate field present in the catalog whose values are
/// finite for a majority of the selected galaxies.
fn select_mag_field<'a, 'c, C: GalaxyCatalog + ?Sized>(
    catalog: &'c C,
    selected: &[usize],
    candidates: &'a [String],
) -> Result<(&'a str, &'c [f64]), InsufficientDataError> {
    for candidate in candidates {
        if let Some(column) = catalog.column(candidate) {
            let finite = selected.iter().filter(|&&i| column[i].is_finite()).count();
            if finite * 2 > selected.len() {
                debug!(
                    "using magnitude field {candidate} ({finite}/{} finite)",
                    selected.len()
                );
                return Ok((candidate, column));
            }
        }
    }
    Err(InsufficientDataError::NoUsableMagnitudeField {
        candidates: candidates.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ColumnCatalog;
    use crate::stats::MedianStatistic;

    fn test_config(mag_bin_separation: f64) -> TestConfig {
        TestConfig {
            subclass_name: "SizeTest".to_string(),
            observation: "onecomp".to_string(),
            possible_mag_fields: vec!["mag_true_r".to_string(), "mag_true_i".to_string()],
            mag_bin_separation,
            output_filename_template: "size_{}_z_{}_{}.txt".to_string(),
            label_template: "{} < z < {}".to_string(),
            data_filename: "sizes.txt".to_string(),
            data_label: "obs".to_string(),
            survey_label: "survey".to_string(),
            z_bins: vec![ZBin {
                z_min: 0.0,
                z_max: 1.0,
            }],
            fig_xlabel: "M".to_string(),
            fig_ylabel: "R".to_string(),
            ncolumns: 1,
            fig_ylim: None,
            fig_xlim: None,
            legend_location: "best".to_string(),
            chisq_max: 1.0,
            description: String::new(),
        }
    }

    fn catalog_with(
        redshifts: Vec<f64>,
        mags: Vec<f64>,
        sizes: Vec<f64>,
    ) -> ColumnCatalog {
        let mut catalog = ColumnCatalog::new(redshifts);
        catalog.insert_column("mag_true_r", mags).unwrap();
        catalog.insert_column(SIZE_FIELD, sizes).unwrap();
        catalog
    }

    #[test]
    fn test_redshift_selection_is_half_open() {
        // z = 0.5 belongs to the upper bin only
        let catalog = catalog_with(
            vec![0.0, 0.2, 0.5, 0.5, 0.7],
            vec![-20.1; 5],
            vec![2.0, 2.1, 9.0, 9.1, 9.2],
        );
        let bin = ZBin {
            z_min: 0.0,
            z_max: 0.5,
        };
        let err = bin_galaxies(&catalog, &bin, &test_config(1.0), &MedianStatistic).unwrap_err();
        // only two galaxies fall below z = 0.5, under the bin minimum
        assert!(matches!(
            err,
            InsufficientDataError::NoPopulatedBins { min_count: 3 }
        ));
    }

    #[test]
    fn test_empty_redshift_range() {
        let catalog = catalog_with(vec![0.1, 0.2], vec![-20.1, -20.2], vec![2.0, 2.1]);
        let bin = ZBin {
            z_min: 2.0,
            z_max: 3.0,
        };
        let err = bin_galaxies(&catalog, &bin, &test_config(1.0), &MedianStatistic).unwrap_err();
        assert!(matches!(
            err,
            InsufficientDataError::EmptyRedshiftRange { .. }
        ));
    }

    #[test]
    fn test_bin_centers_and_order() {
        let catalog = catalog_with(
            vec![0.1; 6],
            vec![-20.9, -20.5, -20.1, -19.9, -19.5, -19.1],
            vec![3.0, 3.2, 3.4, 2.0, 2.2, 2.4],
        );
        let bin = ZBin {
            z_min: 0.0,
            z_max: 1.0,
        };
        let result = bin_galaxies(&catalog, &bin, &test_config(1.0), &MedianStatistic).unwrap();
        assert_eq!(result.mag_field, "mag_true_r");
        assert_eq!(result.points.len(), 2);
        assert_eq!(result.points[0].mag_center, -20.5);
        assert_eq!(result.points[1].mag_center, -19.5);
        assert_eq!(result.points[0].value, 3.2);
        assert_eq!(result.points[1].value, 2.2);
        assert_eq!(result.points[0].count, 3);
    }

    #[test]
    fn test_falls_back_to_second_mag_field() {
        let mut catalog = ColumnCatalog::new(vec![0.1, 0.1, 0.1]);
        catalog
            .insert_column("mag_true_i", vec![-20.1, -20.2, -20.3])
            .unwrap();
        catalog
            .insert_column(SIZE_FIELD, vec![2.0, 2.1, 2.2])
            .unwrap();
        let bin = ZBin {
            z_min: 0.0,
            z_max: 1.0,
        };
        let result = bin_galaxies(&catalog, &bin, &test_config(1.0), &MedianStatistic).unwrap();
        assert_eq!(result.mag_field, "mag_true_i");
    }

    #[test]
    fn test_mostly_nan_field_is_skipped() {
        let mut catalog = ColumnCatalog::new(vec![0.1, 0.1, 0.1, 0.1]);
        catalog
            .insert_column("mag_true_r", vec![f64::NAN, f64::NAN, f64::NAN, -20.1])
            .unwrap();
        catalog
            .insert_column("mag_true_i", vec![-20.1, -20.2, -20.3, -20.4])
            .unwrap();
        catalog
            .insert_column(SIZE_FIELD, vec![2.0, 2.1, 2.2, 2.3])
            .unwrap();
        let bin = ZBin {
            z_min: 0.0,
            z_max: 1.0,
        };
        let result = bin_galaxies(&catalog, &bin, &test_config(1.0), &MedianStatistic).unwrap();
        assert_eq!(result.mag_field, "mag_true_i");
    }

    #[test]
    fn test_no_usable_mag_field() {
        let mut catalog = ColumnCatalog::new(vec![0.1, 0.1, 0.1]);
        catalog
            .insert_column(SIZE_FIELD, vec![2.0, 2.1, 2.2])
            .unwrap();
        let bin = ZBin {
            z_min: 0.0,
            z_max: 1.0,
        };
        let err = bin_galaxies(&catalog, &bin, &test_config(1.0), &MedianStatistic).unwrap_err();
        match err {
            InsufficientDataError::NoUsableMagnitudeField { candidates } => {
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_size_field() {
        let mut catalog = ColumnCatalog::new(vec![0.1, 0.1, 0.1]);
        catalog
            .insert_column("mag_true_r", vec![-20.1, -20.2, -20.3])
            .unwrap();
        let bin = ZBin {
            z_min: 0.0,
            z_max: 1.0,
        };
        let err = bin_galaxies(&catalog, &bin, &test_config(1.0), &MedianStatistic).unwrap_err();
        assert!(matches!(
            err,
            InsufficientDataError::MissingSizeField { field: "size_true" }
        ));
    }

    #[test]
    fn test_nan_values_are_dropped() {
        let catalog = catalog_with(
            vec![0.1; 5],
            vec![-20.1, -20.2, f64::NAN, -20.3, -20.4],
            vec![2.0, 2.1, 2.2, f64::NAN, 2.3],
        );
        let bin = ZBin {
            z_min: 0.0,
            z_max: 1.0,
        };
        let result = bin_galaxies(&catalog, &bin, &test_config(1.0), &MedianStatistic).unwrap();
        assert_eq!(result.points.len(), 1);
        assert_eq!(result.points[0].count, 3);
    }

    #[test]
    fn test_sparse_bins_are_dropped() {
        // one galaxy per magnitude bin, all below the minimum count
        let catalog = catalog_with(
            vec![0.1; 3],
            vec![-21.5, -20.5, -19.5],
            vec![3.0, 2.5, 2.0],
        );
        let bin = ZBin {
            z_min: 0.0,
            z_max: 1.0,
        };
        let err = bin_galaxies(&catalog, &bin, &test_config(1.0), &MedianStatistic).unwrap_err();
        assert!(matches!(
            err,
            InsufficientDataError::NoPopulatedBins { .. }
        ));
    }
}
