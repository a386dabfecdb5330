//! Common utilities for lookback integration tests

use lookback::{ColumnCatalog, TestConfig, ZBin, SIZE_FIELD};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::fs;
use std::path::{Path, PathBuf};

/// Linear size-magnitude relation the synthetic data is drawn from.
///
/// Positive over the magnitude ranges the tests use.
pub fn relation_size(mag: f64) -> f64 {
    0.5 - 0.2 * mag
}

/// Parameters for synthetic catalog generation
#[derive(Debug, Clone)]
pub struct SyntheticCatalogConfig {
    pub count: usize,
    pub z_range: (f64, f64),
    pub mag_range: (f64, f64),
    pub size_scatter: f64,
    pub seed: u64,
}

impl Default for SyntheticCatalogConfig {
    fn default() -> Self {
        Self {
            count: 100,
            z_range: (0.0, 0.5),
            mag_range: (-24.0, -18.0),
            size_scatter: 0.05,
            seed: 42,
        }
    }
}

/// Wrap parallel vectors into a catalog with the standard column names.
pub fn build_catalog(redshifts: Vec<f64>, mags: Vec<f64>, sizes: Vec<f64>) -> ColumnCatalog {
    let mut catalog = ColumnCatalog::new(redshifts);
    catalog.insert_column("mag_true_r", mags).unwrap();
    catalog.insert_column(SIZE_FIELD, sizes).unwrap();
    catalog
}

/// Create a catalog whose sizes scatter around `relation_size`.
///
/// Redshifts and magnitudes sweep their ranges evenly, so every magnitude
/// bin inside `mag_range` is well populated.
pub fn create_synthetic_catalog(config: &SyntheticCatalogConfig) -> ColumnCatalog {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.size_scatter).unwrap();

    let mut redshifts = Vec::with_capacity(config.count);
    let mut mags = Vec::with_capacity(config.count);
    let mut sizes = Vec::with_capacity(config.count);
    for i in 0..config.count {
        let frac = i as f64 / config.count as f64;
        let z = config.z_range.0 + frac * (config.z_range.1 - config.z_range.0);
        let mag = config.mag_range.0 + frac * (config.mag_range.1 - config.mag_range.0);
        redshifts.push(z);
        mags.push(mag);
        sizes.push(relation_size(mag) + noise.sample(&mut rng));
    }
    build_catalog(redshifts, mags, sizes)
}

/// Write a reference file tabulating `relation_size` every half magnitude
/// over `mag_range`, and return its path.
pub fn write_reference_file(
    data_dir: &Path,
    filename: &str,
    mag_range: (f64, f64),
    size_error: f64,
) -> PathBuf {
    let mut contents = String::from("# magnitude size size_error\n");
    let steps = ((mag_range.1 - mag_range.0) / 0.5).round() as usize;
    for i in 0..=steps {
        let mag = mag_range.0 + i as f64 * 0.5;
        contents.push_str(&format!(
            "{mag:.2} {:.4} {size_error:.4}\n",
            relation_size(mag)
        ));
    }
    let path = data_dir.join(filename);
    fs::write(&path, contents).unwrap();
    path
}

/// Baseline configuration shared by the integration scenarios.
pub fn base_config(z_bins: Vec<ZBin>) -> TestConfig {
    TestConfig {
        subclass_name: "GalaxySizeTest".to_string(),
        observation: "onecomp".to_string(),
        possible_mag_fields: vec!["mag_true_r".to_string(), "mag_true_i".to_string()],
        mag_bin_separation: 1.0,
        output_filename_template: "size_{}_z_{}_{}.txt".to_string(),
        label_template: "{} < z < {}".to_string(),
        data_filename: "galaxy_sizes.txt".to_string(),
        data_label: "observed relation".to_string(),
        survey_label: "TESTSURVEY".to_string(),
        z_bins,
        fig_xlabel: "absolute magnitude".to_string(),
        fig_ylabel: "size (kpc)".to_string(),
        ncolumns: 2,
        fig_ylim: None,
        fig_xlim: None,
        legend_location: "upper right".to_string(),
        chisq_max: 1.2,
        description: "galaxy size vs magnitude in redshift bins".to_string(),
    }
}
