//! Top-level test driver: bin, compare, and report every redshift bin.

use crate::binning::bin_galaxies;
use crate::catalog::GalaxyCatalog;
use crate::comparison::compare_to_reference;
use crate::config::{TestConfig, ZBin};
use crate::error::TestError;
use crate::reference::ReferenceDataset;
use crate::report::{write_report, BinOutcome, BinStatus, TestReport};
use crate::stats::{AggregateStatistic, MedianStatistic};
use log::{info, warn};
use std::path::Path;

/// Run the validation test with the default median statistic.
///
/// `data_dir` is resolved against the config's `data_filename`; all report
/// artifacts land in `output_dir`.
pub fn run_test<C: GalaxyCatalog + ?Sized>(
    catalog: &C,
    config: &TestConfig,
    data_dir: &Path,
    output_dir: &Path,
) -> Result<TestReport, TestError> {
    run_test_with_statistic(catalog, config, data_dir, output_dir, &MedianStatistic)
}

/// Run the validation test with a caller-chosen aggregate statistic.
///
/// Per-bin problems (too little data, no overlap with the reference) are
/// recovered: the bin is recorded as skipped or not evaluable and the run
/// continues. Configuration, reference loading, and report writing problems
/// abort the run.
pub fn run_test_with_statistic<C: GalaxyCatalog + ?Sized>(
    catalog: &C,
    config: &TestConfig,
    data_dir: &Path,
    output_dir: &Path,
    statistic: &dyn AggregateStatistic,
) -> Result<TestReport, TestError> {
    config.validate()?;
    let reference = ReferenceDataset::load(&data_dir.join(&config.data_filename))?;
    info!(
        "loaded {} reference points from {}",
        reference.len(),
        config.data_filename
    );

    let mut bins = Vec::with_capacity(config.z_bins.len());
    for z_bin in &config.z_bins {
        bins.push(evaluate_bin(catalog, z_bin, config, &reference, statistic));
    }
    let report = TestReport { bins };

    write_report(&report, &reference, config, statistic.name(), output_dir)?;
    let verdict = if report.overall_passed() {
        "PASSED"
    } else {
        "FAILED"
    };
    info!("{}: {verdict}", config.subclass_name);
    Ok(report)
}

/// Load a configuration file, then run the validation test with it.
pub fn run_test_from_path<C: GalaxyCatalog + ?Sized>(
    catalog: &C,
    config_path: &Path,
    data_dir: &Path,
    output_dir: &Path,
) -> Result<TestReport, TestError> {
    let config = TestConfig::load(config_path)?;
    run_test(catalog, &config, data_dir, output_dir)
}

fn evaluate_bin<C: GalaxyCatalog + ?Sized>(
    catalog: &C,
    z_bin: &ZBin,
    config: &TestConfig,
    reference: &ReferenceDataset,
    statistic: &dyn AggregateStatistic,
) -> BinOutcome {
    let binned = match bin_galaxies(catalog, z_bin, config, statistic) {
        Ok(binned) => binned,
        Err(e) => {
            warn!("skipping {:.2} < z < {:.2}: {e}", z_bin.z_min, z_bin.z_max);
            return BinOutcome {
                z_bin: *z_bin,
                binned: None,
                comparison: None,
                status: BinStatus::Skipped {
                    reason: e.to_string(),
                },
            };
        }
    };

    match compare_to_reference(&binned, reference, config.chisq_max) {
        Ok(outcome) => {
            let status = if outcome.passed {
                BinStatus::Passed {
                    reduced_chisq: outcome.reduced_chisq,
                }
            } else {
                BinStatus::Failed {
                    reduced_chisq: outcome.reduced_chisq,
                }
            };
            BinOutcome {
                z_bin: *z_bin,
                binned: Some(binned),
                comparison: Some(outcome),
                status,
            }
        }
        Err(e) => {
            warn!(
                "cannot evaluate {:.2} < z < {:.2}: {e}",
                z_bin.z_min, z_bin.z_max
            );
            BinOutcome {
                z_bin: *z_bin,
                binned: Some(binned),
                comparison: None,
                status: BinStatus::NotEvaluable {
                    reason: e.to_string(),
                },
            }
        }
    }
}
