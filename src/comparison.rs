//! Reduced chi-square comparison of binned results against the reference.

use crate::binning::BinnedResult;
use crate::config::ZBin;
use crate::error::ComparisonError;
use crate::reference::ReferenceDataset;

/// Verdict of comparing one redshift bin against the reference relation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonOutcome {
    /// Redshift bin the verdict applies to.
    pub z_bin: ZBin,
    /// Chi-square per degree of freedom.
    pub reduced_chisq: f64,
    /// Number of magnitude bins that entered the sum.
    pub dof: usize,
    /// True when `reduced_chisq <= chisq_max`.
    pub passed: bool,
}

/// Compute the reduced chi-square between `binned` and `reference`.
///
/// Each binned point whose magnitude center falls inside the reference's
/// tabulated range contributes one degree of freedom. Simulation and
/// reference uncertainties are combined in quadrature; points whose combined
/// uncertainty is zero or non-finite are excluded. With no contributing
/// points the bins cannot be compared and `NoOverlap` is returned.
pub fn compare_to_reference(
    binned: &BinnedResult,
    reference: &ReferenceDataset,
    chisq_max: f64,
) -> Result<ComparisonOutcome, ComparisonError> {
    let mut sum = 0.0;
    let mut dof = 0usize;
    for point in &binned.points {
        if let Some((ref_size, ref_error)) = reference.value_at(point.mag_center) {
            let combined =
                (point.uncertainty * point.uncertainty + ref_error * ref_error).sqrt();
            if combined == 0.0 || !combined.is_finite() {
                continue;
            }
            let residual = (point.value - ref_size) / combined;
            sum += residual * residual;
            dof += 1;
        }
    }

    if dof == 0 {
        let (ref_min, ref_max) = reference.mag_range().unwrap_or((f64::NAN, f64::NAN));
        return Err(ComparisonError::NoOverlap { ref_min, ref_max });
    }

    let reduced_chisq = sum / dof as f64;
    Ok(ComparisonOutcome {
        z_bin: binned.z_bin,
        reduced_chisq,
        dof,
        passed: reduced_chisq <= chisq_max,
    })
}
