//! Statistics used to aggregate galaxy sizes within magnitude bins.

/// Scale factor turning a median absolute deviation into a normal-equivalent
/// standard deviation.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Calculate the median of a slice of f64 values
///
/// NaN entries are filtered out before sorting; infinite values participate
/// in the ordering. For even-length data, returns the average of the two
/// middle values.
///
/// # Arguments
///
/// * `values` - Slice of f64 values to compute the median from
///
/// # Returns
///
/// * `Ok(median)` - The median value
/// * `Err(message)` - If no valid values remain after filtering NaN
pub fn median(values: &[f64]) -> Result<f64, String> {
    let mut valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();

    if valid.is_empty() {
        return Err(format!(
            "cannot compute median: {} total values, 0 valid (all NaN)",
            values.len()
        ));
    }

    valid.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mid = valid.len() / 2;
    if valid.len() % 2 == 0 {
        Ok((valid[mid - 1] + valid[mid]) / 2.0)
    } else {
        Ok(valid[mid])
    }
}

/// Median absolute deviation about the median, ignoring NaN entries.
pub fn median_absolute_deviation(values: &[f64]) -> Result<f64, String> {
    let center = median(values)?;
    let deviations: Vec<f64> = values
        .iter()
        .filter(|v| !v.is_nan())
        .map(|v| (v - center).abs())
        .collect();
    median(&deviations)
}

/// Value and uncertainty of an aggregate over one magnitude bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinAggregate {
    /// Aggregated statistic value.
    pub value: f64,
    /// Uncertainty of the statistic.
    pub uncertainty: f64,
}

/// Aggregation strategy for the sizes inside one magnitude bin.
///
/// The binner calls `aggregate` once per populated magnitude bin; `name`
/// labels the artifacts derived from the statistic.
pub trait AggregateStatistic {
    /// Short name used in artifact filenames (e.g. "median").
    fn name(&self) -> &'static str;

    /// Aggregate the sizes of one magnitude bin, or None when the statistic
    /// is not computable for the input.
    fn aggregate(&self, values: &[f64]) -> Option<BinAggregate>;
}

/// Median with a scaled-MAD standard error.
///
/// The uncertainty is `1.4826 * MAD / sqrt(n)`, the normal-consistent
/// median absolute deviation scaled to a standard error of the median.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianStatistic;

impl AggregateStatistic for MedianStatistic {
    fn name(&self) -> &'static str {
        "median"
    }

    fn aggregate(&self, values: &[f64]) -> Option<BinAggregate> {
        let value = median(values).ok()?;
        let mad = median_absolute_deviation(values).ok()?;
        let n = values.iter().filter(|v| !v.is_nan()).count();
        Some(BinAggregate {
            value,
            uncertainty: MAD_TO_SIGMA * mad / (n as f64).sqrt(),
        })
    }
}
