//! Report artifacts: summary text, per-bin tables, and the panel figure.

use crate::binning::BinnedResult;
use crate::comparison::ComparisonOutcome;
use crate::config::{TestConfig, ZBin};
use crate::error::ReportError;
use crate::reference::ReferenceDataset;
use log::{info, warn};
use plotters::prelude::*;
use std::fmt;
use std::ops::Range;
use std::path::Path;

/// Name of the rendered figure inside the output directory.
pub const FIGURE_FILENAME: &str = "size_magnitude.png";

/// Name of the text summary inside the output directory.
pub const SUMMARY_FILENAME: &str = "summary.txt";

const PANEL_WIDTH: u32 = 480;
const PANEL_HEIGHT: u32 = 360;

/// How one redshift bin fared.
#[derive(Debug, Clone, PartialEq)]
pub enum BinStatus {
    /// Compared against the reference and below the threshold.
    Passed { reduced_chisq: f64 },
    /// Compared against the reference and above the threshold.
    Failed { reduced_chisq: f64 },
    /// Binning found too little usable data; no comparison attempted.
    Skipped { reason: String },
    /// Binned, but the comparison itself was impossible.
    NotEvaluable { reason: String },
}

impl BinStatus {
    /// True when the bin produced a pass or fail verdict.
    pub fn is_evaluated(&self) -> bool {
        matches!(self, BinStatus::Passed { .. } | BinStatus::Failed { .. })
    }
}

impl fmt::Display for BinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinStatus::Passed { reduced_chisq } => {
                write!(f, "SUCCESS: chi^2/dof = {reduced_chisq:.3}")
            }
            BinStatus::Failed { reduced_chisq } => {
                write!(f, "FAILED: chi^2/dof = {reduced_chisq:.3}")
            }
            BinStatus::Skipped { reason } => write!(f, "SKIPPED: {reason}"),
            BinStatus::NotEvaluable { reason } => write!(f, "NOT EVALUABLE: {reason}"),
        }
    }
}

/// Everything the run produced for one redshift bin.
#[derive(Debug, Clone, PartialEq)]
pub struct BinOutcome {
    /// Redshift bin this outcome describes.
    pub z_bin: ZBin,
    /// Binned relation, absent when binning was skipped.
    pub binned: Option<BinnedResult>,
    /// Comparison verdict, absent when the bin was not evaluated.
    pub comparison: Option<ComparisonOutcome>,
    /// Final status of the bin.
    pub status: BinStatus,
}

/// Results of a full validation run, one entry per configured redshift bin.
#[derive(Debug, Clone, PartialEq)]
pub struct TestReport {
    pub bins: Vec<BinOutcome>,
}

impl TestReport {
    /// Overall verdict: every evaluated bin passed and at least one bin was
    /// evaluated at all.
    pub fn overall_passed(&self) -> bool {
        let evaluated = self
            .bins
            .iter()
            .filter(|b| b.status.is_evaluated())
            .count();
        let any_failed = self
            .bins
            .iter()
            .any(|b| matches!(b.status, BinStatus::Failed { .. }));
        evaluated > 0 && !any_failed
    }

    /// Render the human-readable run summary.
    pub fn format_summary(&self, config: &TestConfig) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", config.subclass_name));
        if !config.description.is_empty() {
            out.push_str(&format!("{}\n", config.description));
        }
        out.push_str(&format!(
            "observation: {} ({})\n\n",
            config.observation, config.survey_label
        ));
        for bin in &self.bins {
            out.push_str(&format!(
                "{:.2} < z < {:.2}\n{}\n",
                bin.z_bin.z_min, bin.z_bin.z_max, bin.status
            ));
        }
        let verdict = if self.overall_passed() {
            "PASSED"
        } else {
            "FAILED"
        };
        out.push_str(&format!("\noverall: {verdict}\n"));
        out
    }
}

/// Write the summary, the per-bin tables, and the figure into `output_dir`.
///
/// The directory is created if needed. Summary and table write failures are
/// fatal; figure rendering is best effort, so a backend that cannot draw
/// (for example with no fonts installed) only logs a warning.
pub fn write_report(
    report: &TestReport,
    reference: &ReferenceDataset,
    config: &TestConfig,
    statistic_name: &str,
    output_dir: &Path,
) -> Result<(), ReportError> {
    std::fs::create_dir_all(output_dir).map_err(|source| ReportError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    write_summary(report, config, output_dir)?;
    for outcome in &report.bins {
        if let Some(binned) = &outcome.binned {
            write_bin_table(binned, config, statistic_name, output_dir)?;
        }
    }

    let figure_path = output_dir.join(FIGURE_FILENAME);
    match draw_panels(report, reference, config, &figure_path) {
        Ok(()) => info!("wrote figure to {}", figure_path.display()),
        Err(e) => warn!("failed to render figure {}: {e}", figure_path.display()),
    }
    Ok(())
}

fn write_summary(
    report: &TestReport,
    config: &TestConfig,
    output_dir: &Path,
) -> Result<(), ReportError> {
    let path = output_dir.join(SUMMARY_FILENAME);
    std::fs::write(&path, report.format_summary(config))
        .map_err(|source| ReportError::Io { path, source })
}

fn write_bin_table(
    binned: &BinnedResult,
    config: &TestConfig,
    statistic_name: &str,
    output_dir: &Path,
) -> Result<(), ReportError> {
    let path = output_dir.join(config.artifact_filename(statistic_name, &binned.z_bin));

    let mut contents = String::new();
    contents.push_str(&format!(
        "# {statistic_name} size vs {} for {:.2} < z < {:.2}\n",
        binned.mag_field, binned.z_bin.z_min, binned.z_bin.z_max
    ));
    contents.push_str("# mag_center value uncertainty count\n");
    for point in &binned.points {
        contents.push_str(&format!(
            "{:.4} {:.6} {:.6} {}\n",
            point.mag_center, point.value, point.uncertainty, point.count
        ));
    }
    std::fs::write(&path, contents).map_err(|source| ReportError::Io { path, source })
}

/// Render the panel grid figure, one panel per redshift bin.
fn draw_panels(
    report: &TestReport,
    reference: &ReferenceDataset,
    config: &TestConfig,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let ncols = config.ncolumns.max(1);
    let nrows = ((report.bins.len() + ncols - 1) / ncols).max(1);
    let width = ncols as u32 * PANEL_WIDTH;
    let height = nrows as u32 * PANEL_HEIGHT;

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((nrows, ncols));

    let (x_range, y_range) = axis_ranges(report, reference, config);
    for (outcome, panel) in report.bins.iter().zip(panels.iter()) {
        draw_bin_panel(outcome, reference, config, &x_range, &y_range, panel)?;
    }
    root.present()?;
    Ok(())
}

/// Shared axis ranges for every panel, fixed by the config or derived from
/// the reference and binned data with a 5% margin.
fn axis_ranges(
    report: &TestReport,
    reference: &ReferenceDataset,
    config: &TestConfig,
) -> (Range<f64>, Range<f64>) {
    let pad = |lo: f64, hi: f64| {
        if !lo.is_finite() || !hi.is_finite() {
            return 0.0..1.0;
        }
        let span = (hi - lo).max(1e-6);
        (lo - 0.05 * span)..(hi + 0.05 * span)
    };

    let x_range = match config.fig_xlim {
        Some([lo, hi]) => lo..hi,
        None => {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for (m, _, _) in reference.points() {
                lo = lo.min(m);
                hi = hi.max(m);
            }
            for outcome in &report.bins {
                if let Some(binned) = &outcome.binned {
                    for p in &binned.points {
                        lo = lo.min(p.mag_center);
                        hi = hi.max(p.mag_center);
                    }
                }
            }
            pad(lo, hi)
        }
    };
    let y_range = match config.fig_ylim {
        Some([lo, hi]) => lo..hi,
        None => {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for (_, s, e) in reference.points() {
                lo = lo.min(s - e);
                hi = hi.max(s + e);
            }
            for outcome in &report.bins {
                if let Some(binned) = &outcome.binned {
                    for p in &binned.points {
                        lo = lo.min(p.value - p.uncertainty);
                        hi = hi.max(p.value + p.uncertainty);
                    }
                }
            }
            pad(lo, hi)
        }
    };
    (x_range, y_range)
}

fn draw_bin_panel(
    outcome: &BinOutcome,
    reference: &ReferenceDataset,
    config: &TestConfig,
    x_range: &Range<f64>,
    y_range: &Range<f64>,
    panel: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut chart = ChartBuilder::on(panel)
        .caption(config.panel_label(&outcome.z_bin), ("sans-serif", 22))
        .margin(8)
        .x_label_area_size(35)
        .y_label_area_size(45)
        .build_cartesian_2d(x_range.clone(), y_range.clone())?;

    chart
        .configure_mesh()
        .x_desc(config.fig_xlabel.as_str())
        .y_desc(config.fig_ylabel.as_str())
        .x_label_formatter(&|x| format!("{x:.1}"))
        .y_label_formatter(&|y| format!("{y:.2}"))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            reference.points().map(|(m, s, _)| (m, s)),
            &BLACK,
        ))?
        .label(format!("{} ({})", config.data_label, config.survey_label))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], BLACK));

    if let Some(binned) = &outcome.binned {
        chart.draw_series(binned.points.iter().map(|p| {
            ErrorBar::new_vertical(
                p.mag_center,
                p.value - p.uncertainty,
                p.value,
                p.value + p.uncertainty,
                BLUE.filled(),
                4,
            )
        }))?;
        chart
            .draw_series(
                binned
                    .points
                    .iter()
                    .map(|p| Circle::new((p.mag_center, p.value), 3, BLUE.filled())),
            )?
            .label(format!("simulation [{}]", binned.mag_field))
            .legend(|(x, y)| Circle::new((x + 6, y), 3, BLUE.filled()));
    }

    if let Some(comparison) = &outcome.comparison {
        let x = x_range.start + 0.04 * (x_range.end - x_range.start);
        let y = y_range.end - 0.08 * (y_range.end - y_range.start);
        chart.draw_series(std::iter::once(Text::new(
            format!("chi^2/dof = {:.3}", comparison.reduced_chisq),
            (x, y),
            ("sans-serif", 16).into_font(),
        )))?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(legend_position(&config.legend_location))
        .draw()?;

    Ok(())
}

/// Map a matplotlib-style legend keyword onto a plotters position.
fn legend_position(location: &str) -> SeriesLabelPosition {
    match location {
        "upper left" => SeriesLabelPosition::UpperLeft,
        "upper middle" | "upper center" => SeriesLabelPosition::UpperMiddle,
        "lower left" => SeriesLabelPosition::LowerLeft,
        "lower middle" | "lower center" => SeriesLabelPosition::LowerMiddle,
        "lower right" => SeriesLabelPosition::LowerRight,
        "center left" | "middle left" => SeriesLabelPosition::MiddleLeft,
        "center right" | "middle right" => SeriesLabelPosition::MiddleRight,
        _ => SeriesLabelPosition::UpperRight,
    }
}
