//! The fixed set of exploratory charts for a loan table.

use std::fs;
use std::path::{Path, PathBuf};

use loanfit_data::{LoanRecord, LoanTable};
use tracing::{info, instrument};

use crate::count::CountPlot;
use crate::histogram::OverlaidHistogram;
use crate::joint::JointPlot;
use crate::lm::{LmObservation, LmPlot};
use crate::PlotError;

/// Chart rendering configuration.
///
/// # Defaults
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `bins`    | 30      |
/// | `width`   | 900     |
/// | `height`  | 600     |
#[derive(Debug, Clone)]
pub struct ChartConfig {
    bins: usize,
    width: u32,
    height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bins: 30,
            width: 900,
            height: 600,
        }
    }

    /// Histogram bin count. Zero is rejected at render time.
    #[must_use]
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn bins(&self) -> usize {
        self.bins
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Faceted panels sit side by side, so the canvas is half again as wide.
fn faceted_size((width, height): (u32, u32)) -> (u32, u32) {
    (width.saturating_mul(3) / 2, height)
}

/// `fico` of rows with `key` set, then of rows without.
fn fico_by(
    records: &[LoanRecord],
    key: impl Fn(&LoanRecord) -> bool,
    name: &str,
) -> Vec<(String, Vec<f64>)> {
    [true, false]
        .into_iter()
        .map(|wanted| {
            let values = records
                .iter()
                .filter(|r| key(r) == wanted)
                .map(|r| f64::from(r.fico_score))
                .collect();
            (format!("{name} = {}", flag(wanted)), values)
        })
        .collect()
}

/// Render every exploratory chart for `table` into `out_dir`.
///
/// Files, in order: `fico_by_credit_policy.svg`, `fico_by_not_fully_paid.svg`,
/// `purpose_counts.svg`, `fico_vs_int_rate_joint.svg`, `fico_vs_int_rate_lm.svg`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`PlotError::OutputDir`] | `out_dir` cannot be created |
/// | [`PlotError::InvalidBinCount`] | `config.bins()` is zero |
/// | [`PlotError::EmptySeries`] | `table` has no rows |
/// | [`PlotError::Render`] | A file cannot be drawn or written |
#[instrument(skip_all, fields(dir = %out_dir.display(), n_rows = table.len()))]
pub fn render_loan_charts(
    table: &LoanTable,
    config: &ChartConfig,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, PlotError> {
    fs::create_dir_all(out_dir).map_err(|e| PlotError::OutputDir {
        path: out_dir.to_path_buf(),
        source: e,
    })?;
    let records = table.records();
    let size = config.size();
    let bins = config.bins();
    let mut written = Vec::with_capacity(5);

    let path = out_dir.join("fico_by_credit_policy.svg");
    OverlaidHistogram::new(
        "FICO by credit policy",
        "FICO",
        &fico_by(records, |r| r.credit_policy, "credit.policy"),
        bins,
    )?
    .render(&path, size)?;
    written.push(path);

    let path = out_dir.join("fico_by_not_fully_paid.svg");
    OverlaidHistogram::new(
        "FICO by repayment",
        "FICO",
        &fico_by(records, |r| r.not_fully_paid, "not.fully.paid"),
        bins,
    )?
    .render(&path, size)?;
    written.push(path);

    let path = out_dir.join("purpose_counts.svg");
    CountPlot::new(
        "Loans by purpose",
        "purpose",
        "not.fully.paid",
        records
            .iter()
            .map(|r| (r.purpose.as_str(), flag(r.not_fully_paid))),
    )?
    .render(&path, size)?;
    written.push(path);

    let path = out_dir.join("fico_vs_int_rate_joint.svg");
    JointPlot::new(
        "FICO vs interest rate",
        "fico",
        "int.rate",
        records
            .iter()
            .map(|r| (f64::from(r.fico_score), r.interest_rate)),
        bins,
    )?
    .render(&path, (size.1, size.1))?;
    written.push(path);

    let path = out_dir.join("fico_vs_int_rate_lm.svg");
    LmPlot::new(
        "FICO vs interest rate by repayment",
        ("fico", "int.rate"),
        ("not.fully.paid", "credit.policy"),
        records.iter().map(|r| LmObservation {
            facet: flag(r.not_fully_paid).to_string(),
            hue: flag(r.credit_policy).to_string(),
            x: f64::from(r.fico_score),
            y: r.interest_rate,
        }),
    )?
    .render(&path, faceted_size(size))?;
    written.push(path);

    info!(n_charts = written.len(), "charts written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ChartConfig::default();
        assert_eq!(config.bins(), 30);
        assert_eq!(config.size(), (900, 600));
        let config = config.with_bins(10).with_size(400, 300);
        assert_eq!(config.bins(), 10);
        assert_eq!(config.size(), (400, 300));
    }

    #[test]
    fn faceted_canvas_widens_without_overflow() {
        assert_eq!(faceted_size((900, 600)), (1350, 600));
        assert_eq!(faceted_size((u32::MAX, 10)), (u32::MAX / 2, 10));
    }
}
