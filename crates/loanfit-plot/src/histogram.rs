//! Overlaid histograms of one variable split by a grouping flag.

use std::path::Path;

use plotters::prelude::*;
use tracing::debug;

use crate::PlotError;
use crate::svg::{color, padded_range, render_svg};

/// `bins + 1` equal-width edges spanning `[min, max]`.
#[must_use]
pub fn bin_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let width = (max - min) / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { max } else { min + width * i as f64 })
        .collect()
}

/// Count `values` into the bins delimited by `edges`.
///
/// Bins are half-open except the last, which includes its right edge.
/// Values outside the edges are ignored.
#[must_use]
pub fn bin_counts(values: &[f64], edges: &[f64]) -> Vec<usize> {
    let bins = edges.len().saturating_sub(1);
    let mut counts = vec![0usize; bins];
    if bins == 0 {
        return counts;
    }
    let (min, max) = (edges[0], edges[bins]);
    for &v in values {
        if !(min..=max).contains(&v) {
            continue;
        }
        // First edge strictly above v, minus one; the right edge folds into the last bin.
        let i = edges.partition_point(|&e| e <= v).saturating_sub(1).min(bins - 1);
        counts[i] += 1;
    }
    counts
}

/// Counts of one group over the shared bins.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramGroup {
    pub label: String,
    pub counts: Vec<usize>,
}

/// Several groups of one variable binned on shared edges and drawn
/// semi-transparently on top of each other.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaidHistogram {
    pub title: String,
    pub x_label: String,
    pub edges: Vec<f64>,
    pub groups: Vec<HistogramGroup>,
}

impl OverlaidHistogram {
    /// Bin every `(label, values)` group on edges spanning all values.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PlotError::InvalidBinCount`] | `bins` is zero |
    /// | [`PlotError::EmptySeries`] | No group holds a finite value |
    pub fn new(
        title: &str,
        x_label: &str,
        groups: &[(String, Vec<f64>)],
        bins: usize,
    ) -> Result<Self, PlotError> {
        if bins == 0 {
            return Err(PlotError::InvalidBinCount { bins });
        }
        let (min, max) = padded_range(groups.iter().flat_map(|(_, v)| v.iter().copied()))
            .ok_or_else(|| PlotError::EmptySeries {
                chart: title.to_string(),
            })?;
        let edges = bin_edges(min, max, bins);
        let groups = groups
            .iter()
            .map(|(label, values)| HistogramGroup {
                label: label.clone(),
                counts: bin_counts(values, &edges),
            })
            .collect();
        Ok(Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            edges,
            groups,
        })
    }

    /// Tallest bar across all groups.
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.counts.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Write the chart as SVG.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::Render`] if the backend fails.
    pub fn render(&self, path: &Path, size: (u32, u32)) -> Result<(), PlotError> {
        let x_range = self.edges[0]..self.edges[self.edges.len() - 1];
        let y_max = (self.max_count() as f64 * 1.1).max(1.0);
        debug!(chart = %self.title, path = %path.display(), "rendering histogram");

        render_svg(path, size, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(&self.title, ("sans-serif", 24))
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(x_range, 0f64..y_max)?;
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc(self.x_label.as_str())
                .y_desc("count")
                .draw()?;

            for (i, group) in self.groups.iter().enumerate() {
                let c = color(i);
                chart
                    .draw_series(group.counts.iter().enumerate().map(|(b, &n)| {
                        Rectangle::new(
                            [(self.edges[b], 0.0), (self.edges[b + 1], n as f64)],
                            c.mix(0.5).filled(),
                        )
                    }))?
                    .label(group.label.as_str())
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], c.mix(0.5).filled()));
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
        })
    }
}
