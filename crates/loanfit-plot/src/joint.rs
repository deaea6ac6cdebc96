//! Scatter of two variables with marginal histograms.

use std::path::Path;

use plotters::prelude::*;
use tracing::debug;

use crate::PlotError;
use crate::histogram::{bin_counts, bin_edges};
use crate::svg::{padded_range, render_svg};

const POINT_COLOR: RGBColor = RGBColor(44, 160, 44);

/// Binned values along one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Marginal {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Marginal {
    fn new(values: &[f64], bins: usize) -> Option<Self> {
        let (min, max) = padded_range(values.iter().copied())?;
        let edges = bin_edges(min, max, bins);
        let counts = bin_counts(values, &edges);
        Some(Self { edges, counts })
    }

    fn range(&self) -> std::ops::Range<f64> {
        self.edges[0]..self.edges[self.edges.len() - 1]
    }

    fn peak(&self) -> f64 {
        (self.counts.iter().copied().max().unwrap_or(0) as f64 * 1.1).max(1.0)
    }
}

/// `x` against `y`, with the histogram of `x` above and of `y` to the right.
#[derive(Debug, Clone, PartialEq)]
pub struct JointPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
    pub x_marginal: Marginal,
    pub y_marginal: Marginal,
}

impl JointPlot {
    /// Build from paired observations. Non-finite pairs are dropped.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PlotError::InvalidBinCount`] | `bins` is zero |
    /// | [`PlotError::EmptySeries`] | No finite pair remains |
    pub fn new(
        title: &str,
        x_label: &str,
        y_label: &str,
        points: impl IntoIterator<Item = (f64, f64)>,
        bins: usize,
    ) -> Result<Self, PlotError> {
        if bins == 0 {
            return Err(PlotError::InvalidBinCount { bins });
        }
        let points: Vec<(f64, f64)> = points
            .into_iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        let empty = || PlotError::EmptySeries {
            chart: title.to_string(),
        };
        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
        let x_marginal = Marginal::new(&xs, bins).ok_or_else(empty)?;
        let y_marginal = Marginal::new(&ys, bins).ok_or_else(empty)?;

        Ok(Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            points,
            x_marginal,
            y_marginal,
        })
    }

    /// Write the chart as SVG.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::Render`] if the backend fails.
    pub fn render(&self, path: &Path, size: (u32, u32)) -> Result<(), PlotError> {
        let x_range = self.x_marginal.range();
        let y_range = self.y_marginal.range();
        debug!(chart = %self.title, n_points = self.points.len(), path = %path.display(), "rendering joint plot");

        render_svg(path, size, |root| {
            let root = root.titled(&self.title, ("sans-serif", 24))?;
            let (upper, lower) = root.split_vertically(20.percent_height());
            let (top, _corner) = upper.split_horizontally(80.percent_width());
            let (main, right) = lower.split_horizontally(80.percent_width());

            let mut scatter = ChartBuilder::on(&main)
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(x_range.clone(), y_range.clone())?;
            scatter
                .configure_mesh()
                .x_desc(self.x_label.as_str())
                .y_desc(self.y_label.as_str())
                .draw()?;
            scatter.draw_series(
                self.points
                    .iter()
                    .map(|&p| Circle::new(p, 2, POINT_COLOR.mix(0.4).filled())),
            )?;

            // Same margins and label areas as the scatter so the axes line up.
            let mut above = ChartBuilder::on(&top)
                .margin(10)
                .y_label_area_size(60)
                .build_cartesian_2d(x_range, 0f64..self.x_marginal.peak())?;
            above.draw_series(self.x_marginal.counts.iter().enumerate().map(|(b, &n)| {
                let e = &self.x_marginal.edges;
                Rectangle::new([(e[b], 0.0), (e[b + 1], n as f64)], POINT_COLOR.mix(0.6).filled())
            }))?;

            let mut beside = ChartBuilder::on(&right)
                .margin(10)
                .x_label_area_size(40)
                .build_cartesian_2d(0f64..self.y_marginal.peak(), y_range)?;
            beside.draw_series(self.y_marginal.counts.iter().enumerate().map(|(b, &n)| {
                let e = &self.y_marginal.edges;
                Rectangle::new([(0.0, e[b]), (n as f64, e[b + 1])], POINT_COLOR.mix(0.6).filled())
            }))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<(f64, f64)> {
        (0..20)
            .map(|i| (650.0 + 10.0 * f64::from(i), 0.2 - 0.005 * f64::from(i)))
            .collect()
    }

    #[test]
    fn marginals_cover_every_point() {
        let plot = JointPlot::new("j", "fico", "int.rate", points(), 5).unwrap();
        assert_eq!(plot.points.len(), 20);
        assert_eq!(plot.x_marginal.counts.iter().sum::<usize>(), 20);
        assert_eq!(plot.y_marginal.counts.iter().sum::<usize>(), 20);
        assert_eq!(plot.x_marginal.edges.len(), 6);
        assert_eq!(plot.x_marginal.edges[0], 650.0);
        assert_eq!(plot.x_marginal.edges[5], 840.0);
    }

    #[test]
    fn non_finite_pairs_are_dropped() {
        let mut pts = points();
        pts.push((f64::NAN, 0.1));
        pts.push((700.0, f64::INFINITY));
        let plot = JointPlot::new("j", "x", "y", pts, 4).unwrap();
        assert_eq!(plot.points.len(), 20);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            JointPlot::new("j", "x", "y", Vec::new(), 10),
            Err(PlotError::EmptySeries { .. })
        ));
        assert!(matches!(
            JointPlot::new("j", "x", "y", points(), 0),
            Err(PlotError::InvalidBinCount { bins: 0 })
        ));
    }

    #[test]
    fn renders_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("j.svg");
        JointPlot::new("joint", "fico", "int.rate", points(), 10)
            .unwrap()
            .render(&path, (600, 600))
            .unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("joint"));
    }
}
