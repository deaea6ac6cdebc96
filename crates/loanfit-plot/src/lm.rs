//! Faceted scatter plots with per-hue least-squares fits.

use std::collections::BTreeMap;
use std::path::Path;

use plotters::prelude::*;
use tracing::debug;

use crate::PlotError;
use crate::svg::{color, padded_range, render_svg};

/// `y = slope · x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Ordinary least squares over `points`.
    ///
    /// `None` with fewer than two points or when every `x` is equal.
    #[must_use]
    pub fn ols(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
        let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), &(x, y)| {
            let dx = x - mean_x;
            (sxy + dx * (y - mean_y), sxx + dx * dx)
        });
        if sxx == 0.0 {
            return None;
        }
        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Points of one hue level inside a facet.
#[derive(Debug, Clone, PartialEq)]
pub struct LmSeries {
    pub hue: String,
    pub points: Vec<(f64, f64)>,
    pub fit: Option<LinearFit>,
}

/// One panel of the plot.
#[derive(Debug, Clone, PartialEq)]
pub struct LmFacet {
    pub level: String,
    pub series: Vec<LmSeries>,
}

/// A single `(facet, hue, x, y)` observation.
#[derive(Debug, Clone, PartialEq)]
pub struct LmObservation {
    pub facet: String,
    pub hue: String,
    pub x: f64,
    pub y: f64,
}

/// One panel per facet level, side by side, each showing every hue level's
/// points and its fitted line. Facet and hue levels are sorted; all panels
/// share both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct LmPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub facet_label: String,
    pub hue_label: String,
    pub facets: Vec<LmFacet>,
    /// Every hue level seen in any facet, sorted.
    pub hue_levels: Vec<String>,
}

impl LmPlot {
    /// Group observations and fit each `(facet, hue)` series.
    /// Non-finite observations are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::EmptySeries`] if no finite observation remains.
    pub fn new(
        title: &str,
        (x_label, y_label): (&str, &str),
        (facet_label, hue_label): (&str, &str),
        observations: impl IntoIterator<Item = LmObservation>,
    ) -> Result<Self, PlotError> {
        let mut grouped: BTreeMap<String, BTreeMap<String, Vec<(f64, f64)>>> = BTreeMap::new();
        for obs in observations {
            if obs.x.is_finite() && obs.y.is_finite() {
                grouped
                    .entry(obs.facet)
                    .or_default()
                    .entry(obs.hue)
                    .or_default()
                    .push((obs.x, obs.y));
            }
        }
        if grouped.is_empty() {
            return Err(PlotError::EmptySeries {
                chart: title.to_string(),
            });
        }

        let mut hue_levels: Vec<String> = grouped
            .values()
            .flat_map(|by_hue| by_hue.keys().cloned())
            .collect();
        hue_levels.sort();
        hue_levels.dedup();

        let facets = grouped
            .into_iter()
            .map(|(level, by_hue)| LmFacet {
                level,
                series: by_hue
                    .into_iter()
                    .map(|(hue, points)| LmSeries {
                        fit: LinearFit::ols(&points),
                        hue,
                        points,
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            facet_label: facet_label.to_string(),
            hue_label: hue_label.to_string(),
            facets,
            hue_levels,
        })
    }

    fn all_points(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.facets
            .iter()
            .flat_map(|f| f.series.iter())
            .flat_map(|s| s.points.iter())
    }

    /// Write the chart as SVG.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::Render`] if the backend fails.
    pub fn render(&self, path: &Path, size: (u32, u32)) -> Result<(), PlotError> {
        let empty = || PlotError::EmptySeries {
            chart: self.title.clone(),
        };
        let (x_lo, x_hi) = padded_range(self.all_points().map(|p| p.0)).ok_or_else(empty)?;
        let (y_lo, y_hi) = padded_range(self.all_points().map(|p| p.1)).ok_or_else(empty)?;
        let y_pad = (y_hi - y_lo) * 0.05;
        let y_range = (y_lo - y_pad)..(y_hi + y_pad);
        debug!(chart = %self.title, n_facets = self.facets.len(), path = %path.display(), "rendering lm plot");

        render_svg(path, size, |root| {
            let root = root.titled(&self.title, ("sans-serif", 24))?;
            let panels = root.split_evenly((1, self.facets.len()));

            for (panel, facet) in panels.iter().zip(&self.facets) {
                let mut chart = ChartBuilder::on(panel)
                    .caption(
                        format!("{} = {}", self.facet_label, facet.level),
                        ("sans-serif", 18),
                    )
                    .margin(10)
                    .x_label_area_size(40)
                    .y_label_area_size(60)
                    .build_cartesian_2d(x_lo..x_hi, y_range.clone())?;
                chart
                    .configure_mesh()
                    .x_desc(self.x_label.as_str())
                    .y_desc(self.y_label.as_str())
                    .draw()?;

                for series in &facet.series {
                    let hue_index = self
                        .hue_levels
                        .iter()
                        .position(|h| *h == series.hue)
                        .unwrap_or(0);
                    let c = color(hue_index);
                    chart
                        .draw_series(
                            series
                                .points
                                .iter()
                                .map(|&p| Circle::new(p, 2, c.mix(0.35).filled())),
                        )?
                        .label(format!("{} = {}", self.hue_label, series.hue))
                        .legend(move |(x, y)| Circle::new((x + 6, y), 4, c.filled()));

                    if let Some(fit) = series.fit {
                        let (lo, hi) = series.points.iter().fold(
                            (f64::INFINITY, f64::NEG_INFINITY),
                            |(lo, hi), p| (lo.min(p.0), hi.max(p.0)),
                        );
                        chart.draw_series(LineSeries::new(
                            [(lo, fit.predict(lo)), (hi, fit.predict(hi))],
                            c.stroke_width(2),
                        ))?;
                    }
                }

                chart
                    .configure_series_labels()
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()?;
            }
            Ok(())
        })
    }
}
