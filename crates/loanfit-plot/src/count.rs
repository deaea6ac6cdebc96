//! Category counts with side-by-side bars per hue level.

use std::collections::BTreeSet;
use std::path::Path;

use plotters::prelude::*;
use tracing::debug;

use crate::PlotError;
use crate::svg::{color, render_svg};

/// Share of each category slot covered by its group of bars.
const GROUP_WIDTH: f64 = 0.8;

/// Row counts per `(category, hue)` pair.
///
/// Categories keep their first-appearance order; hue levels are sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct CountPlot {
    pub title: String,
    pub x_label: String,
    pub hue_label: String,
    pub categories: Vec<String>,
    pub hue_levels: Vec<String>,
    /// `counts[category][hue]`.
    pub counts: Vec<Vec<usize>>,
}

impl CountPlot {
    /// Tally `(category, hue)` observations.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::EmptySeries`] if there are no observations.
    pub fn new<'a>(
        title: &str,
        x_label: &str,
        hue_label: &str,
        observations: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, PlotError> {
        let observations: Vec<(&str, &str)> = observations.into_iter().collect();
        if observations.is_empty() {
            return Err(PlotError::EmptySeries {
                chart: title.to_string(),
            });
        }

        let mut categories: Vec<String> = Vec::new();
        for (category, _) in &observations {
            if !categories.iter().any(|c| c == category) {
                categories.push((*category).to_string());
            }
        }
        let hue_levels: Vec<String> = observations
            .iter()
            .map(|(_, hue)| *hue)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut counts = vec![vec![0usize; hue_levels.len()]; categories.len()];
        for (category, hue) in &observations {
            let c = categories.iter().position(|x| x == category);
            let h = hue_levels.iter().position(|x| x == hue);
            if let (Some(c), Some(h)) = (c, h) {
                counts[c][h] += 1;
            }
        }

        Ok(Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            hue_label: hue_label.to_string(),
            categories,
            hue_levels,
            counts,
        })
    }

    /// Total rows in `category`, or `None` if it never appeared.
    #[must_use]
    pub fn category_total(&self, category: &str) -> Option<usize> {
        let i = self.categories.iter().position(|c| c == category)?;
        Some(self.counts[i].iter().sum())
    }

    /// Horizontal extent of bar `hue` within category slot `category`.
    fn bar_span(&self, category: usize, hue: usize) -> (f64, f64) {
        let width = GROUP_WIDTH / self.hue_levels.len() as f64;
        let left = category as f64 - GROUP_WIDTH / 2.0 + width * hue as f64;
        (left, left + width)
    }

    /// Write the chart as SVG.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::Render`] if the backend fails.
    pub fn render(&self, path: &Path, size: (u32, u32)) -> Result<(), PlotError> {
        let n = self.categories.len();
        let y_max = self
            .counts
            .iter()
            .flatten()
            .copied()
            .max()
            .map_or(1.0, |m| (m as f64 * 1.1).max(1.0));
        debug!(chart = %self.title, n_categories = n, path = %path.display(), "rendering count plot");

        let label_of = |x: &f64| {
            let r = x.round();
            if (x - r).abs() < 1e-6 && r >= 0.0 && (r as usize) < n {
                self.categories[r as usize].clone()
            } else {
                String::new()
            }
        };

        render_svg(path, size, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(&self.title, ("sans-serif", 24))
                .margin(15)
                .x_label_area_size(50)
                .y_label_area_size(60)
                .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)?;
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(n + 1)
                .x_label_formatter(&label_of)
                .x_desc(self.x_label.as_str())
                .y_desc("count")
                .draw()?;

            for (h, level) in self.hue_levels.iter().enumerate() {
                let c = color(h);
                chart
                    .draw_series(self.counts.iter().enumerate().map(|(i, row)| {
                        let (left, right) = self.bar_span(i, h);
                        Rectangle::new([(left, 0.0), (right, row[h] as f64)], c.filled())
                    }))?
                    .label(format!("{} = {level}", self.hue_label))
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], c.filled()));
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plot() -> CountPlot {
        let rows = [
            ("debt_consolidation", "0"),
            ("credit_card", "1"),
            ("debt_consolidation", "1"),
            ("debt_consolidation", "0"),
            ("all_other", "0"),
        ];
        CountPlot::new("purpose", "purpose", "not.fully.paid", rows).unwrap()
    }

    #[test]
    fn categories_keep_first_appearance_order() {
        let p = plot();
        assert_eq!(p.categories, vec!["debt_consolidation", "credit_card", "all_other"]);
        assert_eq!(p.hue_levels, vec!["0", "1"]);
    }

    #[test]
    fn counts_per_category_and_hue() {
        let p = plot();
        assert_eq!(p.counts, vec![vec![2, 1], vec![0, 1], vec![1, 0]]);
        assert_eq!(p.category_total("debt_consolidation"), Some(3));
        assert_eq!(p.category_total("educational"), None);
    }

    #[test]
    fn bars_are_dodged_within_their_slot() {
        let p = plot();
        let (l0, r0) = p.bar_span(1, 0);
        let (l1, r1) = p.bar_span(1, 1);
        assert!((l0 - 0.6).abs() < 1e-12);
        assert!((r0 - l1).abs() < 1e-12);
        assert!((r1 - 1.4).abs() < 1e-12);
    }

    #[test]
    fn no_observations_is_an_error() {
        let err = CountPlot::new("t", "x", "h", std::iter::empty()).unwrap_err();
        assert!(matches!(err, PlotError::EmptySeries { .. }));
    }

    #[test]
    fn renders_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.svg");
        plot().render(&path, (600, 400)).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("not.fully.paid = 1"));
    }
}
