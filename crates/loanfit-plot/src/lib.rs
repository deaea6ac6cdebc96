//! Exploratory SVG charts for the loan dataset.
//!
//! Each chart type computes its bins, counts and fits as plain data on
//! construction, so the numbers can be checked without rendering. Rendering
//! writes one SVG file through `plotters`.

mod charts;
mod count;
mod error;
mod histogram;
mod joint;
mod lm;
mod svg;

pub use charts::{ChartConfig, render_loan_charts};
pub use count::CountPlot;
pub use error::PlotError;
pub use histogram::{HistogramGroup, OverlaidHistogram, bin_counts, bin_edges};
pub use joint::{JointPlot, Marginal};
pub use lm::{LinearFit, LmFacet, LmObservation, LmPlot, LmSeries};
