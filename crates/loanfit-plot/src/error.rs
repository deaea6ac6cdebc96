//! Error types for loanfit-plot.

use std::path::PathBuf;

/// Errors from building or rendering exploratory charts.
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    /// Returned when a chart has no data points to draw.
    #[error("chart \"{chart}\" has no data points")]
    EmptySeries {
        /// Chart title.
        chart: String,
    },

    /// Returned when a histogram is asked for zero bins.
    #[error("bin count must be at least 1, got {bins}")]
    InvalidBinCount {
        /// The invalid bin count.
        bins: usize,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDir {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the drawing backend fails.
    #[error("cannot render {path}: {message}")]
    Render {
        /// SVG file being written.
        path: PathBuf,
        /// Backend error description.
        message: String,
    },
}
