//! Loan dataset I/O and preparation for the loanfit pipeline.
//!
//! Loads the fixed-schema loan CSV, summarizes it, one-hot encodes
//! categorical columns, splits rows into seeded train/test partitions, and
//! writes evaluation artifacts as JSON.

mod encode;
mod error;
mod frame;
mod reader;
mod record;
mod split;
mod summary;
mod writer;

pub use encode::OneHotEncoder;
pub use error::DataError;
pub use frame::{Column, Frame};
pub use reader::LoanReader;
pub use record::{COLUMNS, LoanRecord, LoanTable};
pub use split::{SplitData, TrainTestSplit};
pub use summary::{ColumnInfo, ColumnStats, Describe, FrameInfo, Head};
pub use writer::{
    ExperimentName, FeatureRow, MetricRow, ModelMetrics, ResultWriter, SplitSummary,
};
