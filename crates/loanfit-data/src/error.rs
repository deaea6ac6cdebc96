//! Error types for loanfit-data.

use std::path::PathBuf;

/// Errors from loading, reshaping, splitting, and writing loan data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record or a cell
    /// that does not parse to its field type.
    #[error("CSV parse error in {path} at line {line} (byte offset {offset})")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// 1-based line number, header included.
        line: u64,
        /// Byte offset where the record starts.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the header does not hold exactly the expected columns.
    #[error("schema mismatch in {path}: missing {missing:?}, unexpected {unexpected:?}")]
    SchemaMismatch {
        /// Path to the CSV file.
        path: PathBuf,
        /// Expected columns absent from the header.
        missing: Vec<String>,
        /// Header columns that are unknown or repeated.
        unexpected: Vec<String>,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a float cell is NaN or infinite.
    #[error("non-finite value in {path}: row {row_index}, column {column}")]
    NonFiniteValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Column holding the value.
        column: String,
    },

    /// Returned when an in-memory record holds a NaN or infinite float.
    #[error("non-finite value in record {row_index}, column {column}")]
    NonFiniteField {
        /// Zero-based index into the records.
        row_index: usize,
        /// Column holding the value.
        column: String,
    },

    /// Returned when a named column is not in the frame.
    #[error("unknown column \"{column}\"")]
    UnknownColumn {
        /// The requested column name.
        column: String,
    },

    /// Returned when one-hot encoding is asked for a numeric column.
    #[error("column \"{column}\" is not categorical")]
    NotCategorical {
        /// The offending column.
        column: String,
    },

    /// Returned when a feature column is still categorical at split time.
    #[error("feature column \"{column}\" is not numeric; encode it first")]
    NonNumericFeature {
        /// The offending column.
        column: String,
    },

    /// Returned when a target value is not a non-negative integer class.
    #[error("target column \"{column}\" row {row_index} holds \"{value}\", expected a non-negative integer class")]
    InvalidLabel {
        /// Target column name.
        column: String,
        /// Zero-based row index.
        row_index: usize,
        /// The offending value as text.
        value: String,
    },

    /// Returned when two frame columns share a name.
    #[error("duplicate column \"{column}\"")]
    DuplicateColumn {
        /// The repeated name.
        column: String,
    },

    /// Returned when frame columns differ in length.
    #[error("column \"{column}\" has {got} rows, expected {expected}")]
    ColumnLengthMismatch {
        /// The offending column.
        column: String,
        /// Row count of the first column.
        expected: usize,
        /// Row count of this column.
        got: usize,
    },

    /// Returned when the test fraction is outside the open interval (0, 1).
    #[error("test fraction must be in (0, 1), got {test_fraction}")]
    InvalidTestFraction {
        /// The invalid fraction.
        test_fraction: f64,
    },

    /// Returned when the train or test partition would be empty.
    #[error("split of {n_samples} rows leaves an empty partition ({n_test} test rows)")]
    EmptySplit {
        /// Rows in the frame.
        n_samples: usize,
        /// Rows that would go to the test partition.
        n_test: usize,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when an artifact cannot be serialized to JSON.
    #[error("cannot serialize artifact")]
    Serialize {
        /// Underlying serde_json error.
        #[from]
        source: serde_json::Error,
    },
}
