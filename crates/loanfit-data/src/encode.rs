//! One-hot encoding of categorical columns.

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::DataError;
use crate::frame::{Column, Frame};

/// Replaces categorical columns with 0/1 indicator columns.
///
/// Levels are the column's distinct values in lexicographic order. Output
/// keeps every other column in its original position and appends the
/// indicators, named `{column}_{level}`, for each encoded column in the
/// order given.
///
/// # Defaults
///
/// | Parameter    | Default |
/// |--------------|---------|
/// | `drop_first` | `true`  |
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    drop_first: bool,
}

impl OneHotEncoder {
    /// Encode the named columns. Repeated names are encoded once.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for column in columns {
            let column = column.into();
            if !unique.contains(&column) {
                unique.push(column);
            }
        }
        Self {
            columns: unique,
            drop_first: true,
        }
    }

    /// Drop the first level of each column, leaving k − 1 indicators.
    #[must_use]
    pub fn with_drop_first(mut self, drop_first: bool) -> Self {
        self.drop_first = drop_first;
        self
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn drop_first(&self) -> bool {
        self.drop_first
    }

    /// Return a new frame with the configured columns expanded.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::UnknownColumn`] | A configured column is not in `frame` |
    /// | [`DataError::NotCategorical`] | A configured column is numeric |
    /// | [`DataError::DuplicateColumn`] | An indicator name collides with an existing column |
    #[instrument(skip_all, fields(columns = ?self.columns))]
    pub fn encode(&self, frame: &Frame) -> Result<Frame, DataError> {
        let mut encoded = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let values = frame
                .require(name)?
                .as_categorical()
                .ok_or_else(|| DataError::NotCategorical {
                    column: name.clone(),
                })?;
            encoded.push((name, values));
        }

        let mut out: Vec<(String, Column)> = frame
            .iter()
            .filter(|(name, _)| !self.columns.iter().any(|c| c.as_str() == *name))
            .map(|(name, column)| (name.to_string(), column.clone()))
            .collect();

        for (name, values) in encoded {
            let levels: BTreeSet<&str> = values.iter().map(String::as_str).collect();
            let skip = usize::from(self.drop_first);
            debug!(column = %name, n_levels = levels.len(), "encoding column");
            for level in levels.into_iter().skip(skip) {
                let indicator = values
                    .iter()
                    .map(|v| if v == level { 1.0 } else { 0.0 })
                    .collect();
                out.push((format!("{name}_{level}"), Column::Numeric(indicator)));
            }
        }

        Frame::new(out)
    }
}
