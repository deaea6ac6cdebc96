//! Named-column tabular data.

use std::collections::HashSet;

use crate::DataError;

/// One column of a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `"numeric"` or `"categorical"`.
    #[must_use]
    pub fn dtype(&self) -> &'static str {
        match self {
            Column::Numeric(_) => "numeric",
            Column::Categorical(_) => "categorical",
        }
    }

    #[must_use]
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(v) => Some(v),
            Column::Categorical(_) => None,
        }
    }

    #[must_use]
    pub fn as_categorical(&self) -> Option<&[String]> {
        match self {
            Column::Categorical(v) => Some(v),
            Column::Numeric(_) => None,
        }
    }

    /// Display form of one cell.
    pub(crate) fn cell(&self, row: usize) -> String {
        match self {
            Column::Numeric(v) => v[row].to_string(),
            Column::Categorical(v) => v[row].clone(),
        }
    }
}

/// An ordered list of uniquely named, equal-length columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Frame {
    /// Build a frame from `(name, column)` pairs.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::DuplicateColumn`] | Two columns share a name |
    /// | [`DataError::ColumnLengthMismatch`] | A column's length differs from the first |
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self, DataError> {
        let mut seen = HashSet::new();
        let expected = columns.first().map_or(0, |(_, c)| c.len());
        for (name, column) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(DataError::DuplicateColumn {
                    column: name.clone(),
                });
            }
            if column.len() != expected {
                return Err(DataError::ColumnLengthMismatch {
                    column: name.clone(),
                    expected,
                    got: column.len(),
                });
            }
        }
        let (names, columns) = columns.into_iter().unzip();
        Ok(Self { names, columns })
    }

    /// Assemble from parts already known to be consistent.
    pub(crate) fn from_parts(names: Vec<String>, columns: Vec<Column>) -> Self {
        debug_assert_eq!(names.len(), columns.len());
        Self { names, columns }
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    /// Look up a column, failing with [`DataError::UnknownColumn`].
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownColumn`] when no column has that name.
    pub fn require(&self, name: &str) -> Result<&Column, DataError> {
        self.column(name).ok_or_else(|| DataError::UnknownColumn {
            column: name.to_string(),
        })
    }

    /// `(name, column)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(&self.columns)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(name: &str, values: &[f64]) -> (String, Column) {
        (name.to_string(), Column::Numeric(values.to_vec()))
    }

    #[test]
    fn builds_and_looks_up_columns() {
        let frame = Frame::new(vec![
            numeric("a", &[1.0, 2.0]),
            (
                "b".to_string(),
                Column::Categorical(vec!["x".into(), "y".into()]),
            ),
        ])
        .unwrap();
        assert_eq!(frame.n_rows(), 2);
        assert_eq!(frame.n_cols(), 2);
        assert_eq!(frame.column("b").unwrap().dtype(), "categorical");
        assert!(frame.column("c").is_none());
        assert!(matches!(
            frame.require("c"),
            Err(DataError::UnknownColumn { .. })
        ));
        let names: Vec<&str> = frame.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = Frame::new(vec![numeric("a", &[1.0]), numeric("a", &[2.0])]).unwrap_err();
        assert!(matches!(err, DataError::DuplicateColumn { .. }));
    }

    #[test]
    fn ragged_columns_rejected() {
        let err = Frame::new(vec![numeric("a", &[1.0, 2.0]), numeric("b", &[1.0])]).unwrap_err();
        assert!(matches!(
            err,
            DataError::ColumnLengthMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn empty_frame_has_no_rows() {
        let frame = Frame::new(vec![]).unwrap();
        assert_eq!(frame.n_rows(), 0);
        assert_eq!(frame.n_cols(), 0);
    }
}
