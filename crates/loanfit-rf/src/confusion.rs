//! Confusion matrix for multi-class classification.

use std::fmt;

use crate::error::RfError;

/// A confusion matrix for multi-class classification.
///
/// Entry `matrix[true_class][predicted_class]` counts how many samples
/// with true label `true_class` were predicted as `predicted_class`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    class_names: Vec<String>,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from true and predicted labels.
    ///
    /// The matrix has `n_classes` rows, widened if any label is larger.
    /// Classes are named by their index until [`with_class_names`](Self::with_class_names).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero labels provided |
    /// | [`RfError::LabelCountMismatch`] | `predicted.len() != true_labels.len()` |
    pub fn from_labels(
        true_labels: &[usize],
        predicted: &[usize],
        n_classes: usize,
    ) -> Result<Self, RfError> {
        if true_labels.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if predicted.len() != true_labels.len() {
            return Err(RfError::LabelCountMismatch {
                samples: true_labels.len(),
                labels: predicted.len(),
            });
        }
        let observed = true_labels
            .iter()
            .chain(predicted)
            .max()
            .map_or(0, |&m| m + 1);
        let n_classes = n_classes.max(observed);

        let mut matrix = vec![vec![0usize; n_classes]; n_classes];
        for (&t, &p) in true_labels.iter().zip(predicted) {
            matrix[t][p] += 1;
        }
        Ok(Self {
            matrix,
            class_names: (0..n_classes).map(|c| c.to_string()).collect(),
        })
    }

    /// Replace the index-based class names used for display.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::ClassNameCountMismatch`] if `names.len() != n_classes`.
    pub fn with_class_names(mut self, names: &[String]) -> Result<Self, RfError> {
        if names.len() != self.n_classes() {
            return Err(RfError::ClassNameCountMismatch {
                n_classes: self.n_classes(),
                got: names.len(),
            });
        }
        self.class_names = names.to_vec();
        Ok(self)
    }

    /// Overall accuracy: proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.n_classes()).map(|i| self.matrix[i][i]).sum();
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Number of samples counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.matrix.len()
    }

    #[must_use]
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .class_names
            .iter()
            .map(|n| n.len() + 5)
            .chain(self.matrix.iter().flatten().map(|v| v.to_string().len()))
            .max()
            .unwrap_or(0)
            .max(7);

        write!(f, "{:>width$}", "")?;
        for name in &self.class_names {
            write!(f, " {:>width$}", format!("pred_{name}"))?;
        }
        writeln!(f)?;

        for (name, row) in self.class_names.iter().zip(&self.matrix) {
            write!(f, "{:>width$}", format!("true_{name}"))?;
            for val in row {
                write!(f, " {val:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_confusion_matrix() {
        // True: [0,0,0, 1,1,1, 2,2,2]
        // Pred: [0,0,1, 1,1,2, 2,2,0]
        let true_labels = vec![0, 0, 0, 1, 1, 1, 2, 2, 2];
        let predicted = vec![0, 0, 1, 1, 1, 2, 2, 2, 0];
        let cm = ConfusionMatrix::from_labels(&true_labels, &predicted, 3).unwrap();
        assert_eq!(cm.as_rows()[0], vec![2, 1, 0]);
        assert_eq!(cm.as_rows()[2], vec![1, 0, 2]);
        assert_eq!(cm.total(), 9);
        assert!((cm.accuracy() - 6.0 / 9.0).abs() < 1e-10);
    }

    #[test]
    fn empty_labels_error() {
        let err = ConfusionMatrix::from_labels(&[], &[], 3).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn length_mismatch_error() {
        let err = ConfusionMatrix::from_labels(&[0, 1], &[0], 2).unwrap_err();
        assert!(matches!(
            err,
            RfError::LabelCountMismatch {
                samples: 2,
                labels: 1
            }
        ));
    }

    #[test]
    fn unseen_label_widens_the_matrix() {
        let cm = ConfusionMatrix::from_labels(&[0, 2], &[0, 1], 2).unwrap();
        assert_eq!(cm.n_classes(), 3);
        assert_eq!(cm.as_rows()[2], vec![0, 1, 0]);
    }

    #[test]
    fn display_uses_class_names() {
        let names = vec!["paid".to_string(), "unpaid".to_string()];
        let cm = ConfusionMatrix::from_labels(&[0, 1, 1], &[0, 1, 0], 2)
            .unwrap()
            .with_class_names(&names)
            .unwrap();
        let output = cm.to_string();
        assert!(output.contains("pred_paid"));
        assert!(output.contains("true_unpaid"));
        assert_eq!(output.lines().count(), 3);
    }

    #[test]
    fn class_name_count_is_checked() {
        let cm = ConfusionMatrix::from_labels(&[0, 1], &[0, 1], 2).unwrap();
        assert!(matches!(
            cm.with_class_names(&["only".to_string()]),
            Err(RfError::ClassNameCountMismatch { n_classes: 2, got: 1 })
        ));
    }
}
