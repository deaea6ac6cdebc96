//! Hold-out evaluation shared by the tree and the forest.

use tracing::{info, instrument};

use crate::confusion::ConfusionMatrix;
use crate::error::RfError;
use crate::report::ClassificationReport;

/// A fitted model that labels row-major feature batches.
pub trait Classifier {
    /// Number of classes the model was trained on.
    fn n_classes(&self) -> usize;

    /// Predict one class per row, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if a row has the wrong width.
    fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError>;
}

/// Predictions and metrics on a held-out set.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub predictions: Vec<usize>,
    pub confusion: ConfusionMatrix,
    pub report: ClassificationReport,
}

impl Evaluation {
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.report.accuracy
    }
}

/// Predict `test_features` and score them against `test_labels`.
///
/// `class_names` labels the confusion matrix and report rows; pass an empty
/// slice to keep index names.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`RfError::EmptyDataset`] | `test_features` is empty |
/// | [`RfError::LabelCountMismatch`] | `test_labels.len() != test_features.len()` |
/// | [`RfError::PredictionFeatureMismatch`] | A row has the wrong width |
/// | [`RfError::ClassNameCountMismatch`] | `class_names` is non-empty and does not match the class count |
#[instrument(skip_all, fields(n_test = test_features.len()))]
pub fn evaluate_holdout<C: Classifier + ?Sized>(
    model: &C,
    test_features: &[Vec<f64>],
    test_labels: &[usize],
    class_names: &[String],
) -> Result<Evaluation, RfError> {
    if test_features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    if test_labels.len() != test_features.len() {
        return Err(RfError::LabelCountMismatch {
            samples: test_features.len(),
            labels: test_labels.len(),
        });
    }

    let predictions = model.predict_batch(test_features)?;
    let mut confusion = ConfusionMatrix::from_labels(test_labels, &predictions, model.n_classes())?;
    if !class_names.is_empty() {
        confusion = confusion.with_class_names(class_names)?;
    }
    let report = ClassificationReport::from_confusion(&confusion);

    info!(
        accuracy = report.accuracy,
        macro_f1 = report.macro_avg.f1,
        "hold-out evaluation complete"
    );

    Ok(Evaluation {
        predictions,
        confusion,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecisionTreeConfig, RandomForestConfig};

    fn data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let features: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let labels = (0..20).map(|i| usize::from(i >= 10)).collect();
        (features, labels)
    }

    #[test]
    fn tree_and_forest_share_the_evaluation_path() {
        let (features, labels) = data();
        let names = vec!["paid".to_string(), "unpaid".to_string()];
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let forest = RandomForestConfig::new(5).unwrap().fit(&features, &labels).unwrap();

        let models: [&dyn Classifier; 2] = [&tree, &forest];
        for model in models {
            let eval = evaluate_holdout(model, &features, &labels, &names).unwrap();
            assert_eq!(eval.confusion.total(), 20);
            assert_eq!(eval.predictions.len(), 20);
            assert_eq!(eval.report.classes[1].name, "unpaid");
        }
    }

    #[test]
    fn perfect_tree_scores_one() {
        let (features, labels) = data();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let eval = evaluate_holdout(&tree, &features, &labels, &[]).unwrap();
        assert!((eval.accuracy() - 1.0).abs() < f64::EPSILON);
        assert_eq!(eval.confusion.as_rows(), &[vec![10, 0], vec![0, 10]]);
    }

    #[test]
    fn input_checks() {
        let (features, labels) = data();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert!(matches!(
            evaluate_holdout(&tree, &[], &[], &[]),
            Err(RfError::EmptyDataset)
        ));
        assert!(matches!(
            evaluate_holdout(&tree, &features, &labels[..3], &[]),
            Err(RfError::LabelCountMismatch { .. })
        ));
        assert!(matches!(
            evaluate_holdout(&tree, &features, &labels, &["x".to_string()]),
            Err(RfError::ClassNameCountMismatch { .. })
        ));
    }
}
