//! Per-class precision, recall, and F1 with macro and weighted averages.

use std::fmt;

use crate::confusion::ConfusionMatrix;

/// Precision, recall, F1 score, and support for one class or one average.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    /// Class name, or `macro avg` / `weighted avg` for the summary rows.
    pub name: String,
    /// TP / (TP + FP). 0.0 if nothing was predicted as this class.
    pub precision: f64,
    /// TP / (TP + FN). 0.0 if the class has no true samples.
    pub recall: f64,
    /// Harmonic mean of precision and recall. 0.0 if both are zero.
    pub f1: f64,
    /// Number of true samples.
    pub support: usize,
}

/// Classification report derived from a [`ConfusionMatrix`].
///
/// `Display` renders the usual layout:
///
/// ```text
///               precision    recall  f1-score   support
///
///            0       0.85      0.82      0.84      2431
///            1       0.19      0.23      0.20       443
///
///     accuracy                           0.73      2874
///    macro avg       0.52      0.52      0.52      2874
/// weighted avg       0.75      0.73      0.74      2874
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Compute the report, naming classes as the matrix does.
    ///
    /// Classes that appear in neither the true nor the predicted labels get
    /// no row and do not count toward the averages.
    #[must_use]
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let rows = cm.as_rows();
        let n = cm.n_classes();
        let classes: Vec<ClassMetrics> = (0..n)
            .filter_map(|c| {
                let tp = rows[c][c];
                let predicted: usize = (0..n).map(|i| rows[i][c]).sum();
                let support: usize = rows[c].iter().sum();
                if predicted == 0 && support == 0 {
                    return None;
                }
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                Some(ClassMetrics {
                    name: cm.class_names()[c].clone(),
                    precision,
                    recall,
                    f1: f1(precision, recall),
                    support,
                })
            })
            .collect();

        let total = cm.total();
        let uniform = vec![1.0; classes.len()];
        let by_support: Vec<f64> = classes.iter().map(|m| m.support as f64).collect();
        let macro_avg = average("macro avg", &classes, &uniform, total);
        let weighted_avg = average("weighted avg", &classes, &by_support, total);

        Self {
            accuracy: cm.accuracy(),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    /// Samples covered by the report.
    #[must_use]
    pub fn total_support(&self) -> usize {
        self.macro_avg.support
    }
}

/// Weighted mean of each metric across classes; 0.0 when the weights sum to zero.
fn average(name: &str, classes: &[ClassMetrics], weights: &[f64], support: usize) -> ClassMetrics {
    let denom: f64 = weights.iter().sum();
    let mean = |metric: fn(&ClassMetrics) -> f64| {
        if denom == 0.0 {
            return 0.0;
        }
        classes.iter().zip(weights).map(|(m, w)| w * metric(m)).sum::<f64>() / denom
    };
    ClassMetrics {
        name: name.to_string(),
        precision: mean(|m| m.precision),
        recall: mean(|m| m.recall),
        f1: mean(|m| m.f1),
        support,
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|m| m.name.len())
            .chain(std::iter::once(self.weighted_avg.name.len()))
            .max()
            .unwrap_or(0);

        let row = |f: &mut fmt::Formatter<'_>, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.name, m.precision, m.recall, m.f1, m.support
            )
        };

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for m in &self.classes {
            row(f, m)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.total_support()
        )?;
        row(f, &self.macro_avg)?;
        row(f, &self.weighted_avg)
    }
}
