//! Seeded train/test partitioning of an encoded frame.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::DataError;
use crate::frame::Frame;

/// Train/test split configuration.
///
/// Construct via [`TrainTestSplit::new`], then chain `with_seed` if desired.
/// Without a seed, one is drawn from OS entropy, logged, and recorded in
/// [`SplitData::seed`] so the split can be replayed.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    test_fraction: f64,
    seed: Option<u64>,
}

/// Row-major train and test partitions.
#[derive(Debug, Clone)]
pub struct SplitData {
    pub train_features: Vec<Vec<f64>>,
    pub train_labels: Vec<usize>,
    pub test_features: Vec<Vec<f64>>,
    pub test_labels: Vec<usize>,
    /// Feature column names, in feature-vector order.
    pub feature_names: Vec<String>,
    /// Distinct target values, ascending; label `i` stands for `class_values[i]`.
    pub class_values: Vec<f64>,
    /// Source frame rows of the training partition.
    pub train_indices: Vec<usize>,
    /// Source frame rows of the test partition.
    pub test_indices: Vec<usize>,
    /// Seed the permutation was drawn with.
    pub seed: u64,
}

impl SplitData {
    /// Number of distinct target values across both partitions.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.class_values.len()
    }

    /// Target values rendered as class names, in label order.
    #[must_use]
    pub fn class_names(&self) -> Vec<String> {
        self.class_values.iter().map(f64::to_string).collect()
    }
}

impl TrainTestSplit {
    /// Create a split holding out `test_fraction` of the rows.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidTestFraction`] unless `0 < test_fraction < 1`.
    pub fn new(test_fraction: f64) -> Result<Self, DataError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(DataError::InvalidTestFraction { test_fraction });
        }
        Ok(Self {
            test_fraction,
            seed: None,
        })
    }

    /// Set the permutation seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Number of test rows for `n_samples` rows: `ceil(test_fraction · n)`.
    #[must_use]
    pub fn n_test(&self, n_samples: usize) -> usize {
        // Absorb float error so 0.3 · 100 is 30 rather than 31.
        let raw = self.test_fraction * n_samples as f64;
        (raw - 1e-9).ceil().max(0.0) as usize
    }

    /// Split `frame`, using `target` as labels and every other column as features.
    ///
    /// Distinct target values are mapped, in ascending order, to labels `0..k`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::UnknownColumn`] | `target` is not in `frame` |
    /// | [`DataError::InvalidLabel`] | A target value is not a non-negative integer |
    /// | [`DataError::NonNumericFeature`] | A feature column is categorical |
    /// | [`DataError::EmptySplit`] | Train or test partition would be empty |
    #[instrument(skip_all, fields(label_column = %target, test_fraction = self.test_fraction))]
    pub fn split(&self, frame: &Frame, target: &str) -> Result<SplitData, DataError> {
        let (labels, class_values) = labels(frame, target)?;

        let mut feature_names = Vec::new();
        let mut feature_columns = Vec::new();
        for (name, column) in frame.iter().filter(|(name, _)| *name != target) {
            let values = column
                .as_numeric()
                .ok_or_else(|| DataError::NonNumericFeature {
                    column: name.to_string(),
                })?;
            feature_names.push(name.to_string());
            feature_columns.push(values);
        }

        let n_samples = frame.n_rows();
        let n_test = self.n_test(n_samples);
        if n_test == 0 || n_test >= n_samples {
            return Err(DataError::EmptySplit { n_samples, n_test });
        }

        let seed = match self.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::thread_rng().r#gen();
                info!(seed, "no split seed given, drew one");
                seed
            }
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..n_samples).collect();
        order.shuffle(&mut rng);
        let train_indices = order.split_off(n_test);
        let test_indices = order;

        let row = |i: usize| -> Vec<f64> { feature_columns.iter().map(|c| c[i]).collect() };
        let split = SplitData {
            train_features: train_indices.iter().map(|&i| row(i)).collect(),
            train_labels: train_indices.iter().map(|&i| labels[i]).collect(),
            test_features: test_indices.iter().map(|&i| row(i)).collect(),
            test_labels: test_indices.iter().map(|&i| labels[i]).collect(),
            feature_names,
            class_values,
            train_indices,
            test_indices,
            seed,
        };

        info!(
            n_train = split.train_indices.len(),
            n_test = split.test_indices.len(),
            n_features = split.feature_names.len(),
            n_classes = split.class_values.len(),
            seed,
            "train/test split ready"
        );
        Ok(split)
    }
}

/// Target column as dense class indices, plus the value behind each index.
fn labels(frame: &Frame, target: &str) -> Result<(Vec<usize>, Vec<f64>), DataError> {
    let column = frame.require(target)?;
    let invalid = |row_index: usize, value: String| DataError::InvalidLabel {
        column: target.to_string(),
        row_index,
        value,
    };
    let Some(values) = column.as_numeric() else {
        let first = column.as_categorical().and_then(|v| v.first()).cloned();
        return Err(invalid(0, first.unwrap_or_default()));
    };
    if let Some((i, v)) = values
        .iter()
        .enumerate()
        .find(|&(_, &v)| !(v.is_finite() && v >= 0.0 && v.fract() == 0.0))
    {
        return Err(invalid(i, v.to_string()));
    }

    let mut class_values = values.to_vec();
    class_values.sort_by(f64::total_cmp);
    class_values.dedup();
    let labels = values
        .iter()
        .map(|v| class_values.partition_point(|c| c < v))
        .collect();
    Ok((labels, class_values))
}
