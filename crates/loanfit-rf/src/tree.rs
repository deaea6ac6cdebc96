use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    RfError,
    eval::Classifier,
    node::{Node, NodeId},
    split::{SplitCriterion, SplitSearch},
};

/// Configuration for a single CART classification tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Gini`                |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a config with the defaults listed above.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Limit the depth of the tree (the root is depth 0). `None` grows until
    /// leaves are pure or cannot be split.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Number of non-constant features examined per split. `None` means all.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Seed for the feature visiting order.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fit a tree on row-major `features` with zero-based class `labels`.
    ///
    /// The number of classes is `max(labels) + 1`.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                           |
    /// |--------------------------------------|------------------------------------------------|
    /// | [`RfError::EmptyDataset`]            | `features` is empty                            |
    /// | [`RfError::LabelCountMismatch`]      | `labels.len() != features.len()`               |
    /// | [`RfError::ZeroFeatures`]            | rows have no columns                           |
    /// | [`RfError::FeatureCountMismatch`]    | rows have inconsistent lengths                 |
    /// | [`RfError::NonFiniteValue`]          | any value is NaN or infinite                   |
    /// | [`RfError::InvalidMaxDepth`]         | `max_depth` is `Some(0)`                       |
    /// | [`RfError::InvalidMinSamplesSplit`]  | `min_samples_split` < 2                        |
    /// | [`RfError::InvalidMinSamplesLeaf`]   | `min_samples_leaf` < 1                         |
    /// | [`RfError::InvalidMaxFeatures`]      | `max_features` outside [1, n_features]         |
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, RfError> {
        let n_features = check_training_data(features, labels)?;
        let n_classes = labels.iter().max().map_or(1, |&m| m + 1);
        self.fit_validated(features, labels, n_features, n_classes)
    }

    /// Fit on data that already passed [`check_training_data`], with a class
    /// count fixed by the caller (bootstrap samples may miss a class).
    pub(crate) fn fit_validated(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        n_features: usize,
        n_classes: usize,
    ) -> Result<DecisionTree, RfError> {
        if self.max_depth == Some(0) {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(RfError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }

        let columns: Vec<Vec<f64>> = (0..n_features)
            .map(|f| features.iter().map(|row| row[f]).collect())
            .collect();
        let search = SplitSearch {
            criterion: self.criterion,
            max_features,
            min_samples_leaf: self.min_samples_leaf,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let nodes = self.grow(&columns, labels, n_classes, search, &mut rng);

        debug!(
            n_nodes = nodes.len(),
            n_features,
            n_classes,
            "decision tree fitted"
        );

        Ok(DecisionTree {
            nodes,
            n_features,
            n_classes,
        })
    }

    /// Depth-first growth with an explicit stack; nodes land in pre-order so
    /// the root is slot 0.
    fn grow(
        &self,
        columns: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
        search: SplitSearch,
        rng: &mut ChaCha8Rng,
    ) -> Vec<Node> {
        struct Pending {
            rows: Vec<usize>,
            depth: usize,
            parent: Option<(usize, bool)>,
        }

        let mut arena: Vec<Node> = Vec::new();
        let mut stack = vec![Pending {
            rows: (0..labels.len()).collect(),
            depth: 0,
            parent: None,
        }];

        while let Some(Pending {
            rows,
            depth,
            parent,
        }) = stack.pop()
        {
            let id = NodeId::from_arena_len(arena.len());
            if let Some((slot, is_left)) = parent
                && let Node::Internal { left, right, .. } = &mut arena[slot]
            {
                if is_left {
                    *left = id;
                } else {
                    *right = id;
                }
            }

            let mut counts = vec![0usize; n_classes];
            for &r in &rows {
                counts[labels[r]] += 1;
            }
            let impurity = self.criterion.impurity(&counts);
            let stop = rows.len() < self.min_samples_split
                || impurity <= 0.0
                || self.max_depth.is_some_and(|d| depth >= d);

            let split = if stop {
                None
            } else {
                search.best_split(columns, labels, &rows, &counts, rng)
            };

            match split {
                None => arena.push(Node::Leaf { counts, impurity }),
                Some(split) => {
                    let slot = arena.len();
                    arena.push(Node::Internal {
                        feature: split.feature,
                        threshold: split.threshold,
                        left: id,
                        right: id,
                        counts,
                        impurity,
                        weighted_gain: split.weighted_gain,
                    });
                    stack.push(Pending {
                        rows: split.right,
                        depth: depth + 1,
                        parent: Some((slot, false)),
                    });
                    stack.push(Pending {
                        rows: split.left,
                        depth: depth + 1,
                        parent: Some((slot, true)),
                    });
                }
            }
        }
        arena
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a row-major training set and return its feature count.
pub(crate) fn check_training_data(
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<usize, RfError> {
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    if labels.len() != features.len() {
        return Err(RfError::LabelCountMismatch {
            samples: features.len(),
            labels: labels.len(),
        });
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(n_features)
}

/// A fitted CART classification tree stored as a node arena.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Predict the majority training class of the leaf `sample` falls into.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        Ok(self.leaf(sample)?.majority_class())
    }

    /// Class frequencies of the leaf `sample` falls into.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, RfError> {
        Ok(self.leaf(sample)?.class_probabilities())
    }

    /// Predict every row of a row-major batch.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] for the first row of the wrong width.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        features.iter().map(|row| self.predict(row)).collect()
    }

    /// Mean decrease in impurity per feature, normalized to sum to one.
    ///
    /// All zeros when the tree is a single leaf.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Internal {
                feature,
                weighted_gain,
                ..
            } = node
            {
                totals[*feature] += weighted_gain;
            }
        }
        normalize(&mut totals);
        totals
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Length of the longest root-to-leaf path; a lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((slot, d)) = stack.pop() {
            match &self.nodes[slot] {
                Node::Leaf { .. } => deepest = deepest.max(d),
                Node::Internal { left, right, .. } => {
                    stack.push((left.slot(), d + 1));
                    stack.push((right.slot(), d + 1));
                }
            }
        }
        deepest
    }

    fn leaf(&self, sample: &[f64]) -> Result<&Node, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut node = &self.nodes[0];
        while let Node::Internal {
            feature,
            threshold,
            left,
            right,
            ..
        } = node
        {
            let next = if sample[*feature] <= *threshold { left } else { right };
            node = &self.nodes[next.slot()];
        }
        Ok(node)
    }
}

impl Classifier for DecisionTree {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        DecisionTree::predict_batch(self, features)
    }
}

pub(crate) fn normalize(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        values.iter_mut().for_each(|v| *v /= sum);
    }
}
