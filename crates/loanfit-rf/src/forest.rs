//! Random forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::{RandomForestConfig, Voting};
use crate::error::RfError;
use crate::tree::{DecisionTree, DecisionTreeConfig, check_training_data, normalize};

/// A fitted ensemble of CART trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) voting: Voting,
}

impl RandomForest {
    /// Mean of the trees' normalized impurity-decrease importances,
    /// renormalized to sum to one.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for tree in &self.trees {
            for (total, value) in totals.iter_mut().zip(tree.feature_importances()) {
                *total += value;
            }
        }
        normalize(&mut totals);
        totals
    }

    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[must_use]
    pub fn voting(&self) -> Voting {
        self.voting
    }
}

/// Row indices drawn uniformly with replacement.
fn bootstrap_rows(n_samples: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<RandomForest, RfError> {
    let n_features = check_training_data(features, labels)?;
    let n_samples = features.len();
    let n_classes = labels.iter().max().map_or(1, |&m| m + 1);
    let max_features = config.max_features.resolve(n_features)?;

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        n_classes,
        max_features,
        bootstrap = config.bootstrap,
        "training random forest"
    );

    // Seeds are drawn up front so the ensemble does not depend on thread scheduling.
    let mut master = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master.r#gen()).collect();

    let base = DecisionTreeConfig::new()
        .with_criterion(config.criterion)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(Some(max_features));
    let bootstrap = config.bootstrap;

    let trees = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let tree_config = base.clone().with_seed(rng.r#gen());
            if !bootstrap {
                return tree_config.fit_validated(features, labels, n_features, n_classes);
            }
            let rows = bootstrap_rows(n_samples, &mut rng);
            let sample_x: Vec<Vec<f64>> = rows.iter().map(|&r| features[r].clone()).collect();
            let sample_y: Vec<usize> = rows.iter().map(|&r| labels[r]).collect();
            tree_config.fit_validated(&sample_x, &sample_y, n_features, n_classes)
        })
        .collect::<Result<Vec<_>, RfError>>()?;

    debug!(
        total_nodes = trees.iter().map(|t| t.nodes().len()).sum::<usize>(),
        "random forest trained"
    );

    Ok(RandomForest {
        trees,
        n_features,
        n_classes,
        voting: config.voting,
    })
}
