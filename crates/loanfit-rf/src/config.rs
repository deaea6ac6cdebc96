//! Configuration builder for random forest training.

use crate::error::RfError;
use crate::forest::RandomForest;
use crate::split::SplitCriterion;

/// How many features each split of each tree may examine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1.
    Sqrt,
    /// `floor(log2(n_features))`, at least 1.
    Log2,
    /// `floor(fraction · n_features)`, at least 1. Fraction must be in (0.0, 1.0].
    Fraction(f64),
    /// A fixed count.
    Fixed(usize),
    /// Every feature.
    All,
}

impl MaxFeatures {
    /// Resolve to a concrete count for a dataset with `n_features` columns.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidMaxFeatures`] when the count is outside `[1, n_features]`.
    pub fn resolve(self, n_features: usize) -> Result<usize, RfError> {
        let n = n_features as f64;
        let resolved = match self {
            MaxFeatures::Sqrt => (n.sqrt().floor() as usize).max(1),
            MaxFeatures::Log2 => (n.log2().floor() as usize).max(1),
            MaxFeatures::Fraction(f) if f > 0.0 && f <= 1.0 => ((n * f).floor() as usize).max(1),
            MaxFeatures::Fraction(_) => 0,
            MaxFeatures::Fixed(k) => k,
            MaxFeatures::All => n_features,
        };
        if resolved == 0 || resolved > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features: resolved,
                n_features,
            });
        }
        Ok(resolved)
    }
}

impl std::str::FromStr for MaxFeatures {
    type Err = RfError;

    /// `sqrt`, `log2`, `all`, an integer count, or a fraction containing a `.`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparsable = || RfError::UnparsableMaxFeatures {
            value: s.to_string(),
        };
        match s.trim() {
            "sqrt" => Ok(MaxFeatures::Sqrt),
            "log2" => Ok(MaxFeatures::Log2),
            "all" => Ok(MaxFeatures::All),
            t if t.contains('.') => t
                .parse()
                .map(MaxFeatures::Fraction)
                .map_err(|_| unparsable()),
            t => t.parse().map(MaxFeatures::Fixed).map_err(|_| unparsable()),
        }
    }
}

/// How the trees' outputs are combined into one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Voting {
    /// Each tree casts one vote for its predicted class.
    #[default]
    Majority,
    /// Leaf class frequencies are averaged across trees.
    Soft,
}

/// Configuration for random forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default    |
/// |---------------------|------------|
/// | `max_features`      | `Sqrt`     |
/// | `max_depth`         | `None`     |
/// | `min_samples_split` | 2          |
/// | `min_samples_leaf`  | 1          |
/// | `criterion`         | `Gini`     |
/// | `bootstrap`         | `true`     |
/// | `voting`            | `Majority` |
/// | `seed`              | 42         |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_features: MaxFeatures,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) bootstrap: bool,
    pub(crate) voting: Voting,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Create a new config with the given ensemble size.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, RfError> {
        if n_trees == 0 {
            return Err(RfError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: SplitCriterion::Gini,
            bootstrap: true,
            voting: Voting::Majority,
            seed: 42,
        })
    }

    // --- Setters ---

    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the maximum tree depth. `None` means unlimited.
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

    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Draw each tree's training rows with replacement (`true`) or give every
    /// tree the full training set (`false`).
    #[must_use]
    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    #[must_use]
    pub fn with_voting(mut self, voting: Voting) -> Self {
        self.voting = voting;
        self
    }

    /// Master seed; per-tree seeds are derived from it.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    #[must_use]
    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }

    #[must_use]
    pub fn voting(&self) -> Voting {
        self.voting
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a forest on row-major `features` with zero-based class `labels`.
    ///
    /// # Errors
    ///
    /// | Variant                            | When                                         |
    /// |------------------------------------|----------------------------------------------|
    /// | [`RfError::EmptyDataset`]          | `features` is empty                          |
    /// | [`RfError::LabelCountMismatch`]    | `labels.len() != features.len()`             |
    /// | [`RfError::ZeroFeatures`]          | rows have zero columns                       |
    /// | [`RfError::FeatureCountMismatch`]  | rows have inconsistent lengths               |
    /// | [`RfError::NonFiniteValue`]        | any value is NaN or infinite                 |
    /// | [`RfError::InvalidMaxFeatures`]    | resolved max_features outside [1, n_features]|
    /// | tree config errors                 | invalid depth / split / leaf settings        |
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<RandomForest, RfError> {
        crate::forest::train(self, features, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_and_log2_round_down() {
        assert_eq!(MaxFeatures::Sqrt.resolve(18).unwrap(), 4);
        assert_eq!(MaxFeatures::Sqrt.resolve(1).unwrap(), 1);
        assert_eq!(MaxFeatures::Log2.resolve(18).unwrap(), 4);
        assert_eq!(MaxFeatures::Log2.resolve(1).unwrap(), 1);
    }

    #[test]
    fn fraction_bounds() {
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(9).unwrap(), 4);
        assert_eq!(MaxFeatures::Fraction(0.01).resolve(9).unwrap(), 1);
        assert!(MaxFeatures::Fraction(0.0).resolve(9).is_err());
        assert!(MaxFeatures::Fraction(1.5).resolve(9).is_err());
    }

    #[test]
    fn parses_from_text() {
        assert_eq!("sqrt".parse::<MaxFeatures>().unwrap(), MaxFeatures::Sqrt);
        assert_eq!("log2".parse::<MaxFeatures>().unwrap(), MaxFeatures::Log2);
        assert_eq!("all".parse::<MaxFeatures>().unwrap(), MaxFeatures::All);
        assert_eq!("5".parse::<MaxFeatures>().unwrap(), MaxFeatures::Fixed(5));
        assert_eq!("0.5".parse::<MaxFeatures>().unwrap(), MaxFeatures::Fraction(0.5));
        for bad in ["", "half", "-1", "1.2.3"] {
            assert!(matches!(
                bad.parse::<MaxFeatures>(),
                Err(RfError::UnparsableMaxFeatures { .. })
            ));
        }
    }

    #[test]
    fn fixed_must_fit() {
        assert_eq!(MaxFeatures::Fixed(3).resolve(3).unwrap(), 3);
        assert!(matches!(
            MaxFeatures::Fixed(4).resolve(3),
            Err(RfError::InvalidMaxFeatures {
                max_features: 4,
                n_features: 3
            })
        ));
    }

    #[test]
    fn zero_trees_rejected() {
        assert!(matches!(
            RandomForestConfig::new(0),
            Err(RfError::InvalidTreeCount { n_trees: 0 })
        ));
    }

    #[test]
    fn builder_round_trip() {
        let config = RandomForestConfig::new(25)
            .unwrap()
            .with_max_depth(Some(6))
            .with_criterion(SplitCriterion::Entropy)
            .with_bootstrap(false)
            .with_voting(Voting::Soft)
            .with_seed(9);
        assert_eq!(config.n_trees(), 25);
        assert_eq!(config.max_depth(), Some(6));
        assert_eq!(config.criterion(), SplitCriterion::Entropy);
        assert!(!config.bootstrap());
        assert_eq!(config.voting(), Voting::Soft);
        assert_eq!(config.seed(), 9);
        assert_eq!(config.max_features(), MaxFeatures::Sqrt);
    }
}
