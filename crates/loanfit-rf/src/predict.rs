//! Prediction methods for the random forest ensemble.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::config::Voting;
use crate::error::RfError;
use crate::eval::Classifier;
use crate::forest::RandomForest;
use crate::node::argmax_first;

impl RandomForest {
    /// Predict the class of a single sample.
    ///
    /// Under [`Voting::Majority`] the class with the most tree votes wins;
    /// under [`Voting::Soft`] the class with the highest mean leaf frequency
    /// wins. Ties go to the lowest class index.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        match self.voting {
            Voting::Majority => Ok(argmax_first(&self.votes(sample)?)),
            Voting::Soft => {
                let proba = self.predict_proba(sample)?;
                let mut best = 0;
                for (class, p) in proba.iter().enumerate() {
                    if *p > proba[best] {
                        best = class;
                    }
                }
                Ok(best)
            }
        }
    }

    /// Per-class scores for a single sample.
    ///
    /// Vote shares under [`Voting::Majority`], mean leaf class frequencies
    /// under [`Voting::Soft`]. Either way the entries sum to one.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, RfError> {
        self.check_width(sample)?;
        let n_trees = self.trees.len() as f64;
        match self.voting {
            Voting::Majority => Ok(self
                .votes(sample)?
                .into_iter()
                .map(|v| v as f64 / n_trees)
                .collect()),
            Voting::Soft => {
                let mut mean = vec![0.0f64; self.n_classes];
                for tree in &self.trees {
                    for (m, p) in mean.iter_mut().zip(tree.predict_proba(sample)?) {
                        *m += p;
                    }
                }
                mean.iter_mut().for_each(|m| *m /= n_trees);
                Ok(mean)
            }
        }
    }

    /// Predict every row of a batch in parallel; output order matches input order.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any row has the wrong width.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        features.par_iter().map(|row| self.predict(row)).collect()
    }

    fn votes(&self, sample: &[f64]) -> Result<Vec<usize>, RfError> {
        self.check_width(sample)?;
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            votes[tree.predict(sample)?] += 1;
        }
        Ok(votes)
    }

    fn check_width(&self, sample: &[f64]) -> Result<(), RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        RandomForest::predict_batch(self, features)
    }
}
