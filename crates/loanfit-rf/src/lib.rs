//! CART decision trees and random forests for tabular classification.
//!
//! Provides Gini/entropy split criteria, bootstrap-aggregated forests trained
//! in parallel via rayon, impurity-based feature importances, and hold-out
//! evaluation with a confusion matrix and classification report.

mod config;
mod confusion;
mod error;
mod eval;
mod forest;
mod importance;
mod node;
mod predict;
mod report;
mod split;
mod tree;

pub use config::{MaxFeatures, RandomForestConfig, Voting};
pub use confusion::ConfusionMatrix;
pub use error::RfError;
pub use eval::{Classifier, Evaluation, evaluate_holdout};
pub use forest::RandomForest;
pub use importance::{RankedFeature, rank_features};
pub use node::{Node, NodeId};
pub use report::{ClassMetrics, ClassificationReport};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
