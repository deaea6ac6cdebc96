use std::fmt;

/// Position of a node inside a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_arena_len(len: usize) -> Self {
        Self(len as u32)
    }

    /// Return the arena slot this id refers to.
    #[must_use]
    pub fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of a fitted CART tree.
///
/// Children are addressed by [`NodeId`] into the owning tree's `Vec<Node>`.
/// Both variants keep the per-class training counts that reached them, so
/// leaf probabilities and majority votes are derived rather than stored.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Samples with `x[feature] <= threshold` descend into `left`.
    Internal {
        /// Column tested at this node.
        feature: usize,
        /// Midpoint between the two neighbouring training values.
        threshold: f64,
        /// Child receiving values at or below the threshold.
        left: NodeId,
        /// Child receiving values above the threshold.
        right: NodeId,
        /// Training class counts at this node.
        counts: Vec<usize>,
        /// Impurity before the split.
        impurity: f64,
        /// `n·I(parent) − n_l·I(left) − n_r·I(right)`.
        weighted_gain: f64,
    },
    /// Terminal node.
    Leaf {
        /// Training class counts at this leaf.
        counts: Vec<usize>,
        /// Impurity of the leaf.
        impurity: f64,
    },
}

impl Node {
    /// Per-class training counts that reached this node.
    #[must_use]
    pub fn counts(&self) -> &[usize] {
        match self {
            Node::Internal { counts, .. } | Node::Leaf { counts, .. } => counts,
        }
    }

    /// Number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.counts().iter().sum()
    }

    #[must_use]
    pub fn impurity(&self) -> f64 {
        match self {
            Node::Internal { impurity, .. } | Node::Leaf { impurity, .. } => *impurity,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Class with the most training samples; ties go to the lowest class index.
    #[must_use]
    pub fn majority_class(&self) -> usize {
        argmax_first(self.counts())
    }

    /// Training class frequencies normalized to sum to one.
    #[must_use]
    pub fn class_probabilities(&self) -> Vec<f64> {
        let total = self.n_samples();
        if total == 0 {
            return vec![0.0; self.counts().len()];
        }
        self.counts()
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect()
    }
}

/// Index of the largest count, preferring the earliest on ties.
pub(crate) fn argmax_first(values: &[usize]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(counts: Vec<usize>) -> Node {
        Node::Leaf {
            counts,
            impurity: 0.0,
        }
    }

    #[test]
    fn majority_prefers_lowest_index_on_tie() {
        assert_eq!(leaf(vec![3, 3]).majority_class(), 0);
        assert_eq!(leaf(vec![1, 4, 4]).majority_class(), 1);
    }

    #[test]
    fn probabilities_follow_counts() {
        let probs = leaf(vec![1, 3]).class_probabilities();
        assert!((probs[0] - 0.25).abs() < 1e-12);
        assert!((probs[1] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn empty_leaf_has_zero_probabilities() {
        assert_eq!(leaf(vec![0, 0]).class_probabilities(), vec![0.0, 0.0]);
    }

    #[test]
    fn internal_node_reports_samples() {
        let node = Node::Internal {
            feature: 2,
            threshold: 0.5,
            left: NodeId::from_arena_len(1),
            right: NodeId::from_arena_len(2),
            counts: vec![6, 4],
            impurity: 0.48,
            weighted_gain: 2.1,
        };
        assert_eq!(node.n_samples(), 10);
        assert!(!node.is_leaf());
        assert_eq!(format!("{}", NodeId::from_arena_len(7)), "#7");
    }
}
