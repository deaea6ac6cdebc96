use rand::Rng;

/// Impurity measure used to score candidate splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitCriterion {
    /// `1 − Σ p_i²`
    #[default]
    Gini,
    /// `−Σ p_i · log2(p_i)`
    Entropy,
}

impl SplitCriterion {
    /// Impurity of a node with the given class counts. An empty node is pure.
    #[must_use]
    pub fn impurity(self, counts: &[usize]) -> f64 {
        let total: usize = counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let n = total as f64;
        let proportions = counts.iter().filter(|&&c| c > 0).map(|&c| c as f64 / n);
        match self {
            SplitCriterion::Gini => 1.0 - proportions.map(|p| p * p).sum::<f64>(),
            SplitCriterion::Entropy => -proportions.map(|p| p * p.log2()).sum::<f64>(),
        }
    }
}

/// The winning partition of a node's rows.
#[derive(Debug)]
pub(crate) struct Split {
    pub(crate) feature: usize,
    pub(crate) threshold: f64,
    pub(crate) weighted_gain: f64,
    pub(crate) left: Vec<usize>,
    pub(crate) right: Vec<usize>,
}

/// Search parameters shared by every node of one tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SplitSearch {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

impl SplitSearch {
    /// Find the best threshold split of `rows`.
    ///
    /// `columns` is column-major (`columns[feature][row]`). Features are
    /// visited in a random order; constant features are skipped without
    /// counting against `max_features`, so a split is only missed when every
    /// feature is constant on `rows` or `min_samples_leaf` rules out all
    /// boundaries.
    pub(crate) fn best_split(
        &self,
        columns: &[Vec<f64>],
        labels: &[usize],
        rows: &[usize],
        parent_counts: &[usize],
        rng: &mut impl Rng,
    ) -> Option<Split> {
        let n = rows.len();
        if n < 2 {
            return None;
        }
        let parent_impurity = self.criterion.impurity(parent_counts);
        let n_features = columns.len();
        let mut order: Vec<usize> = (0..n_features).collect();
        let mut visited = 0usize;
        let mut best: Option<(usize, f64, f64)> = None;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n);

        for i in 0..n_features {
            if visited == self.max_features {
                break;
            }
            let j = rng.gen_range(i..n_features);
            order.swap(i, j);
            let feature = order[i];
            let column = &columns[feature];

            sorted.clear();
            sorted.extend(rows.iter().map(|&r| (column[r], labels[r])));
            sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
            if sorted[0].0 == sorted[n - 1].0 {
                continue;
            }
            visited += 1;

            let mut left = vec![0usize; parent_counts.len()];
            let mut right = parent_counts.to_vec();
            for pos in 0..n - 1 {
                let (value, class) = sorted[pos];
                left[class] += 1;
                right[class] -= 1;
                let next = sorted[pos + 1].0;
                if value == next {
                    continue;
                }
                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }
                let gain = n as f64 * parent_impurity
                    - n_left as f64 * self.criterion.impurity(&left)
                    - n_right as f64 * self.criterion.impurity(&right);
                if best.is_none_or(|(_, _, g)| gain > g) {
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some((feature, threshold, gain));
                }
            }
        }

        let (feature, threshold, weighted_gain) = best?;
        let (left, right): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .copied()
            .partition(|&r| columns[feature][r] <= threshold);
        Some(Split {
            feature,
            threshold,
            weighted_gain,
            left,
            right,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn search(max_features: usize, min_samples_leaf: usize) -> SplitSearch {
        SplitSearch {
            criterion: SplitCriterion::Gini,
            max_features,
            min_samples_leaf,
        }
    }

    #[test]
    fn gini_values() {
        assert_eq!(SplitCriterion::Gini.impurity(&[4, 0]), 0.0);
        assert!((SplitCriterion::Gini.impurity(&[5, 5]) - 0.5).abs() < 1e-12);
        assert_eq!(SplitCriterion::Gini.impurity(&[]), 0.0);
    }

    #[test]
    fn entropy_is_measured_in_bits() {
        assert!((SplitCriterion::Entropy.impurity(&[5, 5]) - 1.0).abs() < 1e-12);
        assert!((SplitCriterion::Entropy.impurity(&[2, 2, 2, 2]) - 2.0).abs() < 1e-12);
        assert_eq!(SplitCriterion::Entropy.impurity(&[7, 0]), 0.0);
    }

    #[test]
    fn separable_column_is_cut_in_the_gap() {
        let columns = vec![vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let rows: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let split = search(1, 1)
            .best_split(&columns, &labels, &rows, &[3, 3], &mut rng)
            .unwrap();
        assert_eq!(split.feature, 0);
        assert!((split.threshold - 6.5).abs() < 1e-12);
        assert_eq!(split.left, vec![0, 1, 2]);
        assert_eq!(split.right, vec![3, 4, 5]);
        assert!((split.weighted_gain - 3.0).abs() < 1e-12);
    }

    #[test]
    fn constant_features_do_not_use_up_the_budget() {
        // Only feature 2 varies; a budget of one feature must still find it.
        let columns = vec![
            vec![7.0, 7.0, 7.0, 7.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![1.0, 2.0, 8.0, 9.0],
        ];
        let labels = vec![0, 0, 1, 1];
        let rows: Vec<usize> = (0..4).collect();
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let split = search(1, 1)
                .best_split(&columns, &labels, &rows, &[2, 2], &mut rng)
                .unwrap();
            assert_eq!(split.feature, 2);
        }
    }

    #[test]
    fn all_constant_returns_none() {
        let columns = vec![vec![5.0; 4]];
        let labels = vec![0, 1, 0, 1];
        let rows: Vec<usize> = (0..4).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(
            search(1, 1)
                .best_split(&columns, &labels, &rows, &[2, 2], &mut rng)
                .is_none()
        );
    }

    #[test]
    fn min_samples_leaf_blocks_small_children() {
        let columns = vec![vec![1.0, 10.0]];
        let labels = vec![0, 1];
        let rows = vec![0, 1];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(
            search(1, 2)
                .best_split(&columns, &labels, &rows, &[1, 1], &mut rng)
                .is_none()
        );
    }

    #[test]
    fn only_listed_rows_are_partitioned() {
        let columns = vec![vec![0.0, 100.0, 1.0, 100.0, 9.0]];
        let labels = vec![0, 1, 0, 1, 1];
        let rows = vec![0, 2, 4];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let split = search(1, 1)
            .best_split(&columns, &labels, &rows, &[2, 1], &mut rng)
            .unwrap();
        assert_eq!(split.left, vec![0, 2]);
        assert_eq!(split.right, vec![4]);
    }
}
