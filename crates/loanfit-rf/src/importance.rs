//! Ranking of feature importances by name.

/// A ranked feature with name, importance score, and rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFeature {
    /// Feature name.
    pub name: String,
    /// Normalized importance score (sums to 1.0 across all features).
    pub importance: f64,
    /// 1-based rank (1 = most important).
    pub rank: usize,
}

/// Pair `importances` with `names`, sort descending, and assign 1-based ranks.
///
/// Equal scores keep their column order. Extra entries on either side are ignored.
#[must_use]
pub fn rank_features(importances: &[f64], names: &[String]) -> Vec<RankedFeature> {
    let mut features: Vec<RankedFeature> = names
        .iter()
        .zip(importances)
        .map(|(name, &importance)| RankedFeature {
            name: name.clone(),
            importance,
            rank: 0,
        })
        .collect();

    features.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    for (i, feature) in features.iter_mut().enumerate() {
        feature.rank = i + 1;
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn sorted_descending_with_ranks() {
        let ranked = rank_features(&[0.1, 0.6, 0.3], &names(&["fico", "int.rate", "dti"]));
        let order: Vec<&str> = ranked.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(order, vec!["int.rate", "dti", "fico"]);
        assert_eq!(ranked.iter().map(|f| f.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn ties_keep_column_order() {
        let ranked = rank_features(&[0.5, 0.0, 0.5], &names(&["a", "b", "c"]));
        assert_eq!(ranked[0].name, "a");
        assert_eq!(ranked[1].name, "c");
        assert_eq!(ranked[2].name, "b");
    }

    #[test]
    fn empty_input() {
        assert!(rank_features(&[], &[]).is_empty());
    }
}
