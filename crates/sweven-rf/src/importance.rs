//! Forest-level feature importance ranking.

use serde::Serialize;

/// A feature's share of the forest's total impurity decrease.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFeature {
    /// Feature name.
    pub name: String,
    /// Mean of the per-tree normalized importances; the list sums to 1
    /// unless every tree is a single leaf.
    pub importance: f64,
    /// 1 for the most important feature.
    pub rank: usize,
}

/// Average per-tree importance vectors and rank the features.
///
/// Ties keep column order.
pub(crate) fn rank_importances(per_tree: &[Vec<f64>], names: &[String]) -> Vec<RankedFeature> {
    let mut mean = vec![0.0; names.len()];
    for tree in per_tree {
        for (m, v) in mean.iter_mut().zip(tree) {
            *m += v;
        }
    }
    if !per_tree.is_empty() {
        let n = per_tree.len() as f64;
        for m in &mut mean {
            *m /= n;
        }
    }

    let mut ranked: Vec<RankedFeature> = names
        .iter()
        .zip(mean)
        .map(|(name, importance)| RankedFeature {
            name: name.clone(),
            importance,
            rank: 0,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    for (i, f) in ranked.iter_mut().enumerate() {
        f.rank = i + 1;
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_and_ranks() {
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let per_tree = vec![vec![0.2, 0.8, 0.0], vec![0.4, 0.6, 0.0]];
        let ranked = rank_importances(&per_tree, &names);
        assert_eq!(ranked[0].name, "b");
        assert!((ranked[0].importance - 0.7).abs() < 1e-12);
        assert_eq!(ranked[1].name, "a");
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn ties_keep_column_order() {
        let names = vec!["x".to_string(), "y".to_string()];
        let ranked = rank_importances(&[vec![0.0, 0.0]], &names);
        assert_eq!(ranked[0].name, "x");
        assert_eq!(ranked[1].name, "y");
    }
}
