//! Parallel forest training.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::RfError;
use crate::importance::rank_importances;
use crate::result::{ForestFit, TrainingInfo};
use crate::split::SplitContext;
use crate::tree::{DecisionTree, GrowthLimits};

/// A fitted ensemble of classification trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) feature_names: Vec<String>,
}

impl RandomForest {
    /// Return the trees in the order they were seeded.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the feature width the forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the training feature names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Mean of the per-tree normalized impurity-decrease importances, in column order.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut mean = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (m, v) in mean.iter_mut().zip(tree.feature_importances()) {
                *m += v;
            }
        }
        let n = self.trees.len().max(1) as f64;
        mean.iter_mut().for_each(|m| *m /= n);
        mean
    }
}

/// Check shapes and values; return `(n_features, n_classes)`.
fn check_training_data(
    features: &[Vec<f64>],
    labels: &[usize],
    feature_names: &[String],
) -> Result<(usize, usize), RfError> {
    if features.len() != labels.len() {
        return Err(RfError::LengthMismatch {
            n_rows: features.len(),
            n_labels: labels.len(),
        });
    }
    let Some(first) = features.first() else {
        return Err(RfError::EmptyDataset);
    };
    let n_features = first.len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    if feature_names.len() != n_features {
        return Err(RfError::FeatureNameMismatch {
            n_names: feature_names.len(),
            n_features,
        });
    }
    for (row_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::RaggedRow {
                row_index,
                expected: n_features,
                got: row.len(),
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue {
                row_index,
                feature_index,
            });
        }
    }
    let n_classes = labels.iter().max().map_or(1, |&m| m + 1);
    Ok((n_features, n_classes))
}

/// Draw `n` row indices with replacement.
fn bootstrap(n: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
    feature_names: &[String],
) -> Result<ForestFit, RfError> {
    let (n_features, n_classes) = check_training_data(features, labels, feature_names)?;
    let max_features = config.validate(n_features)?;
    let n_samples = features.len();

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        n_classes,
        max_features,
        "training random forest"
    );

    let columns: Vec<Vec<f64>> = (0..n_features)
        .map(|f| features.iter().map(|row| row[f]).collect())
        .collect();
    let ctx = SplitContext {
        columns: &columns,
        labels,
        n_classes,
        impurity: config.impurity,
        max_features,
        min_samples_leaf: config.min_samples_leaf,
    };
    let limits = GrowthLimits {
        max_depth: config.max_depth,
        min_samples_split: config.min_samples_split,
    };

    // Seeds are drawn up front so the result does not depend on thread scheduling.
    let mut master = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master.r#gen()).collect();

    let trees: Vec<DecisionTree> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let rows = bootstrap(n_samples, &mut rng);
            DecisionTree::grow(&ctx, limits, rows, &mut rng)
        })
        .collect();

    let per_tree: Vec<Vec<f64>> = trees.iter().map(DecisionTree::feature_importances).collect();
    let importances = rank_importances(&per_tree, feature_names);
    debug!(
        mean_depth = trees.iter().map(DecisionTree::depth).sum::<usize>() as f64 / trees.len() as f64,
        "trees grown"
    );

    let forest = RandomForest {
        trees,
        n_features,
        n_classes,
        feature_names: feature_names.to_vec(),
    };
    let info = TrainingInfo {
        n_trees: config.n_trees,
        n_samples,
        n_features,
        n_classes,
        max_features,
    };
    info!(top_feature = importances.first().map(|f| f.name.as_str()), "random forest trained");

    Ok(ForestFit::new(forest, importances, info))
}
