//! Stratified k-fold cross-validation.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::RandomForestConfig;
use crate::error::RfError;
use crate::metrics::{ConfusionMatrix, accuracy_score};

/// Stratified k-fold cross-validation settings.
///
/// Construct via [`CrossValidation::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: u64,
}

/// Per-fold and aggregate accuracy from a cross-validation run.
#[derive(Debug, Clone, Serialize)]
pub struct CrossValidationResult {
    /// Held-out accuracy of each fold, in fold order.
    pub fold_scores: Vec<f64>,
    /// Mean of `fold_scores`.
    pub mean_score: f64,
    /// Population standard deviation of `fold_scores`.
    pub std_score: f64,
    /// Held-out predictions of every fold tallied together.
    pub confusion: ConfusionMatrix,
    /// Rows evaluated (each exactly once).
    pub n_samples: usize,
}

impl CrossValidation {
    /// Create a `n_folds`-fold cross-validation with seed 42.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, RfError> {
        if n_folds < 2 {
            return Err(RfError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds, seed: 42 })
    }

    /// Set the seed used to shuffle rows before fold assignment.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the fold count.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Return the shuffle seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fit one forest per fold and score it on the held-out fold.
    ///
    /// Fold `k` trains with the config's seed plus `k`, so every fold model
    /// is distinct but the whole run is reproducible.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | no rows |
    /// | [`RfError::LengthMismatch`] | `features.len() != labels.len()` |
    /// | [`RfError::TooFewSamplesForFolds`] | a class has fewer rows than folds |
    /// | other variants | from [`RandomForestConfig::fit`] |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = features.len()))]
    pub fn evaluate(
        &self,
        config: &RandomForestConfig,
        features: &[Vec<f64>],
        labels: &[usize],
        feature_names: &[String],
    ) -> Result<CrossValidationResult, RfError> {
        if features.len() != labels.len() {
            return Err(RfError::LengthMismatch {
                n_rows: features.len(),
                n_labels: labels.len(),
            });
        }
        if features.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        let n_classes = labels.iter().max().map_or(1, |&m| m + 1);
        let folds = self.assign_folds(labels, n_classes)?;

        let mut fold_scores = Vec::with_capacity(self.n_folds);
        let mut confusion = ConfusionMatrix::new(n_classes);

        for fold in 0..self.n_folds {
            let mut train_x = Vec::new();
            let mut train_y = Vec::new();
            let mut test_x = Vec::new();
            let mut test_y = Vec::new();
            for ((row, &label), &assigned) in features.iter().zip(labels).zip(&folds) {
                if assigned == fold {
                    test_x.push(row.clone());
                    test_y.push(label);
                } else {
                    train_x.push(row.clone());
                    train_y.push(label);
                }
            }

            let fold_config = config.clone().with_seed(config.seed().wrapping_add(fold as u64));
            let forest = fold_config.fit(&train_x, &train_y, feature_names)?.into_forest();
            let predicted = forest.predict_batch(&test_x)?;

            let score = accuracy_score(&test_y, &predicted)?;
            confusion.merge(&ConfusionMatrix::from_labels(&test_y, &predicted, n_classes)?);
            info!(fold, accuracy = score, n_test = test_y.len(), "fold scored");
            fold_scores.push(score);
        }

        let k = fold_scores.len() as f64;
        let mean_score = fold_scores.iter().sum::<f64>() / k;
        let std_score = (fold_scores
            .iter()
            .map(|s| (s - mean_score).powi(2))
            .sum::<f64>()
            / k)
            .sqrt();
        info!(mean_score, std_score, "cross-validation complete");

        Ok(CrossValidationResult {
            fold_scores,
            mean_score,
            std_score,
            confusion,
            n_samples: features.len(),
        })
    }

    /// Assign each row a fold in `0..n_folds`.
    ///
    /// Rows of each class are shuffled, then dealt round-robin, so every
    /// fold holds `floor` or `ceil` of `count / n_folds` rows of each class.
    fn assign_folds(&self, labels: &[usize], n_classes: usize) -> Result<Vec<usize>, RfError> {
        let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
        for (i, &label) in labels.iter().enumerate() {
            by_class[label].push(i);
        }
        for (class, rows) in by_class.iter().enumerate() {
            if !rows.is_empty() && rows.len() < self.n_folds {
                return Err(RfError::TooFewSamplesForFolds {
                    class,
                    count: rows.len(),
                    n_folds: self.n_folds,
                });
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut folds = vec![0; labels.len()];
        for rows in &mut by_class {
            rows.shuffle(&mut rng);
            for (j, &row) in rows.iter().enumerate() {
                folds[row] = j % self.n_folds;
            }
        }
        Ok(folds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaxFeatures;

    fn two_bands() -> (Vec<Vec<f64>>, Vec<usize>, Vec<String>) {
        let features: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let offset = if i < 20 { 0.0 } else { 5.0 };
                vec![offset + (i % 20) as f64 * 0.1, (i % 3) as f64]
            })
            .collect();
        let labels = (0..40).map(|i| usize::from(i >= 20)).collect();
        (features, labels, vec!["band".into(), "noise".into()])
    }

    #[test]
    fn separable_data_scores_perfectly() {
        let (x, y, names) = two_bands();
        let cfg = RandomForestConfig::new(15)
            .unwrap()
            .with_max_features(MaxFeatures::All);
        let result = CrossValidation::new(5).unwrap().evaluate(&cfg, &x, &y, &names).unwrap();
        assert_eq!(result.fold_scores.len(), 5);
        assert_eq!(result.mean_score, 1.0);
        assert_eq!(result.std_score, 0.0);
        assert_eq!(result.confusion.total(), 40);
    }

    #[test]
    fn folds_are_stratified() {
        let labels: Vec<usize> = (0..30).map(|i| usize::from(i % 3 == 0)).collect();
        let folds = CrossValidation::new(5).unwrap().assign_folds(&labels, 2).unwrap();
        for fold in 0..5 {
            let ones = folds
                .iter()
                .zip(&labels)
                .filter(|&(&f, &l)| f == fold && l == 1)
                .count();
            let total = folds.iter().filter(|&&f| f == fold).count();
            assert_eq!(ones, 2);
            assert_eq!(total, 6);
        }
    }

    #[test]
    fn deterministic_scores() {
        let (x, y, names) = two_bands();
        let cfg = RandomForestConfig::new(5).unwrap();
        let cv = CrossValidation::new(4).unwrap().with_seed(9);
        let a = cv.evaluate(&cfg, &x, &y, &names).unwrap();
        let b = cv.evaluate(&cfg, &x, &y, &names).unwrap();
        assert_eq!(a.fold_scores, b.fold_scores);
    }

    #[test]
    fn rejects_bad_fold_counts() {
        assert!(matches!(
            CrossValidation::new(1),
            Err(RfError::InvalidFoldCount { n_folds: 1 })
        ));
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let y = vec![0, 0, 0, 1];
        let err = CrossValidation::new(3)
            .unwrap()
            .evaluate(&RandomForestConfig::new(2).unwrap(), &x, &y, &["x".into()])
            .unwrap_err();
        assert!(matches!(
            err,
            RfError::TooFewSamplesForFolds {
                class: 1,
                count: 1,
                n_folds: 3
            }
        ));
    }
}
