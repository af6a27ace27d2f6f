//! Soft-vote prediction.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::RandomForest;
use crate::metrics::accuracy_score;

/// Index of the largest value; the lowest index wins ties.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

impl RandomForest {
    /// Average the leaf class distributions of every tree for one sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample` has the wrong width.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut mean = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (m, w) in mean.iter_mut().zip(tree.class_weights(sample)) {
                *m += w;
            }
        }
        let n = self.trees.len() as f64;
        mean.iter_mut().for_each(|m| *m /= n);
        Ok(mean)
    }

    /// Predict the class with the highest mean probability.
    ///
    /// Ties go to the lowest class index.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample` has the wrong width.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        Ok(argmax(&self.predict_proba(sample)?))
    }

    /// Predict every row in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any row has the wrong width.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        features
            .into_par_iter()
            .map(|row| self.predict(row))
            .collect()
    }

    /// Class probabilities for every row in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any row has the wrong width.
    pub fn predict_proba_batch(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, RfError> {
        features
            .into_par_iter()
            .map(|row| self.predict_proba(row))
            .collect()
    }

    /// Fraction of rows whose prediction equals the label.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::PredictionFeatureMismatch`] | a row has the wrong width |
    /// | [`RfError::LengthMismatch`] | `features.len() != labels.len()` |
    /// | [`RfError::EmptyDataset`] | no rows |
    pub fn score(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<f64, RfError> {
        let predicted = self.predict_batch(features)?;
        accuracy_score(labels, &predicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RandomForestConfig;

    #[test]
    fn argmax_prefers_lowest_on_tie() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[0.1, 0.9]), 1);
    }

    fn small_forest() -> RandomForest {
        let features: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let labels: Vec<usize> = (0..20).map(|i| usize::from(i >= 10)).collect();
        RandomForestConfig::new(15)
            .unwrap()
            .fit(&features, &labels, &["x".to_string()])
            .unwrap()
            .into_forest()
    }

    #[test]
    fn probabilities_sum_to_one() {
        let forest = small_forest();
        for x in [-5.0, 3.0, 9.5, 30.0] {
            let p = forest.predict_proba(&[x]).unwrap();
            assert_eq!(p.len(), 2);
            assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn batch_matches_single() {
        let forest = small_forest();
        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64 + 0.3]).collect();
        let batch = forest.predict_proba_batch(&rows).unwrap();
        for (row, p) in rows.iter().zip(&batch) {
            assert_eq!(&forest.predict_proba(row).unwrap(), p);
        }
    }

    #[test]
    fn clear_cases_and_score() {
        let forest = small_forest();
        assert_eq!(forest.predict(&[0.0]).unwrap(), 0);
        assert_eq!(forest.predict(&[19.0]).unwrap(), 1);
        let score = forest
            .score(&[vec![0.0], vec![1.0], vec![18.0], vec![19.0]], &[0, 0, 1, 1])
            .unwrap();
        assert_eq!(score, 1.0);
    }

    #[test]
    fn wrong_width_rejected() {
        let err = small_forest().predict(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            RfError::PredictionFeatureMismatch {
                expected: 1,
                got: 2
            }
        ));
    }
}
