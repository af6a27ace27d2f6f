//! Seeded synthetic data generators.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use tracing::{debug, instrument};

use crate::dataset::{Dataset, Table};
use crate::DataError;

/// Slope of the linear relation used by [`make_regression`].
pub const TRUE_SLOPE: f64 = 2.5;

/// Intercept of the linear relation used by [`make_regression`].
pub const TRUE_INTERCEPT: f64 = 1.5;

/// Upper bound (exclusive) of the uniform regression feature.
const X_RANGE: f64 = 10.0;

/// Column names produced by [`make_tabular`].
const TABULAR_FEATURES: [&str; 3] = ["feature1", "feature2", "feature3"];

/// Generate a one-feature linear regression dataset.
///
/// `x ~ U[0, 10)` and `y = 2.5·x + 1.5 + noise·ε` with `ε ~ N(0, 1)`.
/// All `x` values are drawn before any noise, so the feature column for a
/// given seed does not depend on `noise`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::InvalidSampleCount`] | `n_samples` is zero |
/// | [`DataError::InvalidNoise`] | `noise` is negative or not finite |
#[instrument]
pub fn make_regression(n_samples: usize, noise: f64, seed: u64) -> Result<Dataset<f64>, DataError> {
    if n_samples == 0 {
        return Err(DataError::InvalidSampleCount { n_samples });
    }
    if !noise.is_finite() || noise < 0.0 {
        return Err(DataError::InvalidNoise { noise });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let xs: Vec<f64> = (0..n_samples).map(|_| rng.gen_range(0.0..X_RANGE)).collect();
    let targets: Vec<f64> = xs
        .iter()
        .map(|&x| {
            let eps: f64 = rng.sample(StandardNormal);
            TRUE_SLOPE * x + TRUE_INTERCEPT + eps * noise
        })
        .collect();

    debug!(n_samples, "regression data generated");
    Dataset::new(
        vec!["x".to_string()],
        xs.into_iter().map(|x| vec![x]).collect(),
        targets,
    )
}

/// Generate standard-normal features with uniformly drawn class labels.
///
/// Features are named `feature1..featureN`. The feature matrix is drawn
/// row by row before any label, so labels carry no signal.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::InvalidSampleCount`] | `n_samples` is zero |
/// | [`DataError::InvalidFeatureCount`] | `n_features` is zero |
/// | [`DataError::InvalidClassCount`] | `n_classes` is below 2 |
#[instrument]
pub fn make_classification(
    n_samples: usize,
    n_features: usize,
    n_classes: usize,
    seed: u64,
) -> Result<Dataset<usize>, DataError> {
    if n_samples == 0 {
        return Err(DataError::InvalidSampleCount { n_samples });
    }
    if n_features == 0 {
        return Err(DataError::InvalidFeatureCount { n_features });
    }
    if n_classes < 2 {
        return Err(DataError::InvalidClassCount { n_classes });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let features: Vec<Vec<f64>> = (0..n_samples)
        .map(|_| (0..n_features).map(|_| rng.sample(StandardNormal)).collect())
        .collect();
    let labels: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_classes)).collect();
    let names: Vec<String> = (1..=n_features).map(|f| format!("feature{f}")).collect();

    debug!(n_samples, n_features, n_classes, "classification data generated");
    Dataset::new(names, features, labels)
}

/// Generate the raw table used by the processing pipeline.
///
/// Columns `feature1`, `feature2`, `feature3` are standard normal and
/// `target` is 0 or 1 with equal probability. Values are drawn column by
/// column.
///
/// # Errors
///
/// Returns [`DataError::InvalidSampleCount`] when `n_samples` is zero.
#[instrument]
pub fn make_tabular(n_samples: usize, seed: u64) -> Result<Table, DataError> {
    if n_samples == 0 {
        return Err(DataError::InvalidSampleCount { n_samples });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut columns: Vec<Vec<f64>> = TABULAR_FEATURES
        .iter()
        .map(|_| (0..n_samples).map(|_| rng.sample(StandardNormal)).collect())
        .collect();
    columns.push((0..n_samples).map(|_| rng.gen_range(0..2u8) as f64).collect());

    let rows: Vec<Vec<f64>> = (0..n_samples)
        .map(|i| columns.iter().map(|col| col[i]).collect())
        .collect();
    let mut names: Vec<String> = TABULAR_FEATURES.iter().map(|s| s.to_string()).collect();
    names.push("target".to_string());

    debug!(n_samples, "tabular data generated");
    Table::new(names, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_is_deterministic() {
        let a = make_regression(50, 0.1, 42).unwrap();
        let b = make_regression(50, 0.1, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn regression_seed_changes_output() {
        let a = make_regression(50, 0.1, 42).unwrap();
        let b = make_regression(50, 0.1, 43).unwrap();
        assert_ne!(a.features(), b.features());
    }

    #[test]
    fn regression_without_noise_is_exactly_linear() {
        let ds = make_regression(20, 0.0, 7).unwrap();
        for (row, &y) in ds.features().iter().zip(ds.targets()) {
            let x = row[0];
            assert!((0.0..10.0).contains(&x));
            assert!((y - (TRUE_SLOPE * x + TRUE_INTERCEPT)).abs() < 1e-12);
        }
    }

    #[test]
    fn regression_rejects_bad_inputs() {
        assert!(matches!(
            make_regression(0, 1.0, 42),
            Err(DataError::InvalidSampleCount { .. })
        ));
        assert!(matches!(
            make_regression(10, -1.0, 42),
            Err(DataError::InvalidNoise { .. })
        ));
        assert!(matches!(
            make_regression(10, f64::NAN, 42),
            Err(DataError::InvalidNoise { .. })
        ));
    }

    #[test]
    fn classification_shape_and_labels() {
        let ds = make_classification(1000, 5, 2, 42).unwrap();
        assert_eq!(ds.n_samples(), 1000);
        assert_eq!(ds.n_features(), 5);
        assert_eq!(ds.feature_names()[0], "feature1");
        assert_eq!(ds.feature_names()[4], "feature5");
        assert!(ds.targets().iter().all(|&l| l < 2));
        // Both classes present with a uniform draw of this size.
        assert!(ds.targets().contains(&0));
        assert!(ds.targets().contains(&1));
    }

    #[test]
    fn classification_rejects_single_class() {
        assert!(matches!(
            make_classification(10, 2, 1, 42),
            Err(DataError::InvalidClassCount { n_classes: 1 })
        ));
    }

    #[test]
    fn tabular_columns_and_determinism() {
        let a = make_tabular(100, 42).unwrap();
        let b = make_tabular(100, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.columns(), &["feature1", "feature2", "feature3", "target"]);
        assert_eq!(a.n_rows(), 100);
        let target = a.column("target").unwrap();
        assert!(target.iter().all(|&t| t == 0.0 || t == 1.0));
    }
}
