//! Closed-form least squares fit.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::LinearError;

/// Pivots smaller than this fraction of the largest raw second moment are
/// treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Ordinary least squares estimator.
///
/// Construct via [`LinearRegression::new`], optionally disable the
/// intercept, then call [`fit`](Self::fit).
#[derive(Debug, Clone)]
pub struct LinearRegression {
    fit_intercept: bool,
}

/// Fitted linear model: `y = intercept + Σ coefficients[j] · x[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegression {
    /// Create an estimator that fits an intercept.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fit_intercept: true,
        }
    }

    /// Whether to fit an intercept. Without one the line passes through the origin.
    #[must_use]
    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Return whether an intercept is fitted.
    #[must_use]
    pub fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    /// Fit the model to row-major `features` and `targets`.
    ///
    /// Solves the normal equations `XᵀX·β = Xᵀy` on mean-centred data with
    /// Gaussian elimination and partial pivoting, then recovers the
    /// intercept from the means. With one feature this is
    /// `slope = Sxy / Sxx`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`LinearError::EmptyInput`] | no rows |
    /// | [`LinearError::NoFeatures`] | rows have zero width |
    /// | [`LinearError::LengthMismatch`] | `features.len() != targets.len()` |
    /// | [`LinearError::RaggedRow`] | rows of differing width |
    /// | [`LinearError::NonFiniteValue`] | NaN or infinity in the input |
    /// | [`LinearError::SingularMatrix`] | constant or collinear features |
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<LinearModel, LinearError> {
        let n_features = validate(features, targets)?;
        let n = features.len() as f64;

        let (x_mean, y_mean) = if self.fit_intercept {
            let mut x_mean = vec![0.0; n_features];
            for row in features {
                for (m, v) in x_mean.iter_mut().zip(row) {
                    *m += v;
                }
            }
            for m in &mut x_mean {
                *m /= n;
            }
            (x_mean, targets.iter().sum::<f64>() / n)
        } else {
            (vec![0.0; n_features], 0.0)
        };

        // Augmented system [XᵀX | Xᵀy] over centred columns.
        let mut system = vec![vec![0.0; n_features + 1]; n_features];
        let mut raw_sq = vec![0.0; n_features];
        for (row, &y) in features.iter().zip(targets) {
            let yc = y - y_mean;
            for i in 0..n_features {
                let xi = row[i] - x_mean[i];
                for j in i..n_features {
                    system[i][j] += xi * (row[j] - x_mean[j]);
                }
                system[i][n_features] += xi * yc;
            }
            for (r, v) in raw_sq.iter_mut().zip(row) {
                *r += v * v;
            }
        }
        for i in 0..n_features {
            for j in 0..i {
                system[i][j] = system[j][i];
            }
        }
        // A centred column whose spread is lost to cancellation is constant.
        if let Some(column) =
            (0..n_features).find(|&i| system[i][i] <= f64::EPSILON * raw_sq[i])
        {
            return Err(LinearError::SingularMatrix { column });
        }
        let tolerance = PIVOT_TOLERANCE
            * (0..n_features).map(|i| system[i][i]).fold(0.0, f64::max);

        let coefficients = solve(system, tolerance)?;
        let intercept = if self.fit_intercept {
            y_mean
                - coefficients
                    .iter()
                    .zip(&x_mean)
                    .map(|(b, m)| b * m)
                    .sum::<f64>()
        } else {
            0.0
        };

        debug!(?coefficients, intercept, "linear model fitted");
        Ok(LinearModel {
            coefficients,
            intercept,
        })
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearModel {
    /// Create a model from known parameters.
    #[must_use]
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    /// Return the per-feature coefficients.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Return the intercept.
    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Return the number of features the model expects.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Predict a single row.
    ///
    /// # Errors
    ///
    /// Returns [`LinearError::FeatureMismatch`] if `row` has the wrong width.
    pub fn predict_one(&self, row: &[f64]) -> Result<f64, LinearError> {
        if row.len() != self.coefficients.len() {
            return Err(LinearError::FeatureMismatch {
                expected: self.coefficients.len(),
                got: row.len(),
            });
        }
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(b, x)| b * x)
                .sum::<f64>())
    }

    /// Predict every row.
    ///
    /// # Errors
    ///
    /// Returns [`LinearError::FeatureMismatch`] on the first row of the wrong width.
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, LinearError> {
        features.iter().map(|row| self.predict_one(row)).collect()
    }
}

fn validate(features: &[Vec<f64>], targets: &[f64]) -> Result<usize, LinearError> {
    if features.len() != targets.len() {
        return Err(LinearError::LengthMismatch {
            left: features.len(),
            right: targets.len(),
        });
    }
    let Some(first) = features.first() else {
        return Err(LinearError::EmptyInput);
    };
    let n_features = first.len();
    if n_features == 0 {
        return Err(LinearError::NoFeatures);
    }
    for (row_index, (row, y)) in features.iter().zip(targets).enumerate() {
        if row.len() != n_features {
            return Err(LinearError::RaggedRow {
                row_index,
                expected: n_features,
                got: row.len(),
            });
        }
        if !y.is_finite() || row.iter().any(|v| !v.is_finite()) {
            return Err(LinearError::NonFiniteValue { row_index });
        }
    }
    Ok(n_features)
}

/// Gaussian elimination with partial pivoting on an `n × (n + 1)` augmented matrix.
fn solve(mut a: Vec<Vec<f64>>, tolerance: f64) -> Result<Vec<f64>, LinearError> {
    let n = a.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&r, &s| a[r][col].abs().total_cmp(&a[s][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() <= tolerance {
            return Err(LinearError::SingularMatrix { column: col });
        }
        a.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..=n {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|j| a[i][j] * x[j]).sum();
        x[i] = (a[i][n] - tail) / a[i][i];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(xs: &[f64]) -> Vec<Vec<f64>> {
        xs.iter().map(|&x| vec![x]).collect()
    }

    #[test]
    fn exact_line_recovered() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 2.0).collect();
        let model = LinearRegression::new().fit(&column(&x), &y).unwrap();
        assert!((model.coefficients()[0] - 3.0).abs() < 1e-12);
        assert!((model.intercept() + 2.0).abs() < 1e-12);
    }

    #[test]
    fn least_squares_on_noisy_points() {
        // x = [0, 1, 2], y = [1, 3, 2]: Sxy = 1, Sxx = 2 -> slope 0.5, intercept 1.5
        let model = LinearRegression::new()
            .fit(&column(&[0.0, 1.0, 2.0]), &[1.0, 3.0, 2.0])
            .unwrap();
        assert!((model.coefficients()[0] - 0.5).abs() < 1e-12);
        assert!((model.intercept() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn without_intercept_passes_through_origin() {
        let model = LinearRegression::new()
            .with_fit_intercept(false)
            .fit(&column(&[1.0, 2.0]), &[2.0, 4.0])
            .unwrap();
        assert_eq!(model.intercept(), 0.0);
        assert!((model.coefficients()[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn constant_feature_is_singular() {
        let err = LinearRegression::new()
            .fit(&column(&[0.1, 0.1, 0.1, 0.1]), &[1.0, 2.0, 3.0, 4.0])
            .unwrap_err();
        assert!(matches!(err, LinearError::SingularMatrix { column: 0 }));
    }

    #[test]
    fn large_offset_feature_is_fitted() {
        // Timestamp-like values: huge mean, modest spread.
        let x: Vec<f64> = (0..100).map(|i| 1.7e9 + 10.0 * i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * (v - 1.7e9) + 1.0).collect();
        let model = LinearRegression::new().fit(&column(&x), &y).unwrap();
        assert!((model.coefficients()[0] - 3.0).abs() < 1e-9);
        let predicted = model.predict_one(&[1.7e9 + 505.0]).unwrap();
        assert!((predicted - 1516.0).abs() < 1e-3);
    }

    #[test]
    fn offset_constant_feature_is_singular() {
        let err = LinearRegression::new()
            .fit(&column(&[1.7e9 + 0.3; 5]), &[1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap_err();
        assert!(matches!(err, LinearError::SingularMatrix { column: 0 }));
    }

    #[test]
    fn collinear_features_are_singular() {
        let features: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64, 2.0 * i as f64]).collect();
        let targets: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let err = LinearRegression::new().fit(&features, &targets).unwrap_err();
        assert!(matches!(err, LinearError::SingularMatrix { .. }));
    }

    #[test]
    fn invalid_inputs_rejected() {
        let fit = |f: &[Vec<f64>], t: &[f64]| LinearRegression::new().fit(f, t);
        assert!(matches!(fit(&[], &[]), Err(LinearError::EmptyInput)));
        assert!(matches!(fit(&[vec![]], &[1.0]), Err(LinearError::NoFeatures)));
        assert!(matches!(
            fit(&column(&[1.0, 2.0]), &[1.0]),
            Err(LinearError::LengthMismatch { .. })
        ));
        assert!(matches!(
            fit(&[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0]),
            Err(LinearError::RaggedRow { row_index: 1, .. })
        ));
        assert!(matches!(
            fit(&column(&[1.0, f64::NAN]), &[1.0, 2.0]),
            Err(LinearError::NonFiniteValue { row_index: 1 })
        ));
    }

    #[test]
    fn predict_checks_width() {
        let model = LinearModel::new(vec![2.0, 1.0], 0.5);
        assert_eq!(model.predict_one(&[1.0, 3.0]).unwrap(), 5.5);
        assert!(matches!(
            model.predict(&[vec![1.0]]),
            Err(LinearError::FeatureMismatch {
                expected: 2,
                got: 1
            })
        ));
    }
}
