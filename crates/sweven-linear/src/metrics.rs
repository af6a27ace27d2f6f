//! Regression metrics.

use crate::LinearError;

/// Mean of squared residuals.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`LinearError::EmptyInput`] | both slices are empty |
/// | [`LinearError::LengthMismatch`] | slices have different lengths |
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64, LinearError> {
    check_pair(y_true, y_pred)?;
    let ss: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    Ok(ss / y_true.len() as f64)
}

/// Coefficient of determination, `1 − SS_res / SS_tot`.
///
/// Constant targets have `SS_tot = 0`; the score is then 1.0 when every
/// prediction is exact and 0.0 otherwise.
///
/// # Errors
///
/// Same conditions as [`mean_squared_error`].
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64, LinearError> {
    check_pair(y_true, y_pred)?;
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

fn check_pair(y_true: &[f64], y_pred: &[f64]) -> Result<(), LinearError> {
    if y_true.len() != y_pred.len() {
        return Err(LinearError::LengthMismatch {
            left: y_true.len(),
            right: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(LinearError::EmptyInput);
    }
    Ok(())
}
