//! Per-column summary statistics.

use serde::Serialize;

use crate::dataset::Table;

/// Summary statistics for one column, ignoring missing values.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    /// Column name.
    pub name: String,
    /// Number of non-missing values.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n − 1 denominator); NaN below two values.
    pub std: f64,
    /// Minimum value.
    pub min: f64,
    /// First quartile.
    pub q25: f64,
    /// Median.
    pub median: f64,
    /// Third quartile.
    pub q75: f64,
    /// Maximum value.
    pub max: f64,
}

/// Quantile of already-sorted values with linear interpolation.
///
/// Uses position `q · (n − 1)` and interpolates between the two
/// neighbouring order statistics. Returns NaN for an empty slice.
#[must_use]
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

/// Summarise every column of a table.
#[must_use]
pub fn describe(table: &Table) -> Vec<ColumnSummary> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut values: Vec<f64> = table
                .rows()
                .iter()
                .map(|row| row[idx])
                .filter(|v| !v.is_nan())
                .collect();
            values.sort_by(f64::total_cmp);
            summarize(name, &values)
        })
        .collect()
}

fn summarize(name: &str, sorted: &[f64]) -> ColumnSummary {
    let count = sorted.len();
    let mean = if count == 0 {
        f64::NAN
    } else {
        sorted.iter().sum::<f64>() / count as f64
    };
    let std = if count < 2 {
        f64::NAN
    } else {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1) as f64).sqrt()
    };
    ColumnSummary {
        name: name.to_string(),
        count,
        mean,
        std,
        min: sorted.first().copied().unwrap_or(f64::NAN),
        q25: quantile(sorted, 0.25),
        median: quantile(sorted, 0.5),
        q75: quantile(sorted, 0.75),
        max: sorted.last().copied().unwrap_or(f64::NAN),
    }
}
