//! Row cleaning: duplicates, missing values, then per-column IQR outliers.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::dataset::Table;
use crate::describe::quantile;
use crate::DataError;

/// Removes duplicate rows, rows with missing values, and IQR outliers.
///
/// Construct via [`Cleaner::new`], then chain `with_iqr_factor` if desired.
///
/// Outlier filtering walks the columns in table order and each pass sees
/// only the rows that survived the previous passes, so quartiles of later
/// columns depend on what earlier columns removed.
#[derive(Debug, Clone)]
pub struct Cleaner {
    iqr_factor: f64,
}

/// Rows removed by one column's IQR pass.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDrop {
    /// Column the bounds were computed on.
    pub column: String,
    /// Lower bound `Q1 − factor·IQR`.
    pub lower: f64,
    /// Upper bound `Q3 + factor·IQR`.
    pub upper: f64,
    /// Rows dropped by this pass.
    pub removed: usize,
}

/// What each cleaning stage removed.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningReport {
    /// Rows before cleaning.
    pub n_input: usize,
    /// Exact duplicates removed (first occurrence kept).
    pub duplicates_removed: usize,
    /// Rows removed for containing a missing value.
    pub missing_removed: usize,
    /// Per-column outlier passes, in the order they ran.
    pub outliers: Vec<ColumnDrop>,
    /// Rows after cleaning.
    pub n_output: usize,
}

impl CleaningReport {
    /// Total rows removed across all stages.
    #[must_use]
    pub fn total_removed(&self) -> usize {
        self.n_input - self.n_output
    }
}

/// A cleaned table together with its report.
#[derive(Debug, Clone)]
pub struct Cleaned {
    /// Surviving rows, in original relative order.
    pub table: Table,
    /// Per-stage removal counts.
    pub report: CleaningReport,
}

impl Cleaner {
    /// Create a cleaner with the conventional 1.5 IQR multiplier.
    #[must_use]
    pub fn new() -> Self {
        Self { iqr_factor: 1.5 }
    }

    /// Set the IQR multiplier used for the outlier bounds.
    #[must_use]
    pub fn with_iqr_factor(mut self, iqr_factor: f64) -> Self {
        self.iqr_factor = iqr_factor;
        self
    }

    /// Return the IQR multiplier.
    #[must_use]
    pub fn iqr_factor(&self) -> f64 {
        self.iqr_factor
    }

    /// Clean a table.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidIqrFactor`] if the multiplier is negative
    /// or not finite.
    #[instrument(skip_all, fields(n_rows = table.n_rows(), iqr_factor = self.iqr_factor))]
    pub fn clean(&self, table: &Table) -> Result<Cleaned, DataError> {
        if !self.iqr_factor.is_finite() || self.iqr_factor < 0.0 {
            return Err(DataError::InvalidIqrFactor {
                factor: self.iqr_factor,
            });
        }

        let mut out = table.clone();
        let n_input = out.n_rows();

        let mut seen: HashSet<Vec<u64>> = HashSet::with_capacity(n_input);
        out.retain_rows(|row| seen.insert(row_key(row)));
        let duplicates_removed = n_input - out.n_rows();

        let before = out.n_rows();
        out.retain_rows(|row| !row.iter().any(|v| v.is_nan()));
        let missing_removed = before - out.n_rows();

        let mut outliers = Vec::with_capacity(out.n_columns());
        for (col, name) in table.columns().iter().enumerate() {
            let mut values: Vec<f64> = out.rows().iter().map(|row| row[col]).collect();
            values.sort_by(f64::total_cmp);
            let q1 = quantile(&values, 0.25);
            let q3 = quantile(&values, 0.75);
            let iqr = q3 - q1;
            let lower = q1 - self.iqr_factor * iqr;
            let upper = q3 + self.iqr_factor * iqr;

            let before = out.n_rows();
            if before > 0 {
                out.retain_rows(|row| row[col] >= lower && row[col] <= upper);
            }
            let removed = before - out.n_rows();
            debug!(column = %name, lower, upper, removed, "outlier pass");
            outliers.push(ColumnDrop {
                column: name.clone(),
                lower,
                upper,
                removed,
            });
        }

        let report = CleaningReport {
            n_input,
            duplicates_removed,
            missing_removed,
            outliers,
            n_output: out.n_rows(),
        };
        info!(
            n_input,
            n_output = report.n_output,
            duplicates_removed,
            missing_removed,
            "table cleaned"
        );

        Ok(Cleaned { table: out, report })
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash key for duplicate detection: NaN equals NaN and `-0.0` equals `0.0`.
fn row_key(row: &[f64]) -> Vec<u64> {
    row.iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN.to_bits()
            } else if v == 0.0 {
                0
            } else {
                v.to_bits()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(cols: &[&str], rows: Vec<Vec<f64>>) -> Table {
        Table::new(cols.iter().map(|s| s.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn nan_row_removed_others_kept() {
        let rows = vec![
            vec![1.0, 10.0],
            vec![2.0, f64::NAN],
            vec![3.0, 12.0],
            vec![4.0, 13.0],
            vec![5.0, 14.0],
        ];
        let cleaned = Cleaner::new().clean(&table(&["a", "b"], rows)).unwrap();
        assert_eq!(
            cleaned.table.rows(),
            &[
                vec![1.0, 10.0],
                vec![3.0, 12.0],
                vec![4.0, 13.0],
                vec![5.0, 14.0]
            ]
        );
        assert_eq!(cleaned.report.missing_removed, 1);
        assert_eq!(cleaned.report.total_removed(), 1);
    }

    #[test]
    fn duplicates_removed_keeping_first() {
        let rows = vec![
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![f64::NAN, 3.0],
            vec![f64::NAN, 3.0],
            vec![-0.0, 4.0],
            vec![0.0, 4.0],
        ];
        let cleaned = Cleaner::new().clean(&table(&["a", "b"], rows)).unwrap();
        assert_eq!(cleaned.report.duplicates_removed, 3);
        assert_eq!(cleaned.report.missing_removed, 1);
    }

    #[test]
    fn iqr_outlier_removed() {
        // Q1 = 2.25, Q3 = 4.75, IQR = 2.5 -> bounds [-1.5, 8.5]; 100 is out.
        let rows = vec![
            vec![1.0],
            vec![2.0],
            vec![3.0],
            vec![4.0],
            vec![5.0],
            vec![100.0],
        ];
        let cleaned = Cleaner::new().clean(&table(&["a"], rows)).unwrap();
        assert_eq!(cleaned.table.n_rows(), 5);
        assert!(cleaned.table.rows().iter().all(|r| r[0] < 100.0));
        assert_eq!(cleaned.report.outliers[0].removed, 1);
    }

    #[test]
    fn bounds_are_inclusive() {
        // Q1 = 1, Q3 = 3, IQR = 2 -> upper bound exactly 6.
        let rows = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0], vec![6.0]];
        let cleaned = Cleaner::new().clean(&table(&["a"], rows)).unwrap();
        assert_eq!(cleaned.table.n_rows(), 5);
    }

    #[test]
    fn passes_are_sequential() {
        // Column a drops row 5 first; the remaining b values then have a
        // tighter spread, which makes b = 4.0 an outlier. Filtering both
        // columns against the original rows would keep it.
        let rows = vec![
            vec![1.0, 1.0],
            vec![1.0, 1.1],
            vec![1.0, 1.2],
            vec![1.0, 1.3],
            vec![1.0, 4.0],
            vec![50.0, 9.0],
        ];
        let cleaned = Cleaner::new().clean(&table(&["a", "b"], rows.clone())).unwrap();
        assert_eq!(cleaned.report.outliers[0].removed, 1);
        assert_eq!(cleaned.report.outliers[1].removed, 1);
        assert_eq!(cleaned.table.n_rows(), 4);

        // Simultaneous filtering on the original b quartiles keeps the 4.0 row.
        let mut b: Vec<f64> = rows.iter().map(|r| r[1]).collect();
        b.sort_by(f64::total_cmp);
        let (q1, q3) = (quantile(&b, 0.25), quantile(&b, 0.75));
        let upper = q3 + 1.5 * (q3 - q1);
        assert!(4.0 <= upper);
    }

    #[test]
    fn never_grows_and_no_duplicates() {
        let table = crate::make_tabular(500, 42).unwrap();
        let cleaned = Cleaner::new().clean(&table).unwrap();
        assert!(cleaned.table.n_rows() <= table.n_rows());
        let keys: HashSet<Vec<u64>> = cleaned.table.rows().iter().map(|r| row_key(r)).collect();
        assert_eq!(keys.len(), cleaned.table.n_rows());
    }

    #[test]
    fn rejects_negative_factor() {
        let err = Cleaner::new()
            .with_iqr_factor(-1.0)
            .clean(&table(&["a"], vec![vec![1.0]]))
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidIqrFactor { .. }));
    }
}
