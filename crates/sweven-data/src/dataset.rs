//! In-memory dataset containers.

use std::collections::HashSet;

use crate::DataError;

/// Feature rows paired with one target per row.
///
/// `T` is `f64` for regression targets and `usize` for class labels.
/// `features[i]` corresponds to `targets[i]`; every row has exactly
/// `feature_names.len()` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<T> {
    feature_names: Vec<String>,
    features: Vec<Vec<f64>>,
    targets: Vec<T>,
}

impl<T> Dataset<T> {
    /// Create a dataset, checking that the shapes line up.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::LengthMismatch`] | `features.len() != targets.len()` |
    /// | [`DataError::RaggedRow`] | a row's width differs from `feature_names.len()` |
    pub fn new(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        targets: Vec<T>,
    ) -> Result<Self, DataError> {
        if features.len() != targets.len() {
            return Err(DataError::LengthMismatch {
                n_rows: features.len(),
                n_targets: targets.len(),
            });
        }
        check_widths(&features, feature_names.len())?;
        Ok(Self {
            feature_names,
            features,
            targets,
        })
    }

    /// Return the feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the feature matrix (row-major).
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the targets in row order.
    #[must_use]
    pub fn targets(&self) -> &[T] {
        &self.targets
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Return `true` when the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Consume the dataset and return `(feature_names, features, targets)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<f64>>, Vec<T>) {
        (self.feature_names, self.features, self.targets)
    }
}

impl<T: Clone> Dataset<T> {
    /// Build a new dataset from the given row indices, in the given order.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i].clone()).collect(),
        }
    }
}

/// A table of named numeric columns, stored row-major.
///
/// Missing values are `NaN`. A target column, if any, is an ordinary
/// column; use [`Table::into_dataset`] to split it off.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl Table {
    /// Create a table from column names and rows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::DuplicateColumn`] | a column name appears twice |
    /// | [`DataError::RaggedRow`] | a row's width differs from `columns.len()` |
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, DataError> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(DataError::DuplicateColumn { name: name.clone() });
            }
        }
        check_widths(&rows, columns.len())?;
        Ok(Self { columns, rows })
    }

    /// Return the column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Return the rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Return the position of a column by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Return a copy of one column's values.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::MissingColumn`] if no column has that name.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, DataError> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Split the table into features and integer class labels.
    ///
    /// Every column except `target_column` becomes a feature, in table order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::MissingColumn`] | `target_column` does not exist |
    /// | [`DataError::InvalidLabel`] | a target is negative, fractional or not finite |
    pub fn into_dataset(self, target_column: &str) -> Result<Dataset<usize>, DataError> {
        let target_idx = self.require_column(target_column)?;

        let feature_names: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != target_idx)
            .map(|(_, name)| name.clone())
            .collect();

        let mut features = Vec::with_capacity(self.rows.len());
        let mut targets = Vec::with_capacity(self.rows.len());
        for (row_index, mut row) in self.rows.into_iter().enumerate() {
            let value = row.remove(target_idx);
            if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
                return Err(DataError::InvalidLabel { row_index, value });
            }
            targets.push(value as usize);
            features.push(row);
        }

        Dataset::new(feature_names, features, targets)
    }

    pub(crate) fn require_column(&self, name: &str) -> Result<usize, DataError> {
        self.column_index(name).ok_or_else(|| DataError::MissingColumn {
            name: name.to_string(),
        })
    }

    pub(crate) fn retain_rows(&mut self, keep: impl FnMut(&Vec<f64>) -> bool) {
        self.rows.retain(keep);
    }

    /// Append a column; `values` must have one entry per row.
    pub(crate) fn push_column(&mut self, name: String, values: Vec<f64>) -> Result<(), DataError> {
        if self.column_index(&name).is_some() {
            return Err(DataError::DuplicateColumn { name });
        }
        debug_assert_eq!(values.len(), self.rows.len());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        self.columns.push(name);
        Ok(())
    }
}

fn check_widths(rows: &[Vec<f64>], expected: usize) -> Result<(), DataError> {
    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != expected {
            return Err(DataError::RaggedRow {
                row_index,
                expected,
                got: row.len(),
            });
        }
    }
    Ok(())
}
