//! Additive feature engineering.

use tracing::{debug, instrument};

use crate::dataset::Table;
use crate::DataError;

/// Name of the three-way sum column.
pub const SUM_COLUMN: &str = "feature_sum";

/// Appends an interaction, a sum and a square column to a table.
///
/// The default configuration reads `feature1`, `feature2`, `feature3` and
/// produces `feature1_x_feature2`, `feature_sum` and `feature1_squared`.
/// Existing columns are never modified or reordered.
#[derive(Debug, Clone)]
pub struct FeatureEngineer {
    product: (String, String),
    sum: [String; 3],
    square: String,
}

impl FeatureEngineer {
    /// Create an engineer over `feature1`, `feature2`, `feature3`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            product: ("feature1".into(), "feature2".into()),
            sum: ["feature1".into(), "feature2".into(), "feature3".into()],
            square: "feature1".into(),
        }
    }

    /// Set the two columns multiplied together.
    #[must_use]
    pub fn with_product(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.product = (left.into(), right.into());
        self
    }

    /// Set the three columns summed.
    #[must_use]
    pub fn with_sum(mut self, columns: [String; 3]) -> Self {
        self.sum = columns;
        self
    }

    /// Set the column squared.
    #[must_use]
    pub fn with_square(mut self, column: impl Into<String>) -> Self {
        self.square = column.into();
        self
    }

    /// Names of the columns [`apply`](Self::apply) appends, in order.
    #[must_use]
    pub fn derived_names(&self) -> [String; 3] {
        [
            format!("{}_x_{}", self.product.0, self.product.1),
            SUM_COLUMN.to_string(),
            format!("{}_squared", self.square),
        ]
    }

    /// Return a copy of `table` with the three derived columns appended.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::MissingColumn`] | a source column does not exist |
    /// | [`DataError::DuplicateColumn`] | a derived column name is already taken |
    #[instrument(skip_all, fields(n_rows = table.n_rows(), n_columns = table.n_columns()))]
    pub fn apply(&self, table: &Table) -> Result<Table, DataError> {
        let a = table.require_column(&self.product.0)?;
        let b = table.require_column(&self.product.1)?;
        let s = [
            table.require_column(&self.sum[0])?,
            table.require_column(&self.sum[1])?,
            table.require_column(&self.sum[2])?,
        ];
        let sq = table.require_column(&self.square)?;

        let product: Vec<f64> = table.rows().iter().map(|r| r[a] * r[b]).collect();
        let sum: Vec<f64> = table
            .rows()
            .iter()
            .map(|r| r[s[0]] + r[s[1]] + r[s[2]])
            .collect();
        let square: Vec<f64> = table.rows().iter().map(|r| r[sq].powi(2)).collect();

        let [product_name, sum_name, square_name] = self.derived_names();
        let mut out = table.clone();
        out.push_column(product_name, product)?;
        out.push_column(sum_name, sum)?;
        out.push_column(square_name, square)?;

        debug!(n_columns = out.n_columns(), "features engineered");
        Ok(out)
    }
}

/// Apply the default [`FeatureEngineer`] to a table.
///
/// # Errors
///
/// See [`FeatureEngineer::apply`].
pub fn engineer_features(table: &Table) -> Result<Table, DataError> {
    FeatureEngineer::new().apply(table)
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self::new()
    }
}
