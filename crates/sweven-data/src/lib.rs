//! Synthetic datasets and the preparation stages that run before a fit.
//!
//! Provides seeded data generators, a shuffled train/test splitter, a
//! duplicate/missing/IQR-outlier cleaner, additive feature engineering,
//! per-column summary statistics, and a CSV table reader. Every random
//! draw takes its seed explicitly; there is no process-wide RNG state.

mod clean;
mod dataset;
mod describe;
mod error;
mod features;
mod generate;
mod reader;
mod split;

pub use clean::{Cleaned, Cleaner, CleaningReport, ColumnDrop};
pub use dataset::{Dataset, Table};
pub use describe::{ColumnSummary, describe, quantile};
pub use error::DataError;
pub use features::{FeatureEngineer, SUM_COLUMN, engineer_features};
pub use generate::{TRUE_INTERCEPT, TRUE_SLOPE, make_classification, make_regression, make_tabular};
pub use reader::TableReader;
pub use split::{Split, train_test_split};
