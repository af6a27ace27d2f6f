//! Ordinary least squares regression.
//!
//! [`LinearRegression`] fits an intercept plus one coefficient per feature
//! in closed form. [`mean_squared_error`] and [`r2_score`] evaluate its
//! predictions.

mod error;
mod metrics;
mod ols;

pub use error::LinearError;
pub use metrics::{mean_squared_error, r2_score};
pub use ols::{LinearModel, LinearRegression};
