//! Writers for everything the sweven pipelines leave on disk.

mod error;
mod plot;
mod table;
mod writer;

pub use error::IoError;
pub use plot::RegressionPlot;
pub use table::write_table_csv;
pub use writer::{ResultWriter, RunConfig, TrainingMetrics};
