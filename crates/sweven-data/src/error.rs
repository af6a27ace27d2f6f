use std::path::PathBuf;

/// Errors from dataset generation, splitting, cleaning and loading.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Returned when a generator is asked for zero samples.
    #[error("n_samples must be at least 1, got {n_samples}")]
    InvalidSampleCount {
        /// The invalid sample count.
        n_samples: usize,
    },

    /// Returned when a generator is asked for zero feature columns.
    #[error("n_features must be at least 1, got {n_features}")]
    InvalidFeatureCount {
        /// The invalid feature count.
        n_features: usize,
    },

    /// Returned when a classification generator is asked for fewer than two classes.
    #[error("n_classes must be at least 2, got {n_classes}")]
    InvalidClassCount {
        /// The invalid class count.
        n_classes: usize,
    },

    /// Returned when the noise scale is negative or not finite.
    #[error("noise must be finite and non-negative, got {noise}")]
    InvalidNoise {
        /// The invalid noise scale.
        noise: f64,
    },

    /// Returned when the test fraction is outside the open interval (0, 1).
    #[error("test fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidTestFraction {
        /// The invalid fraction.
        fraction: f64,
    },

    /// Returned when the IQR multiplier is negative or not finite.
    #[error("IQR factor must be finite and non-negative, got {factor}")]
    InvalidIqrFactor {
        /// The invalid multiplier.
        factor: f64,
    },

    /// Returned when an operation needs at least one row.
    #[error("dataset has zero rows")]
    EmptyDataset,

    /// Returned when a split would leave the train or test side empty.
    #[error("splitting {n_samples} rows with {n_test} test rows leaves one side empty")]
    DegenerateSplit {
        /// Number of rows in the dataset.
        n_samples: usize,
        /// Number of rows the test side would receive.
        n_test: usize,
    },

    /// Returned when feature rows and targets have different lengths.
    #[error("{n_rows} feature rows but {n_targets} targets")]
    LengthMismatch {
        /// Number of feature rows.
        n_rows: usize,
        /// Number of targets.
        n_targets: usize,
    },

    /// Returned when a row has a different width than the column header.
    #[error("row {row_index} has {got} values, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row_index: usize,
        /// Expected number of values.
        expected: usize,
        /// Actual number of values.
        got: usize,
    },

    /// Returned when a named column does not exist.
    #[error("column \"{name}\" not found")]
    MissingColumn {
        /// The requested column name.
        name: String,
    },

    /// Returned when a column name would appear twice.
    #[error("column \"{name}\" already exists")]
    DuplicateColumn {
        /// The duplicated column name.
        name: String,
    },

    /// Returned when a target value cannot be used as a class index.
    #[error("row {row_index} has label {value}, expected a non-negative integer")]
    InvalidLabel {
        /// Zero-based index of the offending row.
        row_index: usize,
        /// The raw label value.
        value: f64,
    },

    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a cell cannot be parsed as a number.
    #[error("invalid value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    InvalidValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Zero-based column index.
        col_index: usize,
        /// The raw cell text.
        raw: String,
    },

    /// Returned when a CSV file has a header but no data rows.
    #[error("no data rows in {path}")]
    NoRows {
        /// Path to the CSV file.
        path: PathBuf,
    },
}
