use std::path::PathBuf;

/// Errors from forest configuration, training, evaluation and persistence.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    /// Returned when the forest is configured with zero trees.
    #[error("n_estimators must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The rejected tree count.
        n_trees: usize,
    },

    /// Returned when a depth limit of zero is requested.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The rejected depth limit.
        max_depth: usize,
    },

    /// Returned when `min_samples_split` is below 2.
    #[error("min_samples_split must be at least 2, got {min_samples_split}")]
    InvalidMinSamplesSplit {
        /// The rejected value.
        min_samples_split: usize,
    },

    /// Returned when `min_samples_leaf` is zero.
    #[error("min_samples_leaf must be at least 1, got {min_samples_leaf}")]
    InvalidMinSamplesLeaf {
        /// The rejected value.
        min_samples_leaf: usize,
    },

    /// Returned when the per-split feature count resolves outside `[1, n_features]`.
    #[error("max_features resolved to {max_features}, must be in [1, {n_features}]")]
    InvalidMaxFeatures {
        /// The resolved feature count.
        max_features: usize,
        /// Number of feature columns in the data.
        n_features: usize,
    },

    /// Returned when cross-validation is asked for fewer than two folds.
    #[error("cross-validation needs at least 2 folds, got {n_folds}")]
    InvalidFoldCount {
        /// The rejected fold count.
        n_folds: usize,
    },

    /// Returned when training or scoring receives zero samples.
    #[error("dataset has zero samples")]
    EmptyDataset,

    /// Returned when samples have zero feature columns.
    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when features and labels have different lengths.
    #[error("{n_rows} feature rows but {n_labels} labels")]
    LengthMismatch {
        /// Number of feature rows.
        n_rows: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when a training row is wider or narrower than the first row.
    #[error("row {row_index} has {got} features, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row_index: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        got: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at row {row_index}, feature {feature_index}")]
    NonFiniteValue {
        /// Zero-based row index.
        row_index: usize,
        /// Zero-based feature column.
        feature_index: usize,
    },

    /// Returned when the number of feature names differs from the row width.
    #[error("{n_names} feature names for {n_features} feature columns")]
    FeatureNameMismatch {
        /// Number of names supplied.
        n_names: usize,
        /// Number of feature columns.
        n_features: usize,
    },

    /// Returned when a prediction input has the wrong width.
    #[error("forest expects {expected} features, got {got}")]
    PredictionFeatureMismatch {
        /// Width the forest was trained on.
        expected: usize,
        /// Width of the prediction input.
        got: usize,
    },

    /// Returned when a label is outside `0..n_classes` while building a confusion matrix.
    #[error("label {label} is outside 0..{n_classes}")]
    LabelOutOfRange {
        /// The offending label.
        label: usize,
        /// Number of classes the matrix was sized for.
        n_classes: usize,
    },

    /// Returned when a class has fewer samples than there are folds.
    #[error("class {class} has {count} samples, stratified CV with {n_folds} folds needs at least {n_folds}")]
    TooFewSamplesForFolds {
        /// The under-represented class.
        class: usize,
        /// Samples of that class.
        count: usize,
        /// Requested fold count.
        n_folds: usize,
    },

    /// Returned when bincode fails to encode the model.
    #[error("failed to serialize model")]
    SerializeModel {
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when bincode fails to decode a model file.
    #[error("failed to deserialize model from {path}")]
    DeserializeModel {
        /// The model file.
        path: PathBuf,
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when the model file or its directory cannot be written.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// The destination path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the model file cannot be read.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// The source path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a model file carries a different format version.
    #[error("model {path} has format version {found}, this build reads version {expected}")]
    IncompatibleModelVersion {
        /// Version this build writes and reads.
        expected: u32,
        /// Version stored in the file.
        found: u32,
        /// The model file.
        path: PathBuf,
    },
}
