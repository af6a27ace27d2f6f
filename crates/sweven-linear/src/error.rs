/// Errors from fitting, predicting and scoring linear models.
#[derive(Debug, thiserror::Error)]
pub enum LinearError {
    /// Returned when fitting or scoring is given zero samples.
    #[error("input has zero samples")]
    EmptyInput,

    /// Returned when the sample has no feature columns.
    #[error("input has zero feature columns")]
    NoFeatures,

    /// Returned when two paired inputs have different lengths.
    #[error("length mismatch: {left} values vs {right} values")]
    LengthMismatch {
        /// Length of the first input (features or `y_true`).
        left: usize,
        /// Length of the second input (targets or `y_pred`).
        right: usize,
    },

    /// Returned when a feature row has a different width than the first row.
    #[error("row {row_index} has {got} features, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row_index: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of this row.
        got: usize,
    },

    /// Returned when an input contains NaN or infinity.
    #[error("non-finite value at row {row_index}")]
    NonFiniteValue {
        /// Zero-based row index of the offending value.
        row_index: usize,
    },

    /// Returned when the centred normal equations have no unique solution,
    /// e.g. a constant feature or two collinear features.
    #[error("design matrix is singular (pivot column {column})")]
    SingularMatrix {
        /// Feature column at which elimination found no usable pivot.
        column: usize,
    },

    /// Returned when prediction input width differs from the fitted width.
    #[error("model fitted on {expected} features, got {got}")]
    FeatureMismatch {
        /// Number of features the model was fitted on.
        expected: usize,
        /// Number of features in the prediction row.
        got: usize,
    },
}
