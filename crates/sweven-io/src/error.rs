//! I/O error types for sweven-io.

use std::path::PathBuf;

/// Errors from writing result files, CSV tables and plots.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when an output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result cannot be rendered as JSON.
    #[error("cannot serialize {path} as JSON")]
    SerializeJson {
        /// Destination file.
        path: PathBuf,
        /// Underlying serde_json error.
        source: serde_json::Error,
    },

    /// Returned when the CSV writer fails.
    #[error("cannot write CSV file {path}")]
    CsvWrite {
        /// Destination file.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the plot cannot be encoded or saved as PNG.
    #[error("cannot encode PNG {path}")]
    EncodePng {
        /// Destination file.
        path: PathBuf,
        /// Underlying image error.
        source: image::ImageError,
    },

    /// Returned when the bundled label font cannot be parsed.
    #[error("cannot load plot font")]
    InvalidFont {
        /// Underlying font error.
        source: ab_glyph::InvalidFont,
    },

    /// Returned when there are no points to plot.
    #[error("nothing to plot: no points given")]
    EmptyPlot,

    /// Returned when x and y series of a plot differ in length.
    #[error("plot series length mismatch: {n_x} x values, {n_y} y values")]
    PlotLengthMismatch {
        /// Number of x values.
        n_x: usize,
        /// Number of y values.
        n_y: usize,
    },

    /// Returned when the plot size leaves no room for the drawing area.
    #[error("invalid plot size {width}x{height}: both sides must be at least {min}")]
    InvalidPlotSize {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Smallest accepted side.
        min: u32,
    },
}
