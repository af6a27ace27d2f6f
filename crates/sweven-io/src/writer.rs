//! JSON result bundle for a training run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;

/// Scores recorded in `metrics.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingMetrics {
    /// Accuracy of each cross-validation fold.
    pub cv_scores: Vec<f64>,
    /// Mean of `cv_scores`.
    pub mean_cv_score: f64,
    /// Standard deviation of `cv_scores`.
    pub std_cv_score: f64,
    /// Accuracy on the held-out test split.
    pub test_accuracy: f64,
}

/// Effective run settings recorded in `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    /// RFC 3339 time the run finished.
    pub timestamp: String,
    /// Data path given on the command line.
    pub data_path: String,
    /// Number of trees.
    pub n_estimators: usize,
    /// Depth limit; `null` when unlimited.
    pub max_depth: Option<usize>,
    /// Rows used for training.
    pub train_samples: usize,
    /// Rows held out for testing.
    pub test_samples: usize,
    /// Master seed.
    pub seed: u64,
}

/// Writes a training run's `metrics.json`, `config.json` and names its model file.
///
/// Creates the output directory on construction if it does not exist.
#[derive(Debug)]
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    /// Create a writer for `output_dir`, creating the directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display()))]
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|source| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Return the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the model blob belongs: `<output_dir>/model.bin`.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.output_dir.join("model.bin")
    }

    /// Write `metrics.json`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::SerializeJson`] | JSON rendering failed |
    /// | [`IoError::WriteFile`] | the file cannot be written |
    pub fn write_metrics(&self, metrics: &TrainingMetrics) -> Result<PathBuf, IoError> {
        self.write_json("metrics.json", metrics)
    }

    /// Write `config.json`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::SerializeJson`] | JSON rendering failed |
    /// | [`IoError::WriteFile`] | the file cannot be written |
    pub fn write_config(&self, config: &RunConfig) -> Result<PathBuf, IoError> {
        self.write_json("config.json", config)
    }

    #[instrument(skip(self, value))]
    fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf, IoError> {
        let path = self.output_dir.join(file_name);
        let json = serde_json::to_string_pretty(value).map_err(|source| IoError::SerializeJson {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| IoError::WriteFile {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "result written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_directory_created() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("models").join("example_model");
        let writer = ResultWriter::new(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(writer.model_path(), dir.join("model.bin"));
    }

    #[test]
    fn unlimited_depth_is_null() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ResultWriter::new(tmp.path()).unwrap();
        let path = writer
            .write_config(&RunConfig {
                timestamp: "2024-01-01T00:00:00+00:00".into(),
                data_path: "data.csv".into(),
                n_estimators: 10,
                max_depth: None,
                train_samples: 8,
                test_samples: 2,
                seed: 42,
            })
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert!(value["max_depth"].is_null());
        assert_eq!(value["seed"], 42);
    }
}
