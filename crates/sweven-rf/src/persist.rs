//! Versioned bincode model files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::RfError;
use crate::forest::RandomForest;

/// Bumped whenever the serialized layout of [`RandomForest`] changes.
const FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct ModelFile {
    format_version: u32,
    forest: RandomForest,
}

/// Write-side twin of [`ModelFile`]; same field order, so same bytes.
#[derive(Serialize)]
struct ModelFileRef<'a> {
    format_version: u32,
    forest: &'a RandomForest,
}

impl RandomForest {
    /// Write the forest to `path`, creating missing parent directories.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::SerializeModel`] | bincode encoding failed |
    /// | [`RfError::WriteModel`] | the directory or file could not be written |
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RfError> {
        let path = path.as_ref();
        let write_err = |source| RfError::WriteModel {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let file = ModelFileRef {
            format_version: FORMAT_VERSION,
            forest: self,
        };
        let bytes = bincode::serialize(&file).map_err(|source| RfError::SerializeModel { source })?;
        std::fs::write(path, &bytes).map_err(write_err)?;

        info!(size_bytes = bytes.len(), n_trees = self.n_trees(), "model saved");
        Ok(())
    }

    /// Read a forest written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::ReadModel`] | the file could not be read |
    /// | [`RfError::DeserializeModel`] | the bytes are not a model file |
    /// | [`RfError::IncompatibleModelVersion`] | the file has another format version |
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RfError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| RfError::ReadModel {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ModelFile =
            bincode::deserialize(&bytes).map_err(|source| RfError::DeserializeModel {
                path: path.to_path_buf(),
                source,
            })?;
        if file.format_version != FORMAT_VERSION {
            return Err(RfError::IncompatibleModelVersion {
                expected: FORMAT_VERSION,
                found: file.format_version,
                path: path.to_path_buf(),
            });
        }

        debug!(
            n_trees = file.forest.n_trees(),
            n_features = file.forest.n_features(),
            "model loaded"
        );
        Ok(file.forest)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::config::RandomForestConfig;

    fn tiny_forest() -> RandomForest {
        let features: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64, (i % 2) as f64]).collect();
        let labels: Vec<usize> = (0..12).map(|i| usize::from(i >= 6)).collect();
        RandomForestConfig::new(4)
            .unwrap()
            .fit(&features, &labels, &["a".into(), "b".into()])
            .unwrap()
            .into_forest()
    }

    #[test]
    fn round_trip_into_new_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("model.bin");
        let forest = tiny_forest();

        forest.save(&path).unwrap();
        let loaded = RandomForest::load(&path).unwrap();

        assert_eq!(loaded, forest);
        assert_eq!(loaded.predict(&[2.0, 0.0]).unwrap(), forest.predict(&[2.0, 0.0]).unwrap());
        assert_eq!(loaded.feature_names(), &["a", "b"]);
    }

    #[test]
    fn saved_bytes_decode_as_owned_envelope() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.bin");
        let forest = tiny_forest();

        forest.save(&path).unwrap();
        let file: ModelFile = bincode::deserialize(&std::fs::read(&path).unwrap()).unwrap();

        assert_eq!(file.format_version, FORMAT_VERSION);
        assert_eq!(file.forest, forest);
    }

    #[test]
    fn version_mismatch_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.bin");
        let forest = tiny_forest();
        let file = ModelFileRef {
            format_version: FORMAT_VERSION + 1,
            forest: &forest,
        };
        std::fs::write(&path, bincode::serialize(&file).unwrap()).unwrap();

        let err = RandomForest::load(&path).unwrap_err();
        assert!(matches!(
            err,
            RfError::IncompatibleModelVersion { expected: 1, found: 2, .. }
        ));
    }

    #[test]
    fn garbage_and_missing_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.bin");
        std::fs::write(&path, b"definitely not a forest").unwrap();
        assert!(matches!(
            RandomForest::load(&path),
            Err(RfError::DeserializeModel { .. })
        ));
        assert!(matches!(
            RandomForest::load(dir.path().join("absent.bin")),
            Err(RfError::ReadModel { .. })
        ));
    }
}
