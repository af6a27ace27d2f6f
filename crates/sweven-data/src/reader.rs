//! CSV table reader.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::dataset::Table;
use crate::DataError;

/// Reads an all-numeric CSV file into a [`Table`].
///
/// Expected CSV format:
/// - Header row required; every column is numeric
/// - Empty cells and `NaN` are read as missing values
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`DataError::CsvParse`] | Malformed CSV record |
/// | [`DataError::DuplicateColumn`] | Header repeats a column name |
/// | [`DataError::RaggedRow`] | Row has different column count than header |
/// | [`DataError::InvalidValue`] | Cell is not a number |
/// | [`DataError::NoRows`] | Zero data rows after header |
pub struct TableReader {
    path: PathBuf,
}

impl TableReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Table, DataError> {
        let file = std::fs::File::open(&self.path).map_err(|e| DataError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so our RaggedRow check fires instead of a CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.parse_error(e))?;
        let columns: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
        debug!(n_columns = columns.len(), "read CSV header");

        let mut rows = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;
            if record.len() != columns.len() {
                return Err(DataError::RaggedRow {
                    row_index,
                    expected: columns.len(),
                    got: record.len(),
                });
            }
            let row = record
                .iter()
                .enumerate()
                .map(|(col_index, raw)| self.parse_cell(raw, row_index, col_index))
                .collect::<Result<Vec<f64>, DataError>>()?;
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(DataError::NoRows {
                path: self.path.clone(),
            });
        }

        info!(n_rows = rows.len(), n_columns = columns.len(), "table loaded");
        Table::new(columns, rows)
    }

    fn parse_cell(&self, raw: &str, row_index: usize, col_index: usize) -> Result<f64, DataError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(f64::NAN);
        }
        trimmed.parse().map_err(|_| DataError::InvalidValue {
            path: self.path.clone(),
            row_index,
            col_index,
            raw: raw.to_string(),
        })
    }

    fn parse_error(&self, e: csv::Error) -> DataError {
        DataError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_table() {
        let f = write_csv("feature1,feature2,target\n0.5,1.5,0\n-1.0,2.0,1\n");
        let table = TableReader::new(f.path()).read().unwrap();
        assert_eq!(table.columns(), &["feature1", "feature2", "target"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.rows()[1], vec![-1.0, 2.0, 1.0]);
    }

    #[test]
    fn empty_cell_is_missing() {
        let f = write_csv("a,b\n1.0,\n");
        let table = TableReader::new(f.path()).read().unwrap();
        assert!(table.rows()[0][1].is_nan());
    }

    #[test]
    fn no_rows_error() {
        let f = write_csv("a,b\n");
        let err = TableReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, DataError::NoRows { .. }));
    }

    #[test]
    fn ragged_row_error() {
        let f = write_csv("a,b\n1.0,2.0\n3.0\n");
        let err = TableReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, DataError::RaggedRow { row_index: 1, .. }));
    }

    #[test]
    fn invalid_value_error() {
        let f = write_csv("a,b\n1.0,abc\n");
        let err = TableReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidValue {
                row_index: 0,
                col_index: 1,
                ..
            }
        ));
    }

    #[test]
    fn missing_file_error() {
        let err = TableReader::new(Path::new("/tmp/does_not_exist_sweven.csv"))
            .read()
            .unwrap_err();
        assert!(matches!(err, DataError::FileNotFound { .. }));
    }
}
