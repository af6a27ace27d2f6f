//! CSV output for tables.

use std::fs;
use std::path::Path;

use sweven_data::Table;
use tracing::{info, instrument};

use crate::IoError;

/// Write `table` as CSV: one header row, then one line per row.
///
/// Missing (NaN) cells are written empty so the file reads back the same.
/// Parent directories are created as needed.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::OutputDirCreate`] | a parent directory cannot be created |
/// | [`IoError::CsvWrite`] | the file cannot be created or written |
#[instrument(skip(table), fields(path = %path.display(), n_rows = table.n_rows()))]
pub fn write_table_csv(path: &Path, table: &Table) -> Result<(), IoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| IoError::OutputDirCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let csv_err = |source| IoError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(table.columns()).map_err(csv_err)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|v| if v.is_nan() { String::new() } else { v.to_string() }))
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|e| csv_err(e.into()))?;

    info!("table written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_then_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out").join("t.csv");
        let table = Table::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.5, -2.0], vec![f64::NAN, 3.0]],
        )
        .unwrap();

        write_table_csv(&path, &table).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["a,b", "1.5,-2", ",3"]);
    }
}
