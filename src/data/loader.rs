//! CSV Data Loader Module
//! Handles dataset loading and column inspection using Polars.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read dataset at {path}: {source}")]
    DataAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Parse(#[from] PolarsError),
}

/// Loads the OWID dataset with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file into memory, inferring the schema from the header row.
    pub fn load_csv(path: &str) -> Result<DataFrame, LoadError> {
        // Distinguish an unreadable file from a malformed one up front.
        std::fs::metadata(path).map_err(|source| LoadError::DataAccess {
            path: Path::new(path).to_path_buf(),
            source,
        })?;

        // Use lazy evaluation for memory efficiency, then collect
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_is_a_data_access_error() {
        let err = DataLoader::load_csv("no-such-dataset.csv").unwrap_err();
        assert!(matches!(err, LoadError::DataAccess { .. }));
    }

    #[test]
    fn loads_rows_and_columns_from_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "location,date,new_cases").unwrap();
        writeln!(file, "Kenya,2021-01-01,5").unwrap();
        writeln!(file, "India,2021-01-01,7").unwrap();
        file.flush().unwrap();

        let df = DataLoader::load_csv(file.path().to_str().unwrap()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        assert!(crate::data::has_column(&df, "new_cases"));
    }
}
