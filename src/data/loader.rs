//! Loading datasets from tabular files

use super::Dataset;
use crate::error::{InterpretError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Read a CSV, JSON or Parquet file into a `DataFrame`, dispatching on extension
pub fn load_dataframe(path: &Path) -> Result<DataFrame> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let start = Instant::now();
    let df = match ext.as_str() {
        "csv" => CsvReadOptions::default()
            .with_infer_schema_length(Some(1000))
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?,
        "json" => JsonReader::new(File::open(path)?).finish()?,
        "parquet" => ParquetReader::new(File::open(path)?).finish()?,
        _ => {
            return Err(InterpretError::DataError(format!(
                "unsupported file format: '{}'",
                ext
            )))
        }
    };

    debug!(
        path = %path.display(),
        rows = df.height(),
        cols = df.width(),
        elapsed = ?start.elapsed(),
        "Loaded data file"
    );

    Ok(df)
}

/// Read a tabular file straight into a [`Dataset`]
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let df = load_dataframe(path)?;
    Dataset::from_dataframe(&df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "x,y").unwrap();
        writeln!(file, "1,10").unwrap();
        writeln!(file, "2,20").unwrap();
        file.flush().unwrap();

        let ds = load_dataset(file.path()).unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.column("y").unwrap().to_vec(), vec![10.0, 20.0]);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = load_dataframe(Path::new("data.xlsx"));
        assert!(matches!(result, Err(InterpretError::DataError(_))));
    }
}
