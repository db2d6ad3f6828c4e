//! CSV reading operations.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::*};

/// Reads a CSV file with a header row into a DataFrame where every column is a String.
///
/// Schema inference is disabled so identifiers such as `0123` keep their leading zeros and
/// never turn into integers.
pub(crate) fn read_csv_as_strings(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Column names of a DataFrame, in order.
pub(crate) fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|name| name.to_string()).collect()
}

/// Trim every value of a String column in place; empty values become null.
pub(crate) fn trim_string_column(df: &mut DataFrame, name: &str) -> Result<()> {
    let trimmed: StringChunked = df.column(name)
        .with_context(|| format!("[io::csv::read] missing column {name:?}"))?
        .str()
        .with_context(|| format!("[io::csv::read] column {name:?} is not a string column"))?
        .into_iter()
        .map(|opt| opt.map(str::trim).filter(|s| !s.is_empty()))
        .collect();

    df.replace_or_add(name.into(), trimmed.into_series())
        .map_err(|e| anyhow::anyhow!("[io::csv::read] Failed to normalize {}: {}", name, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_zeros_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assess.csv");
        std::fs::write(&path, "PIN,ASSESSED_VALUE\n0123,450000\n  0456 ,\n").unwrap();

        let mut df = read_csv_as_strings(&path).unwrap();
        assert_eq!(column_names(&df), vec!["PIN".to_string(), "ASSESSED_VALUE".to_string()]);

        trim_string_column(&mut df, "PIN").unwrap();
        let pins = df.column("PIN").unwrap().str().unwrap()
            .into_iter()
            .collect::<Vec<_>>();
        assert_eq!(pins, vec![Some("0123"), Some("0456")]);

        let values = df.column("ASSESSED_VALUE").unwrap().str().unwrap();
        assert_eq!(values.get(0), Some("450000"));
        assert_eq!(values.get(1), None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_csv_as_strings(&dir.path().join("nope.csv")).is_err());
    }
}
