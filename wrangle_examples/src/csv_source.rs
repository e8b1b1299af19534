// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`DataSource`] that reads a CSV file with a header row.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use wrangle_core::{Column, ColumnData, DataSource, DataType, Dataset, Error, Result, Value};

/// Cells read as missing.
const MISSING_TOKENS: [&str; 2] = ["", "NA"];

/// Loads a dataset from a CSV file.
///
/// The header row names the columns. Each column takes the narrowest type every present cell
/// parses as, trying integer, then numeric, then boolean, and falling back to text.
#[derive(Debug, Clone)]
pub(crate) struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses CSV text from any reader.
    pub(crate) fn parse(input: impl Read) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(input);
        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            for (column, field) in cells.iter_mut().zip(record.iter()) {
                let field = field.trim();
                column.push((!MISSING_TOKENS.contains(&field)).then(|| field.to_owned()));
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, raw)| {
                let ty = infer(&raw);
                tracing::trace!(column = %name, ty = ?ty, "inferred csv column type");
                let values = raw.into_iter().map(|cell| parse(cell, ty)).collect();
                Ok(Column::new(name, ColumnData::from_values(ty, values)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Dataset::new(columns)
    }
}

impl DataSource for CsvSource {
    fn load(&self) -> Result<Dataset> {
        let file = File::open(&self.path).map_err(|err| {
            Error::SourceUnavailable(format!("{}: {err}", self.path.display()))
        })?;
        let data = Self::parse(file)?;
        tracing::debug!(
            path = %self.path.display(),
            rows = data.row_count(),
            columns = data.column_count(),
            "loaded csv"
        );
        Ok(data)
    }
}

fn csv_error(err: csv::Error) -> Error {
    match err.kind() {
        csv::ErrorKind::Io(_) => Error::SourceUnavailable(err.to_string()),
        _ => Error::SchemaMismatch(err.to_string()),
    }
}

fn infer(cells: &[Option<String>]) -> Option<DataType> {
    let present: Vec<&str> = cells.iter().flatten().map(String::as_str).collect();
    if present.is_empty() {
        None
    } else if present.iter().all(|c| c.parse::<i64>().is_ok()) {
        Some(DataType::Integer)
    } else if present.iter().all(|c| c.parse::<f64>().is_ok()) {
        Some(DataType::Numeric)
    } else if present.iter().all(|c| c.parse::<bool>().is_ok()) {
        Some(DataType::Boolean)
    } else {
        Some(DataType::Text)
    }
}

fn parse(cell: Option<String>, ty: Option<DataType>) -> Value {
    let Some(cell) = cell else {
        return Value::Missing;
    };
    match ty {
        Some(DataType::Integer) => cell.parse::<i64>().map_or(Value::Missing, Value::Integer),
        Some(DataType::Numeric) => cell.parse::<f64>().map_or(Value::Missing, Value::Numeric),
        Some(DataType::Boolean) => cell.parse::<bool>().map_or(Value::Missing, Value::Boolean),
        _ => Value::Text(cell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_column_types() {
        let text = "name,age,salary,remote\nAnn,34,50000.5,true\nBo,NA,60000,false\nCy,29,,true\n";
        let data = CsvSource::parse(text.as_bytes()).unwrap();
        assert_eq!(
            data.schema(),
            vec![
                ("name", DataType::Text),
                ("age", DataType::Integer),
                ("salary", DataType::Numeric),
                ("remote", DataType::Boolean),
            ]
        );
        assert_eq!(data.value(1, "age").unwrap(), Value::Missing);
        assert_eq!(data.value(1, "salary").unwrap(), Value::Numeric(60_000.0));
        assert_eq!(data.value(2, "salary").unwrap(), Value::Missing);
    }

    #[test]
    fn ragged_rows_are_schema_mismatches() {
        let err = CsvSource::parse("a,b\n1,2\n3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)), "{err:?}");
    }

    #[test]
    fn missing_files_are_unavailable() {
        let err = CsvSource::new("/definitely/not/here.csv").load().unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(_)), "{err:?}");
    }
}
