// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The immutable [`Dataset`] value that flows through every verb.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::column::{Categorical, Column, ColumnData};
use crate::error::{Error, Result};
use crate::value::{DataType, Value};

/// A rectangular collection of named, typed columns plus its active grouping keys.
///
/// Invariants:
/// - every column has exactly [`Dataset::row_count`] cells,
/// - column names are unique,
/// - every grouping key names a column.
///
/// Columns are shared via `Arc`; cloning a dataset or passing a column through an operator
/// unchanged is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Arc<Column>>,
    index: HashMap<String, usize>,
    rows: usize,
    group_keys: Vec<String>,
}

impl Dataset {
    /// Creates an ungrouped dataset from owned columns.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        Self::from_shared(columns.into_iter().map(Arc::new).collect(), Vec::new())
    }

    /// Creates a dataset from shared columns and grouping keys, validating every invariant.
    ///
    /// Ragged or duplicate columns fail with [`Error::SchemaMismatch`]; a grouping key that
    /// names no column fails with [`Error::UnknownColumn`].
    pub fn from_shared(columns: Vec<Arc<Column>>, group_keys: Vec<String>) -> Result<Self> {
        let rows = columns.first().map_or(0, |c| c.len());
        let mut index = HashMap::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            if col.len() != rows {
                return Err(Error::SchemaMismatch(format!(
                    "column `{}` has {} rows, expected {rows}",
                    col.name,
                    col.len()
                )));
            }
            if index.insert(col.name.clone(), i).is_some() {
                return Err(Error::SchemaMismatch(format!(
                    "duplicate column `{}`",
                    col.name
                )));
            }
        }
        for key in &group_keys {
            if !index.contains_key(key) {
                return Err(Error::UnknownColumn(key.clone()));
            }
        }
        Ok(Self {
            columns,
            index,
            rows,
            group_keys,
        })
    }

    /// An empty dataset with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            index: HashMap::new(),
            rows: 0,
            group_keys: Vec::new(),
        }
    }

    /// Starts a [`DatasetBuilder`].
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in declared order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// `(name, type)` pairs in declared order.
    pub fn schema(&self) -> Vec<(&str, DataType)> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.data_type()))
            .collect()
    }

    /// The shared columns, in declared order.
    pub fn columns(&self) -> &[Arc<Column>] {
        &self.columns
    }

    /// Returns a column index for a name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.shared_column(name).map(|c| &**c)
    }

    /// Looks up a column by name, returning the shared handle.
    pub fn shared_column(&self, name: &str) -> Result<&Arc<Column>> {
        self.column_index(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| Error::UnknownColumn(name.into()))
    }

    /// Reads one cell.
    pub fn value(&self, row: usize, column: &str) -> Result<Value> {
        Ok(self.column(column)?.data.value(row))
    }

    /// Reads one row as values in column order.
    pub fn row(&self, row: usize) -> Vec<Value> {
        self.columns.iter().map(|c| c.data.value(row)).collect()
    }

    /// Extracts the present values of a numeric or integer column as `f64`.
    pub fn numeric(&self, column: &str) -> Result<Vec<f64>> {
        self.column(column)?.data.numeric()
    }

    /// Active grouping keys, outermost first. Empty when ungrouped.
    pub fn group_keys(&self) -> &[String] {
        &self.group_keys
    }

    /// Returns `true` if the dataset has active grouping keys.
    pub fn is_grouped(&self) -> bool {
        !self.group_keys.is_empty()
    }

    /// Returns a copy with the given grouping keys, sharing all columns.
    pub fn with_group_keys(&self, keys: Vec<String>) -> Result<Self> {
        for key in &keys {
            if !self.index.contains_key(key) {
                return Err(Error::UnknownColumn(key.clone()));
            }
        }
        Ok(Self {
            group_keys: keys,
            ..self.clone()
        })
    }

    /// Returns a copy with rows gathered by index (in the given order), keeping the grouping
    /// keys.
    ///
    /// Every index must be less than [`Dataset::row_count`].
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| Arc::new(Column::new(c.name.clone(), c.data.take(rows))))
            .collect();
        Self {
            columns,
            index: self.index.clone(),
            rows: rows.len(),
            group_keys: self.group_keys.clone(),
        }
    }

    /// Returns a copy where `column` replaces the column of the same name in place, or is
    /// appended when the name is new.
    pub fn with_column(&self, column: Column) -> Result<Self> {
        if !self.columns.is_empty() && column.len() != self.rows {
            return Err(Error::SchemaMismatch(format!(
                "column `{}` has {} rows, expected {}",
                column.name,
                column.len(),
                self.rows
            )));
        }
        let mut out = self.clone();
        if out.columns.is_empty() {
            out.rows = column.len();
        }
        let existing = out.index.get(&column.name).copied();
        match existing {
            Some(i) => out.columns[i] = Arc::new(column),
            None => {
                out.index.insert(column.name.clone(), out.columns.len());
                out.columns.push(Arc::new(column));
            }
        }
        Ok(out)
    }
}

/// Convenience builder for small in-memory datasets.
///
/// Each method appends one column; [`DatasetBuilder::build`] validates the result.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    columns: Vec<Column>,
    error: Option<Error>,
}

impl DatasetBuilder {
    /// Appends a prebuilt column.
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a numeric column. Accepts `f64` or `Option<f64>` items.
    pub fn numeric<I, T>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<f64>>,
    {
        let data = ColumnData::Numeric(values.into_iter().map(Into::into).collect());
        self.column(Column::new(name, data))
    }

    /// Appends an integer column. Accepts `i64` or `Option<i64>` items.
    pub fn integer<I, T>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<i64>>,
    {
        let data = ColumnData::Integer(values.into_iter().map(Into::into).collect());
        self.column(Column::new(name, data))
    }

    /// Appends a boolean column. Accepts `bool` or `Option<bool>` items.
    pub fn boolean<I, T>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<bool>>,
    {
        let data = ColumnData::Boolean(values.into_iter().map(Into::into).collect());
        self.column(Column::new(name, data))
    }

    /// Appends a text column. Accepts `&str` or `Option<&str>` items.
    pub fn text<'a, I, T>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<&'a str>>,
    {
        let data = ColumnData::Text(
            values
                .into_iter()
                .map(|v| v.into().map(String::from))
                .collect(),
        );
        self.column(Column::new(name, data))
    }

    /// Appends a categorical column with lexical levels.
    pub fn categorical<'a, I, T>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<&'a str>>,
    {
        let data = Categorical::from_labels(values.into_iter().map(Into::into));
        self.column(Column::new(name, ColumnData::Categorical(data)))
    }

    /// Appends an ordered categorical column with explicit levels.
    pub fn categorical_with_levels<'a, I, T>(mut self, name: &str, levels: &[&str], values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<&'a str>>,
    {
        let levels = levels.iter().map(|&l| String::from(l)).collect();
        match Categorical::with_levels(levels, values.into_iter().map(Into::into), true) {
            Ok(data) => self.column(Column::new(name, ColumnData::Categorical(data))),
            Err(err) => {
                self.error.get_or_insert(err);
                self
            }
        }
    }

    /// Validates and builds the dataset.
    pub fn build(self) -> Result<Dataset> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Dataset::new(self.columns)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn staff() -> Dataset {
        Dataset::builder()
            .text("name", ["ann", "bob", "cy"])
            .categorical("department", ["Sales", "Eng", "Sales"])
            .numeric("salary", [50_000.0, 60_000.0, 70_000.0])
            .build()
            .unwrap()
    }

    #[test]
    fn lookup_by_name() {
        let ds = staff();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column_index("salary"), Some(2));
        assert_eq!(ds.value(1, "department").unwrap(), Value::from("Eng"));
        assert_eq!(
            ds.column("age").unwrap_err(),
            Error::UnknownColumn("age".into())
        );
    }

    #[test]
    fn rejects_ragged_and_duplicate_columns() {
        let ragged = Dataset::builder()
            .numeric("a", [1.0, 2.0])
            .numeric("b", [1.0])
            .build();
        assert!(matches!(ragged, Err(Error::SchemaMismatch(_))));

        let dup = Dataset::builder()
            .numeric("a", [1.0])
            .integer("a", [1])
            .build();
        assert!(matches!(dup, Err(Error::SchemaMismatch(_))));
    }

    #[test]
    fn group_keys_must_name_columns() {
        let ds = staff();
        assert!(ds.with_group_keys(vec!["department".into()]).unwrap().is_grouped());
        assert_eq!(
            ds.with_group_keys(vec!["team".into()]).unwrap_err(),
            Error::UnknownColumn("team".into())
        );
    }

    #[test]
    fn with_column_replaces_in_place_and_shares_others() {
        let ds = staff();
        let out = ds
            .with_column(Column::new(
                "department",
                ColumnData::Text(vec![None, None, None]),
            ))
            .unwrap();
        assert_eq!(out.column_index("department"), Some(1));
        assert!(Arc::ptr_eq(&ds.columns()[0], &out.columns()[0]));
        // Input untouched.
        assert_eq!(ds.column("department").unwrap().data_type(), DataType::Categorical);

        let appended = ds
            .with_column(Column::new("bonus", ColumnData::Integer(vec![Some(1); 3])))
            .unwrap();
        assert_eq!(appended.column_names().last(), Some("bonus"));
    }

    #[test]
    fn take_rows_gathers_in_order() {
        let ds = staff().take_rows(&[2, 0]);
        assert_eq!(ds.numeric("salary").unwrap(), vec![70_000.0, 50_000.0]);
    }
}
