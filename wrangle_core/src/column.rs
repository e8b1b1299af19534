// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed columnar storage.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

use hashbrown::HashMap;

use crate::error::{Error, Result};
use crate::value::{DataType, Value};

/// A categorical column: a fixed level list plus one level code per row.
///
/// Levels define the sort order of the column. Levels built from raw labels are lexical;
/// binned columns carry levels ordered by interval lower bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorical {
    levels: Vec<String>,
    codes: Vec<Option<u32>>,
    ordered: bool,
}

impl Categorical {
    /// Builds an unordered categorical from labels, with lexically sorted levels.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let labels: Vec<Option<String>> = labels.into_iter().map(|l| l.map(Into::into)).collect();
        let mut levels: Vec<String> = labels.iter().flatten().cloned().collect();
        levels.sort();
        levels.dedup();
        let codes = {
            let lookup = level_lookup(&levels);
            labels
                .iter()
                .map(|l| l.as_ref().map(|l| lookup[l.as_str()]))
                .collect()
        };
        Self {
            levels,
            codes,
            ordered: false,
        }
    }

    /// Builds a categorical with an explicit level order.
    ///
    /// Fails with [`Error::SchemaMismatch`] if a level is repeated or a label is not a level.
    pub fn with_levels<I, S>(levels: Vec<String>, labels: I, ordered: bool) -> Result<Self>
    where
        I: IntoIterator<Item = Option<S>>,
        S: AsRef<str>,
    {
        let codes = {
            let lookup = level_lookup(&levels);
            if lookup.len() != levels.len() {
                return Err(Error::SchemaMismatch("duplicate categorical level".into()));
            }
            let mut codes = Vec::new();
            for label in labels {
                codes.push(match label {
                    Some(l) => Some(*lookup.get(l.as_ref()).ok_or_else(|| {
                        Error::SchemaMismatch(format!("`{}` is not a declared level", l.as_ref()))
                    })?),
                    None => None,
                });
            }
            codes
        };
        Ok(Self {
            levels,
            codes,
            ordered,
        })
    }

    /// Builds a categorical directly from level codes.
    pub fn from_codes(levels: Vec<String>, codes: Vec<Option<u32>>, ordered: bool) -> Result<Self> {
        if codes.iter().flatten().any(|&c| c as usize >= levels.len()) {
            return Err(Error::SchemaMismatch("level code out of range".into()));
        }
        Ok(Self {
            levels,
            codes,
            ordered,
        })
    }

    /// Level labels, in level order.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Level code per row.
    pub fn codes(&self) -> &[Option<u32>] {
        &self.codes
    }

    /// Whether the levels carry a meaningful order (e.g. intervals).
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Label of a row, if present.
    pub fn label(&self, row: usize) -> Option<&str> {
        let code = (*self.codes.get(row)?)?;
        self.levels.get(code as usize).map(String::as_str)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Number of rows per level, in level order.
    pub fn level_counts(&self) -> Vec<usize> {
        let mut counts = alloc::vec![0; self.levels.len()];
        for &code in self.codes.iter().flatten() {
            counts[code as usize] += 1;
        }
        counts
    }
}

fn level_lookup(levels: &[String]) -> HashMap<&str, u32> {
    levels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), u32::try_from(i).unwrap_or(u32::MAX)))
        .collect()
}

/// Storage for one column. `None` cells are missing.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Floating point values.
    Numeric(Vec<Option<f64>>),
    /// Integer values.
    Integer(Vec<Option<i64>>),
    /// Boolean values.
    Boolean(Vec<Option<bool>>),
    /// Categorical labels.
    Categorical(Categorical),
    /// Text values.
    Text(Vec<Option<String>>),
}

impl ColumnData {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Integer(v) => v.len(),
            Self::Boolean(v) => v.len(),
            Self::Categorical(c) => c.len(),
            Self::Text(v) => v.len(),
        }
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The declared type of this column.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Numeric(_) => DataType::Numeric,
            Self::Integer(_) => DataType::Integer,
            Self::Boolean(_) => DataType::Boolean,
            Self::Categorical(_) => DataType::Categorical,
            Self::Text(_) => DataType::Text,
        }
    }

    /// Reads one cell. Rows past the end read as missing.
    pub fn value(&self, row: usize) -> Value {
        match self {
            Self::Numeric(v) => v.get(row).copied().flatten().into(),
            Self::Integer(v) => v.get(row).copied().flatten().into(),
            Self::Boolean(v) => v.get(row).copied().flatten().into(),
            Self::Categorical(c) => c.label(row).into(),
            Self::Text(v) => v.get(row).cloned().flatten().into(),
        }
    }

    /// Returns `true` if the cell at `row` is missing.
    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            Self::Numeric(v) => v.get(row).is_none_or(Option::is_none),
            Self::Integer(v) => v.get(row).is_none_or(Option::is_none),
            Self::Boolean(v) => v.get(row).is_none_or(Option::is_none),
            Self::Categorical(c) => c.codes().get(row).is_none_or(Option::is_none),
            Self::Text(v) => v.get(row).is_none_or(Option::is_none),
        }
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&r| self.is_missing(r)).count()
    }

    /// Gathers rows by index, preserving type and categorical levels.
    ///
    /// Every index must be in range.
    pub fn take(&self, rows: &[usize]) -> Self {
        match self {
            Self::Numeric(v) => Self::Numeric(rows.iter().map(|&r| v[r]).collect()),
            Self::Integer(v) => Self::Integer(rows.iter().map(|&r| v[r]).collect()),
            Self::Boolean(v) => Self::Boolean(rows.iter().map(|&r| v[r]).collect()),
            Self::Categorical(c) => Self::Categorical(Categorical {
                levels: c.levels.clone(),
                codes: rows.iter().map(|&r| c.codes[r]).collect(),
                ordered: c.ordered,
            }),
            Self::Text(v) => Self::Text(rows.iter().map(|&r| v[r].clone()).collect()),
        }
    }

    /// Extracts the present values as `f64`, skipping missing cells.
    ///
    /// Integers widen to `f64`. Fails with [`Error::TypeMismatch`] for non-numeric columns.
    pub fn numeric(&self) -> Result<Vec<f64>> {
        match self {
            Self::Numeric(v) => Ok(v.iter().flatten().copied().collect()),
            Self::Integer(v) => Ok(v.iter().flatten().map(|&i| i as f64).collect()),
            other => Err(Error::TypeMismatch(format!(
                "expected a numeric column, found {}",
                other.data_type()
            ))),
        }
    }

    /// Compares two rows for sorting.
    ///
    /// Missing cells (and NaN) sort last regardless of `descending`. Categorical cells compare
    /// by level order.
    pub fn compare_rows(&self, a: usize, b: usize, descending: bool) -> Ordering {
        fn order<T: PartialOrd>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
            let ord = match (a, b) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => return Ordering::Equal,
            };
            if descending { ord.reverse() } else { ord }
        }

        match self {
            Self::Numeric(v) => {
                let present = |x: Option<f64>| x.filter(|x| !x.is_nan());
                order(present(v[a]), present(v[b]), descending)
            }
            Self::Integer(v) => order(v[a], v[b], descending),
            Self::Boolean(v) => order(v[a], v[b], descending),
            Self::Categorical(c) => order(c.codes[a], c.codes[b], descending),
            Self::Text(v) => order(v[a].as_deref(), v[b].as_deref(), descending),
        }
    }

    /// Materializes evaluated values into a column of type `ty`.
    ///
    /// Integers are accepted into numeric columns. When `ty` is `None` the type is taken from
    /// the first present value, and an all-missing column becomes boolean. Any other type
    /// disagreement fails with [`Error::TypeMismatch`].
    pub fn from_values(ty: Option<DataType>, values: Vec<Value>) -> Result<Self> {
        let ty = ty
            .or_else(|| values.iter().find_map(Value::data_type))
            .unwrap_or(DataType::Boolean);
        let mismatch = |v: &Value| {
            Error::TypeMismatch(format!(
                "cannot store {} in a {ty} column",
                v.data_type().map_or("missing", DataType::name)
            ))
        };
        Ok(match ty {
            DataType::Numeric => Self::Numeric(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Missing => Ok(None),
                        v => v.as_f64().map(Some).ok_or_else(|| mismatch(v)),
                    })
                    .collect::<Result<_>>()?,
            ),
            DataType::Integer => Self::Integer(
                values
                    .iter()
                    .map(|v| match *v {
                        Value::Missing => Ok(None),
                        Value::Integer(i) => Ok(Some(i)),
                        ref v => Err(mismatch(v)),
                    })
                    .collect::<Result<_>>()?,
            ),
            DataType::Boolean => Self::Boolean(
                values
                    .iter()
                    .map(|v| match *v {
                        Value::Missing => Ok(None),
                        Value::Boolean(b) => Ok(Some(b)),
                        ref v => Err(mismatch(v)),
                    })
                    .collect::<Result<_>>()?,
            ),
            DataType::Text => Self::Text(text_labels(values)?),
            DataType::Categorical => {
                Self::Categorical(Categorical::from_labels(text_labels(values)?))
            }
        })
    }

    /// Materializes evaluated labels into a categorical column over a fixed level list.
    ///
    /// Fails with [`Error::TypeMismatch`] for a non-text value and with
    /// [`Error::SchemaMismatch`] for a label outside `levels`.
    pub fn from_values_in_levels(
        levels: Vec<String>,
        ordered: bool,
        values: Vec<Value>,
    ) -> Result<Self> {
        let labels = text_labels(values)?;
        Categorical::with_levels(levels, labels, ordered).map(Self::Categorical)
    }
}

fn text_labels(values: Vec<Value>) -> Result<Vec<Option<String>>> {
    values
        .into_iter()
        .map(|v| match v {
            Value::Missing => Ok(None),
            Value::Text(s) => Ok(Some(s)),
            v => Err(Error::TypeMismatch(format!(
                "cannot store {} in a text column",
                v.data_type().map_or("missing", DataType::name)
            ))),
        })
        .collect()
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name, unique within a dataset.
    pub name: String,
    /// Column storage.
    pub data: ColumnData,
}

impl Column {
    /// Creates a column.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// The declared type of this column.
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
