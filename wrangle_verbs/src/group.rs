// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grouping keys, partitioning and counting.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;
use wrangle_core::{Column, ColumnData, Dataset, Error, Result, Value};

/// One group of rows sharing the same key values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Key values, one per grouping column, in grouping-key order.
    pub key: Vec<Value>,
    /// Ascending row indices belonging to the group.
    pub rows: Vec<usize>,
}

/// Options for [`count`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountOptions {
    /// Sort the result by count, largest first. Ties keep first-appearance order.
    pub sort: bool,
    /// Name of the count column.
    pub name: String,
}

impl Default for CountOptions {
    fn default() -> Self {
        Self {
            sort: false,
            name: String::from("n"),
        }
    }
}

impl CountOptions {
    /// Enables sorting by count.
    pub fn sorted(mut self) -> Self {
        self.sort = true;
        self
    }

    /// Sets the count column name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

type Key = SmallVec<[Value; 2]>;

/// Splits rows into groups by `keys`, ordered by first appearance.
///
/// No keys yields a single group holding every row, even when the dataset is empty.
pub(crate) fn partition(data: &Dataset, keys: &[String]) -> Result<Vec<Group>> {
    if keys.is_empty() {
        return Ok(vec![Group {
            key: Vec::new(),
            rows: (0..data.row_count()).collect(),
        }]);
    }
    let columns = keys
        .iter()
        .map(|k| data.column(k))
        .collect::<Result<Vec<_>>>()?;

    let mut slots: HashMap<Key, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();
    for row in 0..data.row_count() {
        let key: Key = columns.iter().map(|c| c.data.value(row)).collect();
        match slots.get(&key) {
            Some(&slot) => groups[slot].rows.push(row),
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push(Group {
                    key: key.into_vec(),
                    rows: vec![row],
                });
            }
        }
    }
    tracing::trace!(keys = ?keys, groups = groups.len(), "partitioned rows");
    Ok(groups)
}

/// Key columns for one output row per group, read from each group's first row.
///
/// Categorical levels carry over unchanged.
pub(crate) fn key_columns(data: &Dataset, keys: &[String], groups: &[Group]) -> Result<Vec<Column>> {
    let firsts: Vec<usize> = groups
        .iter()
        .filter_map(|g| g.rows.first().copied())
        .collect();
    keys.iter()
        .map(|k| {
            let col = data.column(k)?;
            Ok(Column::new(k.clone(), col.data.take(&firsts)))
        })
        .collect()
}

/// Sets the grouping keys, replacing any existing grouping. Row order is unchanged.
///
/// Fails with [`Error::UnknownColumn`] if a key names no column. Repeated keys are kept once.
pub fn group_by<I, S>(data: &Dataset, columns: I) -> Result<Dataset>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut keys: Vec<String> = Vec::new();
    for name in columns {
        let name = name.as_ref();
        data.column(name)?;
        if !keys.iter().any(|k| k == name) {
            keys.push(String::from(name));
        }
    }
    let out = data.with_group_keys(keys)?;
    tracing::debug!(keys = ?out.group_keys(), rows = out.row_count(), "group_by");
    Ok(out)
}

/// Removes the grouping keys. Idempotent.
pub fn ungroup(data: &Dataset) -> Dataset {
    if !data.is_grouped() {
        return data.clone();
    }
    tracing::debug!(keys = ?data.group_keys(), "ungroup");
    Dataset::from_shared(data.columns().to_vec(), Vec::new())
        .unwrap_or_else(|_| data.clone())
}

/// The groups of `data` in first-appearance order.
///
/// An ungrouped dataset has exactly one group with an empty key.
pub fn groups(data: &Dataset) -> Result<Vec<Group>> {
    partition(data, data.group_keys())
}

/// Number of groups in `data`.
pub fn n_groups(data: &Dataset) -> Result<usize> {
    groups(data).map(|g| g.len())
}

/// Counts rows per distinct combination of `columns`.
///
/// Grouping is by exactly `columns`, ignoring any grouping already on `data`. The result has
/// one row per combination (first-appearance order, or by count descending with
/// [`CountOptions::sort`]), the key columns followed by the count column, and is ungrouped.
/// No columns counts the whole dataset.
///
/// A count column name that collides with a key fails with [`Error::InvalidArgument`].
pub fn count<I, S>(data: &Dataset, columns: I, options: &CountOptions) -> Result<Dataset>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut keys: Vec<String> = Vec::new();
    for name in columns {
        let name = name.as_ref();
        data.column(name)?;
        if !keys.iter().any(|k| k == name) {
            keys.push(String::from(name));
        }
    }
    if keys.contains(&options.name) {
        return Err(Error::InvalidArgument(format!(
            "count column `{}` collides with a grouping column",
            options.name
        )));
    }

    let mut parts = partition(data, &keys)?;
    if options.sort {
        // Stable, so equal counts keep first-appearance order.
        parts.sort_by(|a, b| b.rows.len().cmp(&a.rows.len()));
    }

    let mut columns = key_columns(data, &keys, &parts)?;
    let counts = parts
        .iter()
        .map(|g| Some(i64::try_from(g.rows.len()).unwrap_or(i64::MAX)))
        .collect();
    columns.push(Column::new(options.name.clone(), ColumnData::Integer(counts)));
    let out = Dataset::from_shared(columns.into_iter().map(Arc::new).collect(), Vec::new())?;

    tracing::debug!(
        keys = ?keys,
        rows_in = data.row_count(),
        rows_out = out.row_count(),
        "count"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn staff() -> Dataset {
        Dataset::builder()
            .categorical("dept", ["Sales", "Eng", "Sales", "Eng", "Sales"])
            .text("site", [Some("NY"), Some("SF"), None, Some("SF"), Some("NY")])
            .numeric("salary", [50.0, 80.0, 60.0, 90.0, 70.0])
            .build()
            .unwrap()
    }

    #[test]
    fn group_by_sets_keys_without_reordering() {
        let ds = staff();
        let g = group_by(&ds, ["dept"]).unwrap();
        assert_eq!(g.group_keys(), ["dept"]);
        assert_eq!(g.columns(), ds.columns());

        let regrouped = group_by(&g, ["site", "site"]).unwrap();
        assert_eq!(regrouped.group_keys(), ["site"]);

        assert_eq!(
            group_by(&ds, ["nope"]).unwrap_err(),
            Error::UnknownColumn("nope".into())
        );
    }

    #[test]
    fn ungroup_is_idempotent() {
        let g = group_by(&staff(), ["dept"]).unwrap();
        let once = ungroup(&g);
        assert!(!once.is_grouped());
        assert_eq!(ungroup(&once), once);
    }

    #[test]
    fn groups_in_first_appearance_order() {
        let g = group_by(&staff(), ["dept"]).unwrap();
        let parts = groups(&g).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].key, vec![Value::from("Sales")]);
        assert_eq!(parts[0].rows, vec![0, 2, 4]);
        assert_eq!(parts[1].rows, vec![1, 3]);
        assert_eq!(n_groups(&staff()).unwrap(), 1);
    }

    #[test]
    fn missing_keys_form_their_own_group() {
        let g = group_by(&staff(), ["site"]).unwrap();
        let parts = groups(&g).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].key, vec![Value::Missing]);
    }

    #[test]
    fn count_departments() {
        let out = count(&staff(), ["dept"], &CountOptions::default()).unwrap();
        assert_eq!(out.row_count(), 2);
        assert!(!out.is_grouped());
        assert_eq!(out.value(0, "dept").unwrap(), Value::from("Sales"));
        assert_eq!(out.value(0, "n").unwrap(), Value::Integer(3));
        assert_eq!(out.value(1, "n").unwrap(), Value::Integer(2));
        // Levels survive the key gather.
        assert_eq!(
            out.column("dept").unwrap().data_type(),
            wrangle_core::DataType::Categorical
        );
    }

    #[test]
    fn count_sorted_and_named() {
        let ds = Dataset::builder()
            .text("k", ["a", "b", "b", "c", "c"])
            .build()
            .unwrap();
        let out = count(&ds, ["k"], &CountOptions::default().sorted().named("hits")).unwrap();
        let keys: Vec<Value> = (0..3).map(|r| out.value(r, "k").unwrap()).collect();
        assert_eq!(keys, vec![Value::from("b"), Value::from("c"), Value::from("a")]);
        assert_eq!(out.value(0, "hits").unwrap(), Value::Integer(2));
    }

    #[test]
    fn count_ignores_existing_grouping_and_rejects_collisions() {
        let g = group_by(&staff(), ["site"]).unwrap();
        let out = count(&g, ["dept"], &CountOptions::default()).unwrap();
        assert_eq!(out.row_count(), 2);
        assert!(matches!(
            count(&staff(), ["dept"], &CountOptions::default().named("dept")),
            Err(Error::InvalidArgument(_))
        ));
        let total = count(&staff(), [] as [&str; 0], &CountOptions::default()).unwrap();
        assert_eq!(total.value(0, "n").unwrap(), Value::Integer(5));
    }
}
