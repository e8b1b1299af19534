// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stable multi-key row ordering.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;

use wrangle_core::{Dataset, Result};

/// Sorting order for a [`SortKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

/// One column of a multi-key sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Column to sort by.
    pub column: String,
    /// Direction.
    pub order: SortOrder,
}

/// Ascending key.
pub fn asc(column: impl Into<String>) -> SortKey {
    SortKey {
        column: column.into(),
        order: SortOrder::Asc,
    }
}

/// Descending key.
pub fn desc(column: impl Into<String>) -> SortKey {
    SortKey {
        column: column.into(),
        order: SortOrder::Desc,
    }
}

impl From<&str> for SortKey {
    fn from(column: &str) -> Self {
        asc(column)
    }
}

/// Reorders rows lexicographically by `keys`.
///
/// The sort is stable: rows that compare equal on every key keep their input order. Missing
/// values (and NaN) sort last in either direction, and categorical columns sort by level
/// order rather than by label. Grouping is preserved but does not affect the order.
///
/// Fails with [`Error::UnknownColumn`](wrangle_core::Error::UnknownColumn) for an unknown key.
pub fn arrange<I, K>(data: &Dataset, keys: I) -> Result<Dataset>
where
    I: IntoIterator<Item = K>,
    K: Into<SortKey>,
{
    let keys: Vec<SortKey> = keys.into_iter().map(Into::into).collect();
    let columns = keys
        .iter()
        .map(|k| Ok((data.column(&k.column)?, k.order == SortOrder::Desc)))
        .collect::<Result<Vec<_>>>()?;

    let mut rows: Vec<usize> = (0..data.row_count()).collect();
    rows.sort_by(|&a, &b| {
        columns
            .iter()
            .map(|(col, descending)| col.data.compare_rows(a, b, *descending))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    let out = data.take_rows(&rows);
    tracing::debug!(keys = keys.len(), rows = out.row_count(), "arrange");
    Ok(out)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use wrangle_core::{Error, Value};

    use super::*;
    use crate::group::group_by;

    fn staff() -> Dataset {
        Dataset::builder()
            .text("name", ["ann", "bob", "cid", "dee", "eve"])
            .categorical_with_levels(
                "size",
                &["small", "medium", "large"],
                ["large", "small", "medium", "small", "large"],
            )
            .numeric("salary", [Some(70.0_f64), None, Some(50.0), Some(70.0), Some(f64::NAN)])
            .build()
            .unwrap()
    }

    fn column(ds: &Dataset, name: &str) -> Vec<Value> {
        (0..ds.row_count()).map(|r| ds.value(r, name).unwrap()).collect()
    }

    #[test]
    fn missing_sorts_last_in_both_directions() {
        let up = arrange(&staff(), ["salary"]).unwrap();
        assert_eq!(column(&up, "name")[..3], [Value::from("cid"), "ann".into(), "dee".into()]);
        let down = arrange(&staff(), [desc("salary")]).unwrap();
        assert_eq!(
            column(&down, "name"),
            vec![
                Value::from("ann"),
                Value::from("dee"),
                Value::from("cid"),
                Value::from("bob"),
                Value::from("eve"),
            ]
        );
    }

    #[test]
    fn categorical_sorts_by_level_order() {
        let out = arrange(&staff(), [asc("size"), desc("name")]).unwrap();
        assert_eq!(
            column(&out, "name"),
            vec![
                Value::from("dee"),
                Value::from("bob"),
                Value::from("cid"),
                Value::from("eve"),
                Value::from("ann"),
            ]
        );
    }

    #[test]
    fn stable_and_keeps_grouping() {
        let grouped = group_by(&staff(), ["size"]).unwrap();
        let out = arrange(&grouped, [desc("size")]).unwrap();
        // Ties on `size` keep input order.
        assert_eq!(
            column(&out, "name"),
            vec![
                Value::from("ann"),
                Value::from("eve"),
                Value::from("cid"),
                Value::from("bob"),
                Value::from("dee"),
            ]
        );
        assert_eq!(out.group_keys(), ["size"]);
        assert_eq!(
            arrange(&staff(), ["nope"]).unwrap_err(),
            Error::UnknownColumn("nope".into())
        );
    }
}
