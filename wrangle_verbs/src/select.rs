// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column projection and renaming.

extern crate alloc;

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use wrangle_core::{Column, Dataset, Error, Result};

/// Chooses columns for [`select`].
///
/// Every selector is either an *inclusion* or an *exclusion*; [`Selector::Exclude`] and
/// negative positions are exclusions, everything else includes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A column by name.
    Name(String),
    /// A column by 1-based position. Negative positions exclude that column.
    Position(i64),
    /// Every column from `from` to `to` inclusive, in dataset order (reversed when `from`
    /// comes after `to`).
    Range {
        /// First column.
        from: String,
        /// Last column.
        to: String,
    },
    /// Columns whose names start with the prefix.
    StartsWith(String),
    /// Columns whose names end with the suffix.
    EndsWith(String),
    /// Columns whose names contain the fragment.
    Contains(String),
    /// Every column except those the inner inclusion selects.
    Exclude(Box<Selector>),
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Self::Name(String::from(name))
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<i64> for Selector {
    fn from(position: i64) -> Self {
        Self::Position(position)
    }
}

impl From<i32> for Selector {
    fn from(position: i32) -> Self {
        Self::Position(position.into())
    }
}

/// Columns whose names start with `prefix`.
pub fn starts_with(prefix: impl Into<String>) -> Selector {
    Selector::StartsWith(prefix.into())
}

/// Columns whose names end with `suffix`.
pub fn ends_with(suffix: impl Into<String>) -> Selector {
    Selector::EndsWith(suffix.into())
}

/// Columns whose names contain `fragment`.
pub fn contains(fragment: impl Into<String>) -> Selector {
    Selector::Contains(fragment.into())
}

/// The inclusive run of columns from `from` to `to`.
pub fn range(from: impl Into<String>, to: impl Into<String>) -> Selector {
    Selector::Range {
        from: from.into(),
        to: to.into(),
    }
}

/// Every column except those `selector` picks.
pub fn exclude(selector: impl Into<Selector>) -> Selector {
    Selector::Exclude(Box::new(selector.into()))
}

/// Which way a resolved selector points.
enum Resolved {
    Include(Vec<usize>),
    Exclude(Vec<usize>),
}

fn position_index(data: &Dataset, position: i64) -> Result<usize> {
    usize::try_from(position.unsigned_abs())
        .ok()
        .and_then(|p| p.checked_sub(1))
        .filter(|&i| i < data.column_count())
        .ok_or_else(|| Error::UnknownColumn(format!("#{position}")))
}

fn name_index(data: &Dataset, name: &str) -> Result<usize> {
    data.column_index(name)
        .ok_or_else(|| Error::UnknownColumn(String::from(name)))
}

fn matching(data: &Dataset, test: impl Fn(&str) -> bool) -> Vec<usize> {
    data.column_names()
        .enumerate()
        .filter_map(|(i, name)| test(name).then_some(i))
        .collect()
}

fn resolve(data: &Dataset, selector: &Selector) -> Result<Resolved> {
    Ok(match selector {
        Selector::Name(name) => Resolved::Include(vec![name_index(data, name)?]),
        Selector::Position(p) if *p < 0 => Resolved::Exclude(vec![position_index(data, *p)?]),
        Selector::Position(p) => Resolved::Include(vec![position_index(data, *p)?]),
        Selector::Range { from, to } => {
            let (a, b) = (name_index(data, from)?, name_index(data, to)?);
            Resolved::Include(if a <= b {
                (a..=b).collect()
            } else {
                (b..=a).rev().collect()
            })
        }
        Selector::StartsWith(s) => Resolved::Include(matching(data, |n| n.starts_with(s.as_str()))),
        Selector::EndsWith(s) => Resolved::Include(matching(data, |n| n.ends_with(s.as_str()))),
        Selector::Contains(s) => Resolved::Include(matching(data, |n| n.contains(s.as_str()))),
        Selector::Exclude(inner) => match resolve(data, inner)? {
            Resolved::Include(cols) => Resolved::Exclude(cols),
            Resolved::Exclude(_) => return Err(Error::ConflictingSelectors),
        },
    })
}

/// Projects columns by selector.
///
/// Inclusions produce columns in the order first selected; exclusions keep every other
/// column in dataset order. Mixing the two fails with [`Error::ConflictingSelectors`], and a
/// name or position that matches no column fails with [`Error::UnknownColumn`]. Pattern
/// selectors that match nothing select nothing.
///
/// On a grouped dataset any grouping column left out is prepended, so the result stays
/// grouped by the same keys.
pub fn select<I, S>(data: &Dataset, selectors: I) -> Result<Dataset>
where
    I: IntoIterator<Item = S>,
    S: Into<Selector>,
{
    let mut included: Vec<usize> = Vec::new();
    let mut excluded: Vec<usize> = Vec::new();
    for selector in selectors {
        match resolve(data, &selector.into())? {
            Resolved::Include(cols) => included.extend(cols),
            Resolved::Exclude(cols) => excluded.extend(cols),
        }
    }
    if !included.is_empty() && !excluded.is_empty() {
        return Err(Error::ConflictingSelectors);
    }

    let mut picked: Vec<usize> = if excluded.is_empty() {
        let mut seen = Vec::with_capacity(included.len());
        for i in included {
            if !seen.contains(&i) {
                seen.push(i);
            }
        }
        seen
    } else {
        (0..data.column_count())
            .filter(|i| !excluded.contains(i))
            .collect()
    };

    let missing_keys: Vec<usize> = data
        .group_keys()
        .iter()
        .filter_map(|k| data.column_index(k))
        .filter(|i| !picked.contains(i))
        .collect();
    if !missing_keys.is_empty() {
        let added: Vec<&str> = missing_keys
            .iter()
            .map(|&i| data.columns()[i].name.as_str())
            .collect();
        tracing::debug!(keys = ?added, "select: adding grouping columns");
        picked.splice(0..0, missing_keys);
    }

    let columns = picked.iter().map(|&i| data.columns()[i].clone()).collect();
    let out = Dataset::from_shared(columns, data.group_keys().to_vec())?;
    tracing::debug!(
        columns_in = data.column_count(),
        columns_out = out.column_count(),
        "select"
    );
    Ok(out)
}

/// Renames columns by `(old, new)` pairs, keeping column order and grouping.
///
/// Fails with [`Error::UnknownColumn`] if `old` names no column, and with
/// [`Error::SchemaMismatch`] if a new name collides with another column.
pub fn rename<I, A, B>(data: &Dataset, pairs: I) -> Result<Dataset>
where
    I: IntoIterator<Item = (A, B)>,
    A: AsRef<str>,
    B: Into<String>,
{
    let mut columns: Vec<Arc<Column>> = data.columns().to_vec();
    let mut keys: Vec<String> = data.group_keys().to_vec();
    for (old, new) in pairs {
        let (old, new) = (old.as_ref(), new.into());
        let i = columns
            .iter()
            .position(|c| c.name == old)
            .ok_or_else(|| Error::UnknownColumn(String::from(old)))?;
        for key in keys.iter_mut().filter(|k| *k == old) {
            key.clone_from(&new);
        }
        columns[i] = Arc::new(Column::new(new, columns[i].data.clone()));
    }
    let out = Dataset::from_shared(columns, keys)?;
    tracing::debug!(columns = out.column_count(), "rename");
    Ok(out)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::group::group_by;

    fn wide() -> Dataset {
        Dataset::builder()
            .text("name", ["a", "b"])
            .numeric("q1_sales", [1.0, 2.0])
            .numeric("q2_sales", [3.0, 4.0])
            .numeric("q2_cost", [5.0, 6.0])
            .text("region", ["N", "S"])
            .build()
            .unwrap()
    }

    fn names(ds: &Dataset) -> Vec<&str> {
        ds.column_names().collect()
    }

    #[test]
    fn inclusion_order_is_first_selection() {
        let ds = wide();
        let out = select(&ds, [Selector::from("region"), starts_with("q2"), "region".into()])
            .unwrap();
        assert_eq!(names(&out), ["region", "q2_sales", "q2_cost"]);
        // Unchanged columns are shared with the input.
        assert!(Arc::ptr_eq(
            &out.columns()[0],
            ds.shared_column("region").unwrap()
        ));
    }

    #[test]
    fn positions_and_ranges() {
        let ds = wide();
        assert_eq!(names(&select(&ds, [2_i64, 1]).unwrap()), ["q1_sales", "name"]);
        assert_eq!(names(&select(&ds, [-1_i64, -5]).unwrap()), ["q1_sales", "q2_sales", "q2_cost"]);
        assert_eq!(
            names(&select(&ds, [range("q1_sales", "q2_cost")]).unwrap()),
            ["q1_sales", "q2_sales", "q2_cost"]
        );
        assert_eq!(
            names(&select(&ds, [range("q2_sales", "name")]).unwrap()),
            ["q2_sales", "q1_sales", "name"]
        );
    }

    #[test]
    fn exclusion_keeps_dataset_order() {
        let out = select(&wide(), [exclude(ends_with("_sales")), exclude("name")]).unwrap();
        assert_eq!(names(&out), ["q2_cost", "region"]);
    }

    #[test]
    fn errors() {
        let ds = wide();
        assert_eq!(
            select(&ds, [Selector::from("nope")]).unwrap_err(),
            Error::UnknownColumn("nope".into())
        );
        assert!(matches!(select(&ds, [9_i64]), Err(Error::UnknownColumn(_))));
        assert!(matches!(select(&ds, [0_i64]), Err(Error::UnknownColumn(_))));
        assert_eq!(
            select(&ds, [Selector::from("name"), exclude("region")]).unwrap_err(),
            Error::ConflictingSelectors
        );
        assert!(select(&ds, [contains("zzz")]).unwrap().column_names().next().is_none());
    }

    #[test]
    fn grouping_columns_are_kept() {
        let grouped = group_by(&wide(), ["region"]).unwrap();
        let out = select(&grouped, ["q1_sales"]).unwrap();
        assert_eq!(names(&out), ["region", "q1_sales"]);
        assert_eq!(out.group_keys(), ["region"]);
    }

    #[test]
    fn rename_follows_grouping() {
        let grouped = group_by(&wide(), ["region"]).unwrap();
        let out = rename(&grouped, [("region", "area"), ("name", "id")]).unwrap();
        assert_eq!(names(&out), ["id", "q1_sales", "q2_sales", "q2_cost", "area"]);
        assert_eq!(out.group_keys(), ["area"]);
        assert!(matches!(
            rename(&wide(), [("name", "region")]),
            Err(Error::SchemaMismatch(_))
        ));
        assert_eq!(
            rename(&wide(), [("nope", "x")]).unwrap_err(),
            Error::UnknownColumn("nope".into())
        );
    }
}
