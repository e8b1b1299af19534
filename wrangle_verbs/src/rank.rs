// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positional row selection.

extern crate alloc;

use alloc::vec::Vec;

use wrangle_core::{Dataset, Result};

use crate::group::partition;

/// Picks rows by 1-based position within each group.
///
/// Positions are applied in the given order and may repeat; positions past the end of a
/// group (and position 0) are skipped silently. On a grouped dataset the picked rows are
/// concatenated group by group in first-appearance order. Grouping is preserved.
///
/// Ranges work directly: `slice(&data, 1..=3)`.
pub fn slice<I>(data: &Dataset, positions: I) -> Result<Dataset>
where
    I: IntoIterator<Item = usize>,
{
    let positions: Vec<usize> = positions.into_iter().collect();
    let mut rows = Vec::new();
    for group in partition(data, data.group_keys())? {
        rows.extend(
            positions
                .iter()
                .filter_map(|&p| p.checked_sub(1).and_then(|i| group.rows.get(i)).copied()),
        );
    }
    let out = data.take_rows(&rows);
    tracing::debug!(
        rows_in = data.row_count(),
        rows_out = out.row_count(),
        "slice"
    );
    Ok(out)
}

/// Keeps the rows whose `column` value is among the `k` largest in each group.
///
/// Rows tied with the `k`-th largest value are all kept, so a group can yield more than `k`
/// rows. Missing values are never selected; a group with fewer than `k` present values keeps
/// all of them. Rows stay in input order and grouping is preserved.
///
/// Fails with [`Error::TypeMismatch`](wrangle_core::Error::TypeMismatch) for a non-numeric
/// column.
pub fn top_n(data: &Dataset, k: usize, column: &str) -> Result<Dataset> {
    let col = data.column(column)?;
    // Validates the type.
    col.data.numeric()?;
    let value = |row: usize| col.data.value(row).as_f64().filter(|x| !x.is_nan());

    let mut rows = Vec::new();
    if k > 0 {
        for group in partition(data, data.group_keys())? {
            let mut present: Vec<f64> = group.rows.iter().filter_map(|&r| value(r)).collect();
            present.sort_by(|a, b| b.total_cmp(a));
            let Some(&threshold) = present.get(k - 1).or(present.last()) else {
                continue;
            };
            rows.extend(
                group
                    .rows
                    .iter()
                    .copied()
                    .filter(|&r| value(r).is_some_and(|x| x >= threshold)),
            );
        }
        rows.sort_unstable();
    }

    let out = data.take_rows(&rows);
    tracing::debug!(
        k,
        column,
        rows_in = data.row_count(),
        rows_out = out.row_count(),
        "top_n"
    );
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
            .text("name", ["ann", "bob", "cid", "dee", "eve", "fay"])
            .categorical("dept", ["Sales", "Eng", "Sales", "Eng", "Sales", "Eng"])
            .numeric("salary", [Some(30.0_f64), Some(30.0), Some(20.0), None, Some(10.0), Some(40.0)])
            .build()
            .unwrap()
    }

    fn names(ds: &Dataset) -> Vec<Value> {
        (0..ds.row_count()).map(|r| ds.value(r, "name").unwrap()).collect()
    }

    #[test]
    fn slice_positions() {
        let out = slice(&staff(), [3, 1, 1, 0, 99]).unwrap();
        assert_eq!(names(&out), vec![Value::from("cid"), "ann".into(), "ann".into()]);
        assert_eq!(slice(&staff(), 1..=2).unwrap().row_count(), 2);
    }

    #[test]
    fn slice_per_group() {
        let grouped = group_by(&staff(), ["dept"]).unwrap();
        let out = slice(&grouped, [1, 3]).unwrap();
        assert_eq!(
            names(&out),
            vec![
                Value::from("ann"),
                Value::from("eve"),
                Value::from("bob"),
                Value::from("fay"),
            ]
        );
        assert_eq!(out.group_keys(), ["dept"]);
    }

    #[test]
    fn top_n_keeps_boundary_ties() {
        let ds = Dataset::builder()
            .numeric("salary", [30.0, 30.0, 20.0, 10.0])
            .build()
            .unwrap();
        let out = top_n(&ds, 2, "salary").unwrap();
        assert_eq!(out.numeric("salary").unwrap(), vec![30.0, 30.0]);
        let first = top_n(&ds, 1, "salary").unwrap();
        assert_eq!(first.row_count(), 2);
        assert_eq!(top_n(&ds, 0, "salary").unwrap().row_count(), 0);
    }

    #[test]
    fn top_n_per_group_skips_missing() {
        let grouped = group_by(&staff(), ["dept"]).unwrap();
        let out = top_n(&grouped, 1, "salary").unwrap();
        assert_eq!(names(&out), vec![Value::from("ann"), "fay".into()]);
        let all = top_n(&grouped, 10, "salary").unwrap();
        assert_eq!(all.row_count(), 5);
        assert!(matches!(
            top_n(&staff(), 1, "name"),
            Err(Error::TypeMismatch(_))
        ));
    }
}
