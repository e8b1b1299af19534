// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collapsing groups to one row of summaries.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use wrangle_core::{Column, ColumnData, Dataset, Error, Result};

use crate::eval::{self, Scope};
use crate::expr::Expr;
use crate::group::{key_columns, partition};

/// Collapses each group to one row.
///
/// The result holds the grouping columns (one row per group, first-appearance order)
/// followed by one column per `(name, expr)` pair, and is ungrouped. An ungrouped input
/// produces exactly one row.
///
/// Every expression must reduce a group to a single value: aggregates, literals and
/// arithmetic over them. Anything else fails with [`Error::InvalidArgument`], as does a name
/// that repeats or collides with a grouping column. Errors from the aggregators themselves,
/// such as [`Error::EmptyInput`] for the mean of an all-missing group, propagate.
pub fn summarise<I, N>(data: &Dataset, summaries: I) -> Result<Dataset>
where
    I: IntoIterator<Item = (N, Expr)>,
    N: Into<String>,
{
    let keys = data.group_keys();
    let summaries: Vec<(String, Expr)> = summaries
        .into_iter()
        .map(|(name, expr)| (name.into(), expr))
        .collect();

    let mut types = Vec::with_capacity(summaries.len());
    for (i, (name, expr)) in summaries.iter().enumerate() {
        if !expr.is_scalar() {
            return Err(Error::InvalidArgument(format!(
                "summary `{name}` does not reduce to one value per group"
            )));
        }
        if keys.contains(name) || summaries[..i].iter().any(|(n, _)| n == name) {
            return Err(Error::InvalidArgument(format!(
                "summary name `{name}` is already in use"
            )));
        }
        types.push(eval::infer(expr, data)?);
    }

    let groups = partition(data, keys)?;
    let mut columns = key_columns(data, keys, &groups)?;
    for ((name, expr), ty) in summaries.iter().zip(types) {
        let values = groups
            .iter()
            .map(|g| eval::eval_scalar(expr, &Scope::new(data, &g.rows)))
            .collect::<Result<Vec<_>>>()?;
        columns.push(Column::new(name.clone(), ColumnData::from_values(ty, values)?));
    }

    let out = Dataset::from_shared(columns.into_iter().map(Arc::new).collect(), Vec::new())?;
    tracing::debug!(
        rows_in = data.row_count(),
        groups = groups.len(),
        summaries = summaries.len(),
        "summarise"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use wrangle_core::{DataType, Value};

    use super::*;
    use crate::case::case_when;
    use crate::expr::{
        Predicate, col, lit, max, mean, median, min, n, n_distinct, quantile, sd, sum,
    };
    use crate::group::group_by;

    fn staff() -> Dataset {
        Dataset::builder()
            .categorical("dept", ["Sales", "Eng", "Sales", "Eng", "Sales"])
            .integer("age", [25_i64, 40, 31, 52, 38])
            .numeric("salary", [Some(50.0_f64), Some(80.0), None, Some(90.0), Some(70.0)])
            .build()
            .unwrap()
    }

    #[test]
    fn one_row_per_group() {
        let grouped = group_by(&staff(), ["dept"]).unwrap();
        let out = summarise(
            &grouped,
            [
                ("n", n()),
                ("avg", mean(col("salary"))),
                ("oldest", max(col("age"))),
                ("span", max(col("age")) - min(col("age"))),
            ],
        )
        .unwrap();
        assert!(!out.is_grouped());
        assert_eq!(
            out.column_names().collect::<Vec<_>>(),
            ["dept", "n", "avg", "oldest", "span"]
        );
        assert_eq!(out.row(0), vec![
            Value::from("Sales"),
            Value::Integer(3),
            Value::Numeric(60.0),
            Value::Integer(38),
            Value::Integer(13),
        ]);
        assert_eq!(out.value(1, "avg").unwrap(), Value::Numeric(85.0));
        assert_eq!(out.column("oldest").unwrap().data_type(), DataType::Integer);
    }

    #[test]
    fn ungrouped_summaries_are_one_row() {
        let out = summarise(
            &staff(),
            [
                ("total", sum(col("salary"))),
                ("mid", median(col("age"))),
                ("depts", n_distinct(col("dept"))),
                ("p90", quantile(col("age"), 0.9)),
                ("label", lit("all")),
            ],
        )
        .unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.value(0, "total").unwrap(), Value::Numeric(290.0));
        assert_eq!(out.value(0, "mid").unwrap(), Value::Numeric(38.0));
        assert_eq!(out.value(0, "depts").unwrap(), Value::Integer(2));
        assert_eq!(out.value(0, "label").unwrap(), Value::from("all"));
    }

    #[test]
    fn case_over_aggregates_is_a_summary() {
        let grouped = group_by(&staff(), ["dept"]).unwrap();
        let size = case_when([
            (n().ge(3), lit("big")),
            (Predicate::Always, lit("small")),
        ]);
        let out = summarise(&grouped, [("size", size)]).unwrap();
        assert_eq!(out.value(0, "size").unwrap(), Value::from("big"));
        assert_eq!(out.value(1, "size").unwrap(), Value::from("small"));

        let per_row = case_when([(col("age").gt(30), n())]);
        assert!(matches!(
            summarise(&grouped, [("x", per_row)]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_row_level_expressions_and_name_clashes() {
        let grouped = group_by(&staff(), ["dept"]).unwrap();
        assert!(matches!(
            summarise(&grouped, [("x", col("age"))]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            summarise(&grouped, [("dept", n())]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            summarise(&staff(), [("x", n()), ("x", n())]),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(
            summarise(&staff(), [("x", mean(col("nope")))]).unwrap_err(),
            Error::UnknownColumn("nope".into())
        );
    }

    #[test]
    fn aggregator_errors_propagate() {
        let grouped = group_by(&staff(), ["dept"]).unwrap();
        let one_eng = crate::filter::filter(&grouped, [col("age").lt(45)]).unwrap();
        assert_eq!(
            summarise(&one_eng, [("spread", sd(col("age")))]).unwrap_err(),
            Error::InsufficientData {
                needed: 2,
                found: 1
            }
        );
        let empty = crate::filter::filter(&staff(), [col("age").gt(99)]).unwrap();
        assert_eq!(
            summarise(&empty, [("avg", mean(col("age")))]).unwrap_err(),
            Error::EmptyInput
        );
        assert_eq!(
            summarise(&empty, [("n", n())]).unwrap().value(0, "n").unwrap(),
            Value::Integer(0)
        );
    }
}
