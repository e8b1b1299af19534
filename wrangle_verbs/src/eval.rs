// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type checking and scope-aware evaluation of expressions and predicates.
//!
//! Evaluation is column-at-a-time over a set of *active* rows inside a *scope*:
//! - the scope is the group (or whole dataset) that aggregates and window functions reduce over,
//! - the active rows are the subset whose values are requested.
//!
//! Keeping the two apart lets `And`/`Or`/case guards narrow the active rows as they
//! short-circuit while aggregates still see the full group.

extern crate alloc;

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use hashbrown::HashSet;
use wrangle_core::{Categorical, ColumnData, DataType, Dataset, Error, Result, Value, stats};

use crate::case;
use crate::expr::{Aggregate, ArithOp, CompareOp, Expr, Predicate, Window};

/// The rows an aggregate or window function reduces over.
///
/// `rows` are ascending dataset row indices.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub(crate) data: &'a Dataset,
    pub(crate) rows: &'a [usize],
}

impl<'a> Scope<'a> {
    pub(crate) fn new(data: &'a Dataset, rows: &'a [usize]) -> Self {
        debug_assert!(rows.is_sorted(), "scope rows must be ascending");
        Self { data, rows }
    }
}

/// Infers the result type of `expr` against `data`.
///
/// `None` means every value is missing (a bare missing literal).
pub(crate) fn infer(expr: &Expr, data: &Dataset) -> Result<Option<DataType>> {
    Ok(match expr {
        Expr::Column(name) => Some(data.column(name)?.data_type()),
        Expr::Literal(v) => v.data_type(),
        Expr::Arith { op, lhs, rhs } => {
            let l = numeric_input(lhs, data, "arithmetic")?;
            let r = numeric_input(rhs, data, "arithmetic")?;
            match (op, l, r) {
                (_, None, None) => None,
                (ArithOp::Div, _, _) => Some(DataType::Numeric),
                (_, Some(DataType::Integer) | None, Some(DataType::Integer) | None) => {
                    Some(DataType::Integer)
                }
                _ => Some(DataType::Numeric),
            }
        }
        Expr::Negate(e) => numeric_input(e, data, "negation")?,
        Expr::Aggregate(agg) => Some(match agg {
            Aggregate::Count => DataType::Integer,
            Aggregate::CountDistinct(e) => {
                infer(e, data)?;
                DataType::Integer
            }
            Aggregate::Sum(e) | Aggregate::Min(e) | Aggregate::Max(e) => {
                numeric_input(e, data, "sum/min/max")?.unwrap_or(DataType::Numeric)
            }
            Aggregate::Mean(e) | Aggregate::Sd(e) | Aggregate::Median(e) => {
                numeric_input(e, data, "mean/sd/median")?;
                DataType::Numeric
            }
            Aggregate::Quantile(e, p) => {
                numeric_input(e, data, "quantile")?;
                if !(0.0..=1.0).contains(p) {
                    return Err(Error::InvalidArgument(format!(
                        "quantile probability {p} is outside [0, 1]"
                    )));
                }
                DataType::Numeric
            }
        }),
        Expr::Window(w) => Some(match w {
            Window::Rank(e) => {
                numeric_input(e, data, "rank")?;
                DataType::Numeric
            }
            Window::CumSum(e) => numeric_input(e, data, "cumsum")?.unwrap_or(DataType::Numeric),
            Window::RowNumber => DataType::Integer,
        }),
        Expr::Case(c) => case::infer(c, data)?,
        Expr::Condition(p) => {
            check_predicate(p, data)?;
            Some(DataType::Boolean)
        }
    })
}

fn numeric_input(expr: &Expr, data: &Dataset, what: &str) -> Result<Option<DataType>> {
    match infer(expr, data)? {
        Some(ty) if !ty.is_numeric() => Err(Error::TypeMismatch(format!(
            "{what} needs a numeric input, found {ty}"
        ))),
        ty => Ok(ty),
    }
}

/// The level list shared by every categorical column `expr` can yield values from.
///
/// `None` when a value may come from anywhere else or the columns disagree on levels. The
/// result is ordered only if every source is.
pub(crate) fn shared_levels(expr: &Expr, data: &Dataset) -> Option<(Vec<String>, bool)> {
    fn sources<'a>(expr: &Expr, data: &'a Dataset, out: &mut Vec<&'a Categorical>) -> bool {
        match expr {
            Expr::Column(name) => match data.column(name).map(|c| &c.data) {
                Ok(ColumnData::Categorical(c)) => {
                    out.push(c);
                    true
                }
                _ => false,
            },
            Expr::Literal(v) => v.is_missing(),
            Expr::Case(c) => c.branches.iter().all(|(_, v)| sources(v, data, out)),
            _ => false,
        }
    }

    let mut found = Vec::new();
    if !sources(expr, data, &mut found) {
        return None;
    }
    let (first, rest) = found.split_first()?;
    rest.iter()
        .all(|c| c.levels() == first.levels())
        .then(|| {
            let ordered = found.iter().all(|c| c.is_ordered());
            (first.levels().to_vec(), ordered)
        })
}

/// Validates a predicate against `data`.
///
/// Unknown columns and incompatible comparisons surface as [`Error::InvalidPredicate`].
pub(crate) fn check_predicate(pred: &Predicate, data: &Dataset) -> Result<()> {
    check_predicate_inner(pred, data).map_err(|err| match err {
        Error::InvalidPredicate(_) | Error::InvalidArgument(_) => err,
        other => Error::InvalidPredicate(other.to_string()),
    })
}

fn check_predicate_inner(pred: &Predicate, data: &Dataset) -> Result<()> {
    match pred {
        Predicate::Compare { lhs, op, rhs } => {
            let (Some(l), Some(r)) = (infer(lhs, data)?, infer(rhs, data)?) else {
                return Ok(());
            };
            let Some(common) = l.common_supertype(r) else {
                return Err(Error::InvalidPredicate(format!("cannot compare {l} with {r}")));
            };
            let unordered = |t: DataType| matches!(t, DataType::Categorical | DataType::Boolean);
            if op.is_ordering() && (unordered(l) || unordered(r) || unordered(common)) {
                return Err(Error::InvalidPredicate(format!(
                    "ordering comparison is not defined for {l} and {r}"
                )));
            }
            Ok(())
        }
        Predicate::IsIn { expr, set } => {
            let Some(ty) = infer(expr, data)? else {
                return Ok(());
            };
            for v in set {
                if let Some(vt) = v.data_type()
                    && ty.common_supertype(vt).is_none()
                {
                    return Err(Error::InvalidPredicate(format!(
                        "cannot test a {ty} value for membership among {vt} values"
                    )));
                }
            }
            Ok(())
        }
        Predicate::IsMissing(e) => infer(e, data).map(|_| ()),
        Predicate::Holds(e) => match infer(e, data)? {
            None | Some(DataType::Boolean) => Ok(()),
            Some(ty) => Err(Error::InvalidPredicate(format!(
                "expected a boolean expression, found {ty}"
            ))),
        },
        Predicate::And(ps) | Predicate::Or(ps) => {
            ps.iter().try_for_each(|p| check_predicate_inner(p, data))
        }
        Predicate::Not(p) => check_predicate_inner(p, data),
        Predicate::Always => Ok(()),
    }
}

/// Evaluates `expr` for each active row, in `active` order.
pub(crate) fn eval(expr: &Expr, scope: &Scope<'_>, active: &[usize]) -> Result<Vec<Value>> {
    match expr {
        Expr::Column(name) => {
            let col = scope.data.column(name)?;
            Ok(active.iter().map(|&r| col.data.value(r)).collect())
        }
        Expr::Literal(v) => Ok(vec![v.clone(); active.len()]),
        Expr::Arith { op, lhs, rhs } => {
            let l = eval(lhs, scope, active)?;
            let r = eval(rhs, scope, active)?;
            l.iter().zip(&r).map(|(a, b)| arith(*op, a, b)).collect()
        }
        Expr::Negate(e) => eval(e, scope, active)?
            .into_iter()
            .map(|v| match v {
                Value::Integer(i) => i
                    .checked_neg()
                    .map(Value::Integer)
                    .ok_or_else(|| Error::InvalidArgument("integer overflow in negation".into())),
                Value::Numeric(x) => Ok(Value::Numeric(-x)),
                other => Ok(other),
            })
            .collect(),
        Expr::Aggregate(agg) => Ok(vec![aggregate(agg, scope)?; active.len()]),
        Expr::Window(w) => {
            let full = window(w, scope)?;
            Ok(pick(scope, full, active))
        }
        Expr::Case(c) => case::eval(c, scope, active),
        Expr::Condition(p) => Ok(eval_predicate(p, scope, active)?
            .into_iter()
            .map(Value::from)
            .collect()),
    }
}

/// Placeholder row for scalar evaluation; scalar expressions never read row data.
const SCALAR_ROW: usize = usize::MAX;

/// Evaluates an expression that reduces to a single value per scope.
pub(crate) fn eval_scalar(expr: &Expr, scope: &Scope<'_>) -> Result<Value> {
    debug_assert!(expr.is_scalar(), "eval_scalar on a row-level expression");
    Ok(eval(expr, scope, &[SCALAR_ROW])?.pop().unwrap_or_default())
}

/// Evaluates a predicate for each active row with three-valued logic.
pub(crate) fn eval_predicate(
    pred: &Predicate,
    scope: &Scope<'_>,
    active: &[usize],
) -> Result<Vec<Option<bool>>> {
    match pred {
        Predicate::Compare { lhs, op, rhs } => {
            let l = eval(lhs, scope, active)?;
            let r = eval(rhs, scope, active)?;
            Ok(l.iter()
                .zip(&r)
                .map(|(a, b)| a.partial_compare(b).map(|ord| op.holds(ord)))
                .collect())
        }
        Predicate::IsIn { expr, set } => Ok(eval(expr, scope, active)?
            .iter()
            .map(|v| {
                let hit = set
                    .iter()
                    .any(|s| s == v || v.partial_compare(s) == Some(Ordering::Equal));
                if hit || !v.is_missing() {
                    Some(hit)
                } else {
                    None
                }
            })
            .collect()),
        Predicate::IsMissing(e) => Ok(eval(e, scope, active)?
            .iter()
            .map(|v| Some(v.is_missing()))
            .collect()),
        Predicate::Holds(e) => Ok(eval(e, scope, active)?
            .iter()
            .map(Value::as_bool)
            .collect()),
        Predicate::And(ps) => connective(ps, scope, active, false),
        Predicate::Or(ps) => connective(ps, scope, active, true),
        Predicate::Not(p) => Ok(eval_predicate(p, scope, active)?
            .into_iter()
            .map(|v| v.map(|b| !b))
            .collect()),
        Predicate::Always => Ok(vec![Some(true); active.len()]),
    }
}

/// Shared short-circuit loop for `And` (`decisive = false`) and `Or` (`decisive = true`).
///
/// Each operand is evaluated only on rows no earlier operand has decided.
fn connective(
    ps: &[Predicate],
    scope: &Scope<'_>,
    active: &[usize],
    decisive: bool,
) -> Result<Vec<Option<bool>>> {
    let mut out = vec![Some(!decisive); active.len()];
    let mut pending: Vec<usize> = (0..active.len()).collect();
    for p in ps {
        if pending.is_empty() {
            break;
        }
        let rows: Vec<usize> = pending.iter().map(|&i| active[i]).collect();
        let results = eval_predicate(p, scope, &rows)?;
        let mut still = Vec::with_capacity(pending.len());
        for (pos, r) in pending.into_iter().zip(results) {
            match r {
                Some(b) if b == decisive => out[pos] = Some(decisive),
                Some(_) => still.push(pos),
                None => {
                    out[pos] = None;
                    still.push(pos);
                }
            }
        }
        pending = still;
    }
    Ok(out)
}

fn arith(op: ArithOp, a: &Value, b: &Value) -> Result<Value> {
    if let (Value::Integer(x), Value::Integer(y)) = (a, b)
        && op != ArithOp::Div
    {
        let out = match op {
            ArithOp::Add => x.checked_add(*y),
            ArithOp::Sub => x.checked_sub(*y),
            ArithOp::Mul => x.checked_mul(*y),
            ArithOp::Div => unreachable!("division is handled as numeric"),
        };
        return out
            .map(Value::Integer)
            .ok_or_else(|| Error::InvalidArgument("integer overflow in arithmetic".into()));
    }
    let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) else {
        return Ok(Value::Missing);
    };
    Ok(Value::Numeric(match op {
        ArithOp::Add => x + y,
        ArithOp::Sub => x - y,
        ArithOp::Mul => x * y,
        ArithOp::Div => x / y,
    }))
}

/// Present values of `expr` over the whole scope, in scope order.
fn present(expr: &Expr, scope: &Scope<'_>) -> Result<Vec<Value>> {
    let mut values = eval(expr, scope, scope.rows)?;
    values.retain(|v| v.as_f64().is_some());
    Ok(values)
}

/// Integer view of `values`, or `None` when any of them is not an integer.
fn integers(values: &[Value]) -> Option<Vec<i64>> {
    values
        .iter()
        .map(|v| match v {
            Value::Integer(i) => Some(*i),
            _ => None,
        })
        .collect()
}

fn floats(values: &[Value]) -> Vec<f64> {
    values.iter().filter_map(Value::as_f64).collect()
}

/// Reduces the scope to one value.
pub(crate) fn aggregate(agg: &Aggregate, scope: &Scope<'_>) -> Result<Value> {
    match agg {
        Aggregate::Count => Ok(count_value(scope.rows.len())),
        Aggregate::CountDistinct(e) => {
            let values = eval(e, scope, scope.rows)?;
            let distinct: HashSet<&Value> = values.iter().collect();
            Ok(count_value(distinct.len()))
        }
        Aggregate::Sum(e) => {
            let values = present(e, scope)?;
            match integers(&values) {
                Some(ints) if !ints.is_empty() => ints
                    .iter()
                    .try_fold(0_i64, |acc, &i| acc.checked_add(i))
                    .map(Value::Integer)
                    .ok_or_else(|| Error::InvalidArgument("integer overflow in sum".into())),
                _ => stats::sum(&floats(&values)).map(Value::Numeric),
            }
        }
        Aggregate::Min(e) | Aggregate::Max(e) => {
            let values = present(e, scope)?;
            let is_min = matches!(agg, Aggregate::Min(_));
            if let Some(ints) = integers(&values)
                && !ints.is_empty()
            {
                let best = if is_min {
                    ints.iter().min()
                } else {
                    ints.iter().max()
                };
                return best.map(|&i| Value::Integer(i)).ok_or(Error::EmptyInput);
            }
            let xs = floats(&values);
            let best = if is_min {
                stats::min(&xs)?
            } else {
                stats::max(&xs)?
            };
            Ok(Value::Numeric(best))
        }
        Aggregate::Mean(e) => stats::mean(&floats(&present(e, scope)?)).map(Value::Numeric),
        Aggregate::Sd(e) => stats::sd(&floats(&present(e, scope)?)).map(Value::Numeric),
        Aggregate::Median(e) => stats::median(&floats(&present(e, scope)?)).map(Value::Numeric),
        Aggregate::Quantile(e, p) => {
            stats::quantile(&floats(&present(e, scope)?), *p).map(Value::Numeric)
        }
    }
}

fn count_value(n: usize) -> Value {
    Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}

/// Evaluates a window function for every scope row, in scope order.
fn window(w: &Window, scope: &Scope<'_>) -> Result<Vec<Value>> {
    match w {
        Window::RowNumber => Ok((1..=scope.rows.len()).map(count_value).collect()),
        Window::Rank(e) => {
            let values = eval(e, scope, scope.rows)?;
            let number = |v: &Value| v.as_f64().filter(|x| !x.is_nan());
            let xs: Vec<f64> = values.iter().filter_map(number).collect();
            let mut ranks = stats::rank(&xs).into_iter();
            Ok(values
                .iter()
                .map(|v| match number(v) {
                    Some(_) => ranks.next().map_or(Value::Missing, Value::Numeric),
                    None => Value::Missing,
                })
                .collect())
        }
        Window::CumSum(e) => {
            let values = eval(e, scope, scope.rows)?;
            let mut out = Vec::with_capacity(values.len());
            let mut acc = Value::Integer(0);
            for v in &values {
                acc = match (&acc, v) {
                    (Value::Missing, _) | (_, Value::Missing) => Value::Missing,
                    (a, b) => arith(ArithOp::Add, a, b)?,
                };
                out.push(acc.clone());
            }
            Ok(out)
        }
    }
}

/// Reads scope-ordered window values back for the active rows.
fn pick(scope: &Scope<'_>, full: Vec<Value>, active: &[usize]) -> Vec<Value> {
    if active == scope.rows {
        return full;
    }
    active
        .iter()
        .map(|r| {
            scope
                .rows
                .binary_search(r)
                .map_or(Value::Missing, |i| full[i].clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::expr::{col, cumsum, lit, mean, n, n_distinct, rank, row_number, sum};

    fn data() -> Dataset {
        Dataset::builder()
            .categorical("dept", ["Sales", "Eng", "Sales", "Eng"])
            .integer("age", [Some(30_i64), None, Some(41), Some(25)])
            .numeric("salary", [50.0, 80.0, 60.0, f64::NAN])
            .build()
            .unwrap()
    }

    fn all_rows(ds: &Dataset) -> Vec<usize> {
        (0..ds.row_count()).collect()
    }

    #[test]
    fn infer_types() {
        let ds = data();
        assert_eq!(infer(&(col("age") + 1), &ds).unwrap(), Some(DataType::Integer));
        assert_eq!(infer(&(col("age") / 2), &ds).unwrap(), Some(DataType::Numeric));
        assert_eq!(infer(&sum(col("age")), &ds).unwrap(), Some(DataType::Integer));
        assert_eq!(infer(&mean(col("age")), &ds).unwrap(), Some(DataType::Numeric));
        assert!(matches!(
            infer(&sum(col("dept")), &ds),
            Err(Error::TypeMismatch(_))
        ));
        assert_eq!(
            infer(&col("nope"), &ds).unwrap_err(),
            Error::UnknownColumn("nope".into())
        );
    }

    #[test]
    fn predicate_checks() {
        let ds = data();
        assert!(check_predicate(&col("dept").equals("Eng"), &ds).is_ok());
        assert!(matches!(
            check_predicate(&col("dept").gt("Eng"), &ds),
            Err(Error::InvalidPredicate(_))
        ));
        assert!(matches!(
            check_predicate(&col("age").equals("x"), &ds),
            Err(Error::InvalidPredicate(_))
        ));
        assert!(matches!(
            check_predicate(&col("nope").equals(1), &ds),
            Err(Error::InvalidPredicate(_))
        ));
    }

    #[test]
    fn three_valued_connectives() {
        let ds = data();
        let rows = all_rows(&ds);
        let scope = Scope::new(&ds, &rows);
        // age > 28: [true, unknown, true, false]
        let older = col("age").gt(28);
        assert_eq!(
            eval_predicate(&older, &scope, &rows).unwrap(),
            vec![Some(true), None, Some(true), Some(false)]
        );
        let and = older.clone().and(col("dept").equals("Sales"));
        assert_eq!(
            eval_predicate(&and, &scope, &rows).unwrap(),
            vec![Some(true), None, Some(true), Some(false)]
        );
        let or = older.clone().or(col("dept").equals("Eng"));
        assert_eq!(
            eval_predicate(&or, &scope, &rows).unwrap(),
            vec![Some(true), Some(true), Some(true), Some(true)]
        );
        assert_eq!(
            eval_predicate(&!older, &scope, &rows).unwrap(),
            vec![Some(false), None, Some(false), Some(true)]
        );
    }

    #[test]
    fn right_operands_only_see_undecided_rows() {
        let ds = Dataset::builder()
            .integer("x", [Some(1_i64), Some(1_000), None])
            .build()
            .unwrap();
        let rows = all_rows(&ds);
        let scope = Scope::new(&ds, &rows);
        // `x * i64::MAX` overflows on the second row, which the left operand decides.
        let and = col("x").lt(10).and((col("x") * i64::MAX).gt(0));
        assert_eq!(
            eval_predicate(&and, &scope, &rows).unwrap(),
            vec![Some(true), Some(false), None]
        );
        let or = col("x").gt(10).or((col("x") * i64::MAX).gt(0));
        assert_eq!(
            eval_predicate(&or, &scope, &rows).unwrap(),
            vec![Some(true), Some(true), None]
        );
        // Without a deciding left operand the overflow surfaces.
        assert!(matches!(
            eval_predicate(&(col("x") * i64::MAX).gt(0), &scope, &rows),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn nan_comparisons_are_unknown() {
        let ds = data();
        let rows = all_rows(&ds);
        let scope = Scope::new(&ds, &rows);
        let hits = eval_predicate(&col("salary").ge(0.0), &scope, &rows).unwrap();
        assert_eq!(hits[3], None);
    }

    #[test]
    fn membership() {
        let ds = data();
        let rows = all_rows(&ds);
        let scope = Scope::new(&ds, &rows);
        let hits = eval_predicate(&col("age").is_in([25_i64, 30]), &scope, &rows).unwrap();
        assert_eq!(hits, vec![Some(true), None, Some(false), Some(true)]);
        let with_missing = col("age").is_in([Value::Missing]);
        assert_eq!(
            eval_predicate(&with_missing, &scope, &rows).unwrap()[1],
            Some(true)
        );
    }

    #[test]
    fn aggregates_see_the_whole_scope() {
        let ds = data();
        let rows = all_rows(&ds);
        let scope = Scope::new(&ds, &rows);
        assert_eq!(aggregate(&crate::expr::Aggregate::Count, &scope).unwrap(), Value::Integer(4));
        assert_eq!(eval_scalar(&sum(col("age")), &scope).unwrap(), Value::Integer(96));
        assert_eq!(eval_scalar(&n_distinct(col("dept")), &scope).unwrap(), Value::Integer(2));
        assert_eq!(
            eval_scalar(&(n() * lit(2)), &scope).unwrap(),
            Value::Integer(8)
        );
        // A narrowed active set still reads aggregates over the scope.
        let vals = eval(&(col("age") - mean(col("age"))), &scope, &[2]).unwrap();
        assert_eq!(vals, vec![Value::Numeric(9.0)]);
    }

    #[test]
    fn windows_follow_scope_order() {
        let ds = data();
        let rows = all_rows(&ds);
        let scope = Scope::new(&ds, &rows);
        assert_eq!(
            eval(&rank(col("age")), &scope, &rows).unwrap(),
            vec![
                Value::Numeric(2.0),
                Value::Missing,
                Value::Numeric(3.0),
                Value::Numeric(1.0)
            ]
        );
        assert_eq!(
            eval(&cumsum(col("age")), &scope, &[0, 3]).unwrap(),
            vec![Value::Integer(30), Value::Missing]
        );
        assert_eq!(
            eval(&row_number(), &scope, &[3]).unwrap(),
            vec![Value::Integer(4)]
        );
    }
}
