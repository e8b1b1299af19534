// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sequential guarded values.

extern crate alloc;

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use wrangle_core::{DataType, Dataset, Error, Result, Value};

use crate::eval::{self, Scope};
use crate::expr::{Expr, Predicate};

/// An ordered list of `(guard, value)` branches.
///
/// For each row the value of the first branch whose guard holds is used. Rows that match no
/// guard are [`Value::Missing`]; end with [`CaseWhen::otherwise`] to supply a fallback.
/// A branch value is only evaluated on the rows its guard selected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaseWhen {
    /// Branches in evaluation order.
    pub branches: Vec<(Predicate, Expr)>,
}

impl CaseWhen {
    /// Creates an empty case expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a guarded branch.
    pub fn when(mut self, guard: Predicate, value: impl Into<Expr>) -> Self {
        self.branches.push((guard, value.into()));
        self
    }

    /// Appends an always-true fallback branch.
    pub fn otherwise(self, value: impl Into<Expr>) -> Self {
        self.when(Predicate::Always, value)
    }
}

/// Builds a case expression from `(guard, value)` pairs.
pub fn case_when<I, V>(branches: I) -> Expr
where
    I: IntoIterator<Item = (Predicate, V)>,
    V: Into<Expr>,
{
    Expr::Case(CaseWhen {
        branches: branches.into_iter().map(|(p, v)| (p, v.into())).collect(),
    })
}

/// Result type shared by every branch value.
pub(crate) fn infer(case: &CaseWhen, data: &Dataset) -> Result<Option<DataType>> {
    let mut ty: Option<DataType> = None;
    for (guard, value) in &case.branches {
        eval::check_predicate(guard, data)?;
        let Some(branch) = eval::infer(value, data)? else {
            continue;
        };
        ty = match ty {
            None => Some(branch),
            Some(prev) => Some(prev.common_supertype(branch).ok_or_else(|| {
                Error::TypeMismatch(format!("case branches mix {prev} and {branch} values"))
            })?),
        };
    }
    Ok(ty)
}

pub(crate) fn eval(case: &CaseWhen, scope: &Scope<'_>, active: &[usize]) -> Result<Vec<Value>> {
    let mut out = vec![Value::Missing; active.len()];
    // Positions into `active` not yet claimed by an earlier branch.
    let mut pending: Vec<usize> = (0..active.len()).collect();

    for (guard, value) in &case.branches {
        if pending.is_empty() {
            break;
        }
        let rows: Vec<usize> = pending.iter().map(|&i| active[i]).collect();
        let hits = eval::eval_predicate(guard, scope, &rows)?;

        let mut matched = Vec::new();
        let mut rest = Vec::new();
        for (&pos, hit) in pending.iter().zip(hits) {
            if hit == Some(true) {
                matched.push(pos);
            } else {
                rest.push(pos);
            }
        }
        if !matched.is_empty() {
            let matched_rows: Vec<usize> = matched.iter().map(|&i| active[i]).collect();
            let values = eval::eval(value, scope, &matched_rows)?;
            for (pos, v) in matched.into_iter().zip(values) {
                out[pos] = v;
            }
        }
        pending = rest;
    }
    Ok(out)
}
