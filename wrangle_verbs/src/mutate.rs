// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adding and replacing columns computed per row.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use wrangle_core::{Column, ColumnData, DataType, Dataset, Error, Result, Value};

use crate::eval::{self, Scope};
use crate::expr::Expr;
use crate::group::{Group, partition};

/// Adds or replaces columns computed from row expressions.
///
/// Pairs are applied in order, so later expressions see the columns earlier ones produced. A
/// name that already exists is replaced in place; a new name is appended. The row count, row
/// order and grouping are unchanged.
///
/// Aggregates and window functions are evaluated per group and read back for each row of the
/// group. A bare column reference copies the column as is, categorical levels included.
///
/// Overwriting a grouping column fails with [`Error::InvalidArgument`].
pub fn mutate<I, N>(data: &Dataset, columns: I) -> Result<Dataset>
where
    I: IntoIterator<Item = (N, Expr)>,
    N: Into<String>,
{
    let groups = partition(data, data.group_keys())?;
    let mut out = data.clone();
    let mut added = 0_usize;
    for (name, expr) in columns {
        let name = name.into();
        if out.group_keys().contains(&name) {
            return Err(Error::InvalidArgument(format!(
                "cannot overwrite grouping column `{name}`"
            )));
        }
        let cells = match &expr {
            Expr::Column(source) => out.column(source)?.data.clone(),
            expr => compute(&out, &groups, expr)?,
        };
        tracing::trace!(column = %name, ty = %cells.data_type(), "mutate column");
        out = out.with_column(Column::new(name, cells))?;
        added += 1;
    }
    tracing::debug!(rows = out.row_count(), columns = added, "mutate");
    Ok(out)
}

fn compute(data: &Dataset, groups: &[Group], expr: &Expr) -> Result<ColumnData> {
    let ty = eval::infer(expr, data)?;
    let mut values = vec![Value::Missing; data.row_count()];
    for group in groups {
        let scope = Scope::new(data, &group.rows);
        let computed = eval::eval(expr, &scope, &group.rows)?;
        for (&row, value) in group.rows.iter().zip(computed) {
            values[row] = value;
        }
    }
    if ty == Some(DataType::Categorical)
        && let Some((levels, ordered)) = eval::shared_levels(expr, data)
    {
        return ColumnData::from_values_in_levels(levels, ordered, values);
    }
    ColumnData::from_values(ty, values)
}
