// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keeping rows where every condition holds.

extern crate alloc;

use alloc::vec::Vec;

use wrangle_core::{Dataset, Result};

use crate::eval::{self, Scope};
use crate::expr::Predicate;
use crate::group::partition;

/// Keeps the rows where every predicate definitely holds, in their original order.
///
/// Rows where a predicate is unknown (a comparison against a missing value) are dropped.
/// Aggregates inside a predicate are computed per group on a grouped dataset. The grouping
/// keys are preserved.
///
/// Fails with [`Error::InvalidPredicate`](wrangle_core::Error::InvalidPredicate) before any
/// row is read if a predicate references an unknown column or compares incompatible types.
pub fn filter<I>(data: &Dataset, predicates: I) -> Result<Dataset>
where
    I: IntoIterator<Item = Predicate>,
{
    let predicate = Predicate::And(predicates.into_iter().collect());
    eval::check_predicate(&predicate, data)?;

    let mut keep = Vec::new();
    for group in partition(data, data.group_keys())? {
        let scope = Scope::new(data, &group.rows);
        let hits = eval::eval_predicate(&predicate, &scope, &group.rows)?;
        keep.extend(
            group
                .rows
                .iter()
                .zip(hits)
                .filter_map(|(&row, hit)| (hit == Some(true)).then_some(row)),
        );
    }
    if data.is_grouped() {
        keep.sort_unstable();
    }

    let out = data.take_rows(&keep);
    tracing::debug!(
        rows_in = data.row_count(),
        rows_out = out.row_count(),
        "filter"
    );
    Ok(out)
}
