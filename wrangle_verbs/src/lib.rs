// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composable verbs over [`wrangle_core::Dataset`].
//!
//! This crate provides:
//! - an expression and predicate IR ([`Expr`], [`Predicate`], [`CaseWhen`]) with aggregate and
//!   window functions that evaluate per group,
//! - the verbs themselves (`filter`, `select`, `arrange`, `group_by`, `count`, `summarise`,
//!   `mutate`, `slice`, `top_n`, `bin`, ...), each a pure function from a dataset to a new
//!   dataset, and
//! - two ways to chain them: the [`Verbs`] extension trait for method chains, and the
//!   [`Pipeline`] IR for building a list of steps up front and executing it later.
//!
//! Grouping is carried by the dataset itself. Verbs that respect groups (filter predicates
//! with aggregates, `mutate`, `summarise`, `slice`, `top_n`) partition rows by the grouping
//! keys in order of first appearance.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod arrange;
mod bin;
mod case;
mod eval;
mod expr;
mod filter;
#[cfg(not(feature = "std"))]
mod float;
mod group;
mod mutate;
mod program;
mod rank;
mod select;
mod summarise;
mod verbs;


pub use arrange::{SortKey, SortOrder, arrange, asc, desc};
pub use bin::{BinSpec, bin, cut, cut_interval, cut_number, cut_width};
pub use case::{CaseWhen, case_when};
pub use expr::{
    Aggregate, ArithOp, CompareOp, Expr, Predicate, Window, all_of, always, any_of, col, cumsum,
    lit, max, mean, median, min, missing, n, n_distinct, quantile, rank, row_number, sd, sum,
};
pub use filter::filter;
pub use group::{CountOptions, Group, count, group_by, groups, n_groups, ungroup};
pub use mutate::mutate;
pub use program::{Pipeline, PipelineError, Verb};
pub use rank::{slice, top_n};
pub use select::{Selector, contains, ends_with, exclude, range, rename, select, starts_with};
pub use summarise::summarise;
pub use verbs::{Pipe, Verbs};

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("wrangle_verbs requires either the `std` or `libm` feature for floating-point math");
