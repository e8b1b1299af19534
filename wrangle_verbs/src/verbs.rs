// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Method-call chaining.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use wrangle_core::{Dataset, Result};

use crate::arrange::SortKey;
use crate::bin::BinSpec;
use crate::expr::{Expr, Predicate};
use crate::group::{CountOptions, Group};
use crate::select::Selector;

/// Every verb as a method on [`Dataset`], so pipelines read left to right:
///
/// ```
/// use wrangle_core::Dataset;
/// use wrangle_verbs::{Verbs, col, desc, mean};
///
/// let staff = Dataset::builder()
///     .categorical("dept", ["Sales", "Eng", "Sales"])
///     .numeric("salary", [50.0, 80.0, 70.0])
///     .build()?;
/// let by_dept = staff
///     .filter([col("salary").gt(55.0)])?
///     .group_by(["dept"])?
///     .summarise([("avg", mean(col("salary")))])?
///     .arrange([desc("avg")])?;
/// assert_eq!(by_dept.row_count(), 2);
/// # Ok::<(), wrangle_core::Error>(())
/// ```
pub trait Verbs {
    /// See [`filter`](crate::filter()).
    fn filter<I>(&self, predicates: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = Predicate>;

    /// See [`select`](crate::select()).
    fn select<I, S>(&self, selectors: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>;

    /// See [`rename`](crate::rename()).
    fn rename<I, A, B>(&self, pairs: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: Into<String>;

    /// See [`arrange`](crate::arrange()).
    fn arrange<I, K>(&self, keys: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = K>,
        K: Into<SortKey>;

    /// See [`group_by`](crate::group_by()).
    fn group_by<I, S>(&self, columns: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>;

    /// See [`ungroup`](crate::ungroup()).
    fn ungroup(&self) -> Dataset;

    /// See [`count`](crate::count()).
    fn count<I, S>(&self, columns: I, options: &CountOptions) -> Result<Dataset>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>;

    /// See [`summarise`](crate::summarise()).
    fn summarise<I, N>(&self, summaries: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = (N, Expr)>,
        N: Into<String>;

    /// See [`mutate`](crate::mutate()).
    fn mutate<I, N>(&self, columns: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = (N, Expr)>,
        N: Into<String>;

    /// See [`slice`](crate::slice()).
    fn slice<I>(&self, positions: I) -> Result<Dataset>
    where
        I: IntoIterator<Item = usize>;

    /// See [`top_n`](crate::top_n()).
    fn top_n(&self, k: usize, column: &str) -> Result<Dataset>;

    /// See [`bin`](crate::bin()).
    fn bin(&self, column: &str, spec: &BinSpec, output: &str) -> Result<Dataset>;

    /// See [`groups`](crate::groups()).
    fn groups(&self) -> Result<Vec<Group>>;
}

impl Verbs for Dataset {
    fn filter<I>(&self, predicates: I) -> Result<Self>
    where
        I: IntoIterator<Item = Predicate>,
    {
        crate::filter::filter(self, predicates)
    }

    fn select<I, S>(&self, selectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Selector>,
    {
        crate::select::select(self, selectors)
    }

    fn rename<I, A, B>(&self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: Into<String>,
    {
        crate::select::rename(self, pairs)
    }

    fn arrange<I, K>(&self, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<SortKey>,
    {
        crate::arrange::arrange(self, keys)
    }

    fn group_by<I, S>(&self, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        crate::group::group_by(self, columns)
    }

    fn ungroup(&self) -> Self {
        crate::group::ungroup(self)
    }

    fn count<I, S>(&self, columns: I, options: &CountOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        crate::group::count(self, columns, options)
    }

    fn summarise<I, N>(&self, summaries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, Expr)>,
        N: Into<String>,
    {
        crate::summarise::summarise(self, summaries)
    }

    fn mutate<I, N>(&self, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, Expr)>,
        N: Into<String>,
    {
        crate::mutate::mutate(self, columns)
    }

    fn slice<I>(&self, positions: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        crate::rank::slice(self, positions)
    }

    fn top_n(&self, k: usize, column: &str) -> Result<Self> {
        crate::rank::top_n(self, k, column)
    }

    fn bin(&self, column: &str, spec: &BinSpec, output: &str) -> Result<Self> {
        crate::bin::bin(self, column, spec, output)
    }

    fn groups(&self) -> Result<Vec<Group>> {
        crate::group::groups(self)
    }
}

/// Feeds a value as the first argument of a function.
///
/// `x.pipe(f)` is `f(x)`. This threads any step, including user functions, into a chain:
/// `data.pipe(|d| top_n(&d, 3, "salary"))?`.
pub trait Pipe: Sized {
    /// Applies `f` to `self`.
    fn pipe<R>(self, f: impl FnOnce(Self) -> R) -> R {
        f(self)
    }
}

impl<T> Pipe for T {}

#[cfg(test)]
mod tests {
    extern crate std;

    use wrangle_core::Value;

    use super::*;
    use crate::expr::{col, n};
    use crate::rank::top_n;

    #[test]
    fn chains_match_free_functions() {
        let ds = Dataset::builder()
            .categorical("dept", ["Sales", "Eng", "Sales", "Eng", "Sales"])
            .numeric("salary", [50.0, 80.0, 60.0, 90.0, 70.0])
            .build()
            .unwrap();
        let chained = ds
            .group_by(["dept"])
            .and_then(|d| d.summarise([("n", n())]))
            .unwrap();
        let direct = crate::summarise::summarise(
            &crate::group::group_by(&ds, ["dept"]).unwrap(),
            [("n", n())],
        )
        .unwrap();
        assert_eq!(chained, direct);

        let best = ds
            .filter([col("salary").gt(55.0)])
            .unwrap()
            .pipe(|d| top_n(&d, 1, "salary"))
            .unwrap();
        assert_eq!(best.value(0, "salary").unwrap(), Value::Numeric(90.0));
    }
}
