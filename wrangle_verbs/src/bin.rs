// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Discretizing numeric columns into ordered interval categories.
//!
//! Equal-range and equal-frequency intervals are right-closed, `(lo,hi]`, so a value on a break
//! falls in the lower interval. The first of them is closed on both ends, `[lo,hi]`, so the
//! minimum is included. Fixed-width intervals are left-closed, `[lo,hi)`. Levels are ordered by
//! lower bound and labeled with bounds rounded to six decimals.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashSet;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use wrangle_core::{Categorical, Column, ColumnData, Dataset, Error, Result, stats};

/// Upper bound on the number of intervals any cut may produce.
const MAX_BINS: usize = 100_000;

/// How to place interval breaks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinSpec {
    /// `n` intervals of equal width spanning `[min, max]`.
    Interval {
        /// Number of intervals.
        n: usize,
    },
    /// `n` intervals holding roughly equal counts, with breaks at quantiles `0, 1/n, ..., 1`.
    ///
    /// Repeated values can make breaks coincide; coinciding breaks collapse into one, so
    /// fewer than `n` intervals may result.
    Number {
        /// Number of intervals.
        n: usize,
    },
    /// Intervals `[b + k·width, b + (k+1)·width)` covering the data.
    Width {
        /// Interval width.
        width: f64,
        /// Anchor `b`; defaults to `width / 2`.
        boundary: Option<f64>,
    },
}

/// Which end of each interval holds the break value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closed {
    /// `[lo,hi)`.
    Left,
    /// `(lo,hi]`, with the first interval `[lo,hi]`.
    Right,
}

/// Intervals as ascending breaks; `breaks.len() - 1` intervals.
struct Breaks {
    breaks: Vec<f64>,
    closed: Closed,
}

fn present(values: &[Option<f64>]) -> Result<Vec<f64>> {
    let xs: Vec<f64> = values.iter().flatten().copied().filter(|x| !x.is_nan()).collect();
    if xs.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(xs)
}

fn check_count(n: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::InvalidBinSpec("bin count must be at least 1".into()));
    }
    if n > MAX_BINS {
        return Err(Error::InvalidBinSpec(format!(
            "bin count {n} is more than {MAX_BINS}"
        )));
    }
    Ok(())
}

fn equal_range(xs: &[f64], n: usize) -> Result<Breaks> {
    let (lo, hi) = (stats::min(xs)?, stats::max(xs)?);
    let step = (hi - lo) / n as f64;
    let mut breaks: Vec<f64> = (0..n).map(|i| lo + i as f64 * step).collect();
    breaks.push(hi);
    breaks.dedup();
    Ok(Breaks {
        breaks,
        closed: Closed::Right,
    })
}

fn equal_frequency(xs: &[f64], n: usize) -> Result<Breaks> {
    let ps: Vec<f64> = (0..=n).map(|i| i as f64 / n as f64).collect();
    let mut breaks = stats::quantiles(xs, &ps)?;
    breaks.dedup();
    Ok(Breaks {
        breaks,
        closed: Closed::Right,
    })
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the span is checked against MAX_BINS before the cast"
)]
fn fixed_width(xs: &[f64], width: f64, boundary: Option<f64>) -> Result<Breaks> {
    if !width.is_finite() || width <= 0.0 {
        return Err(Error::InvalidBinSpec(format!(
            "width must be positive and finite, got {width}"
        )));
    }
    let anchor = boundary.unwrap_or(width / 2.0);
    if !anchor.is_finite() {
        return Err(Error::InvalidBinSpec(format!(
            "boundary must be finite, got {anchor}"
        )));
    }
    let (lo, hi) = (stats::min(xs)?, stats::max(xs)?);
    let first = ((lo - anchor) / width).floor();
    let last = ((hi - anchor) / width).floor();
    let span = last - first + 1.0;
    if !span.is_finite() || span > MAX_BINS as f64 {
        return Err(Error::InvalidBinSpec(format!(
            "width {width} yields more than {MAX_BINS} intervals"
        )));
    }
    let breaks = (0..=span as usize)
        .map(|k| anchor + (first + k as f64) * width)
        .collect();
    Ok(Breaks {
        breaks,
        closed: Closed::Left,
    })
}

fn bound(x: f64) -> f64 {
    // `+ 0.0` folds -0 into 0.
    (x * 1.0e6).round() / 1.0e6 + 0.0
}

fn assign(values: &[Option<f64>], b: &Breaks) -> Result<Categorical> {
    let breaks = &b.breaks;
    if breaks.len() < 2 {
        // Every present value is equal.
        let v = bound(breaks.first().copied().unwrap_or_default());
        let levels = vec![format!("[{v},{v}]")];
        let codes = values
            .iter()
            .map(|x| x.filter(|x| !x.is_nan()).map(|_| 0))
            .collect();
        return Categorical::from_codes(levels, codes, true);
    }

    let bins = breaks.len() - 1;
    let mut levels: Vec<String> = Vec::with_capacity(bins);
    let mut seen: HashSet<String> = HashSet::with_capacity(bins);
    for (i, w) in breaks.windows(2).enumerate() {
        let (lo, hi) = (bound(w[0]), bound(w[1]));
        let label = match b.closed {
            Closed::Left => format!("[{lo},{hi})"),
            Closed::Right if i == 0 => format!("[{lo},{hi}]"),
            Closed::Right => format!("({lo},{hi}]"),
        };
        if !seen.insert(label.clone()) {
            return Err(Error::InvalidBinSpec(format!(
                "intervals too narrow to label distinctly ({label})"
            )));
        }
        levels.push(label);
    }

    let codes = values
        .iter()
        .map(|x| {
            let x = x.filter(|x| !x.is_nan())?;
            if x < breaks[0] {
                return None;
            }
            let i = match b.closed {
                Closed::Left => breaks.partition_point(|&edge| edge <= x).checked_sub(1)?,
                Closed::Right => breaks.partition_point(|&edge| edge < x).saturating_sub(1),
            };
            (i < bins).then(|| u32::try_from(i).ok()).flatten()
        })
        .collect();
    Categorical::from_codes(levels, codes, true)
}

/// Cuts values into intervals per `spec`.
///
/// Missing and NaN values stay missing. Fails with [`Error::EmptyInput`] when no value is
/// present and with [`Error::InvalidBinSpec`] for a zero or oversized count or a bad width or
/// boundary.
pub fn cut(values: &[Option<f64>], spec: &BinSpec) -> Result<Categorical> {
    let breaks = match *spec {
        BinSpec::Interval { n } => {
            check_count(n)?;
            equal_range(&present(values)?, n)?
        }
        BinSpec::Number { n } => {
            check_count(n)?;
            equal_frequency(&present(values)?, n)?
        }
        BinSpec::Width { width, boundary } => fixed_width(&present(values)?, width, boundary)?,
    };
    tracing::trace!(breaks = ?breaks.breaks, closed = ?breaks.closed, "cut");
    assign(values, &breaks)
}

/// `n` equal-width intervals over the data range.
pub fn cut_interval(values: &[Option<f64>], n: usize) -> Result<Categorical> {
    cut(values, &BinSpec::Interval { n })
}

/// `n` intervals with roughly equal counts.
pub fn cut_number(values: &[Option<f64>], n: usize) -> Result<Categorical> {
    cut(values, &BinSpec::Number { n })
}

/// Fixed-width intervals anchored at `boundary` (`width / 2` when `None`).
pub fn cut_width(
    values: &[Option<f64>],
    width: f64,
    boundary: impl Into<Option<f64>>,
) -> Result<Categorical> {
    cut(
        values,
        &BinSpec::Width {
            width,
            boundary: boundary.into(),
        },
    )
}

/// Bins `column` into an ordered categorical column named `output`.
///
/// The new column replaces a column of the same name in place or is appended. Row order and
/// grouping are unchanged; binning always spans the whole column, not each group.
///
/// Fails with [`Error::TypeMismatch`] for a non-numeric column and with
/// [`Error::InvalidArgument`] if `output` is a grouping column.
pub fn bin(data: &Dataset, column: &str, spec: &BinSpec, output: &str) -> Result<Dataset> {
    let col = data.column(column)?;
    if !col.data_type().is_numeric() {
        return Err(Error::TypeMismatch(format!(
            "cannot bin {} column `{column}`",
            col.data_type()
        )));
    }
    if data.group_keys().iter().any(|k| k == output) {
        return Err(Error::InvalidArgument(format!(
            "cannot overwrite grouping column `{output}`"
        )));
    }
    let values: Vec<Option<f64>> = (0..data.row_count())
        .map(|r| col.data.value(r).as_f64())
        .collect();
    let binned = cut(&values, spec)?;
    tracing::debug!(
        column,
        output,
        levels = binned.levels().len(),
        rows = data.row_count(),
        "bin"
    );
    data.with_column(Column::new(output, ColumnData::Categorical(binned)))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use wrangle_core::Value;

    use super::*;

    fn some(xs: &[f64]) -> Vec<Option<f64>> {
        xs.iter().copied().map(Some).collect()
    }

    fn labels(c: &Categorical) -> Vec<Option<&str>> {
        (0..c.len()).map(|r| c.label(r)).collect()
    }

    #[test]
    fn width_with_zero_boundary() {
        let c = cut_width(&some(&[3.0, 12.0, 27.0]), 10.0, 0.0).unwrap();
        assert_eq!(c.levels(), ["[0,10)", "[10,20)", "[20,30)"]);
        assert_eq!(labels(&c), [Some("[0,10)"), Some("[10,20)"), Some("[20,30)")]);
        assert!(c.is_ordered());
    }

    #[test]
    fn width_default_boundary_is_half_width() {
        let c = cut_width(&some(&[3.0, 12.0, 27.0]), 10.0, None).unwrap();
        assert_eq!(c.levels(), ["[-5,5)", "[5,15)", "[15,25)", "[25,35)"]);
        // Empty intervals between data points are kept as levels.
        assert_eq!(labels(&c)[2], Some("[25,35)"));
    }

    #[test]
    fn equal_range_puts_breaks_in_the_lower_interval() {
        let c = cut_interval(&[Some(0.0), Some(5.0), None, Some(10.0)], 2).unwrap();
        assert_eq!(c.levels(), ["[0,5]", "(5,10]"]);
        assert_eq!(labels(&c), [Some("[0,5]"), Some("[0,5]"), None, Some("(5,10]")]);

        let c = cut_interval(&some(&[0.0, 2.5, 5.0, 7.5, 10.0]), 4).unwrap();
        assert_eq!(c.levels(), ["[0,2.5]", "(2.5,5]", "(5,7.5]", "(7.5,10]"]);
        assert_eq!(c.level_counts(), vec![2, 1, 1, 1]);
    }

    #[test]
    fn equal_frequency_balances_counts() {
        let xs: Vec<f64> = (1..=8).map(f64::from).collect();
        let c = cut_number(&some(&xs), 4).unwrap();
        assert_eq!(c.level_counts(), vec![2, 2, 2, 2]);
        assert_eq!(c.levels()[0], "[1,2.75]");
        assert_eq!(c.levels()[3], "(6.25,8]");
    }

    #[test]
    fn tied_breaks_collapse() {
        let c = cut_number(&some(&[1.0, 1.0, 1.0, 1.0, 2.0]), 4).unwrap();
        assert_eq!(c.levels(), ["[1,2]"]);
        assert_eq!(c.level_counts(), vec![5]);
    }

    #[test]
    fn degenerate_range_is_one_level() {
        let c = cut_interval(&some(&[4.0, 4.0]), 3).unwrap();
        assert_eq!(c.levels(), ["[4,4]"]);
        assert_eq!(c.level_counts(), vec![2]);
    }

    #[test]
    fn invalid_specs() {
        let xs = some(&[1.0, 2.0]);
        assert!(matches!(cut_interval(&xs, 0), Err(Error::InvalidBinSpec(_))));
        assert!(matches!(cut_width(&xs, 0.0, None), Err(Error::InvalidBinSpec(_))));
        assert!(matches!(cut_width(&xs, f64::NAN, None), Err(Error::InvalidBinSpec(_))));
        assert!(matches!(
            cut_width(&xs, 1.0, f64::INFINITY),
            Err(Error::InvalidBinSpec(_))
        ));
        assert!(matches!(cut_width(&xs, 1.0e-9, None), Err(Error::InvalidBinSpec(_))));
        assert_eq!(cut_number(&[None, Some(f64::NAN)], 2).unwrap_err(), Error::EmptyInput);
    }

    #[test]
    fn oversized_counts_are_rejected() {
        let xs = some(&[0.0, 1.0]);
        assert!(matches!(cut_interval(&xs, usize::MAX), Err(Error::InvalidBinSpec(_))));
        assert!(matches!(cut_number(&xs, usize::MAX), Err(Error::InvalidBinSpec(_))));
        assert!(matches!(
            cut_interval(&xs, MAX_BINS + 1),
            Err(Error::InvalidBinSpec(_))
        ));
    }

    #[test]
    fn many_fixed_width_intervals() {
        let c = cut_width(&some(&[0.0, 59_999.5]), 1.0, 0.0).unwrap();
        assert_eq!(c.levels().len(), 60_000);
        assert_eq!(c.levels()[59_999], "[59999,60000)");
    }

    #[test]
    fn bin_adds_an_ordered_column() {
        let ds = Dataset::builder()
            .text("name", ["a", "b", "c"])
            .integer("age", [Some(23_i64), None, Some(47)])
            .build()
            .unwrap();
        let out = bin(&ds, "age", &BinSpec::Width { width: 10.0, boundary: Some(0.0) }, "band")
            .unwrap();
        assert_eq!(out.value(0, "band").unwrap(), Value::from("[20,30)"));
        assert_eq!(out.value(1, "band").unwrap(), Value::Missing);
        assert_eq!(out.value(2, "band").unwrap(), Value::from("[40,50)"));
        assert!(matches!(
            bin(&ds, "name", &BinSpec::Interval { n: 2 }, "x"),
            Err(Error::TypeMismatch(_))
        ));
    }
}
