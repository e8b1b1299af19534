// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numeric summaries over plain `f64` slices.
//!
//! Every function except [`cumsum`] fails with [`Error::EmptyInput`] on an empty slice. Callers
//! extract slices with [`Dataset::numeric`](crate::Dataset::numeric), which skips missing cells.
//!
//! Quantiles use linear interpolation between order statistics: for a sorted copy `s` of the
//! input and `h = p·(n−1)`, the result is `s[⌊h⌋] + (h − ⌊h⌋)·(s[⌈h⌉] − s[⌊h⌋])`.

extern crate alloc;

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::error::{Error, Result};

fn non_empty(values: &[f64]) -> Result<()> {
    if values.is_empty() {
        Err(Error::EmptyInput)
    } else {
        Ok(())
    }
}

/// Smallest value.
pub fn min(values: &[f64]) -> Result<f64> {
    non_empty(values)?;
    Ok(values.iter().copied().fold(f64::INFINITY, f64::min))
}

/// Largest value.
pub fn max(values: &[f64]) -> Result<f64> {
    non_empty(values)?;
    Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Sum of all values.
pub fn sum(values: &[f64]) -> Result<f64> {
    non_empty(values)?;
    Ok(values.iter().sum())
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Result<f64> {
    Ok(sum(values)? / values.len() as f64)
}

/// Sample variance (divides by `n − 1`).
pub fn variance(values: &[f64]) -> Result<f64> {
    non_empty(values)?;
    if values.len() < 2 {
        return Err(Error::InsufficientData {
            needed: 2,
            found: values.len(),
        });
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Ok(ss / (values.len() - 1) as f64)
}

/// Sample standard deviation (divides by `n − 1`).
pub fn sd(values: &[f64]) -> Result<f64> {
    variance(values).map(f64::sqrt)
}

/// Running total: element `i` is the sum of elements `0..=i`.
pub fn cumsum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, &v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

/// Number of distinct values (`-0.0` equals `0.0`; all NaNs are one value).
pub fn count_distinct(values: &[f64]) -> Result<usize> {
    non_empty(values)?;
    let mut sorted = sorted_copy(values);
    sorted.dedup_by(|a, b| a == b || (a.is_nan() && b.is_nan()));
    Ok(sorted.len())
}

/// Linear-interpolation quantile at probability `p ∈ [0, 1]`.
pub fn quantile(values: &[f64], p: f64) -> Result<f64> {
    non_empty(values)?;
    check_probability(p)?;
    Ok(quantile_sorted(&sorted_copy(values), p))
}

/// Quantiles for several probabilities, one result per `p` in input order.
///
/// The input is sorted once.
pub fn quantiles(values: &[f64], ps: &[f64]) -> Result<Vec<f64>> {
    non_empty(values)?;
    for &p in ps {
        check_probability(p)?;
    }
    let sorted = sorted_copy(values);
    Ok(ps.iter().map(|&p| quantile_sorted(&sorted, p)).collect())
}

/// Median (the 0.5 quantile).
pub fn median(values: &[f64]) -> Result<f64> {
    quantile(values, 0.5)
}

/// Minimum, lower quartile, median, upper quartile, maximum.
pub fn fivenum(values: &[f64]) -> Result<[f64; 5]> {
    let q = quantiles(values, &[0.0, 0.25, 0.5, 0.75, 1.0])?;
    Ok([q[0], q[1], q[2], q[3], q[4]])
}

/// Ascending ranks with ties replaced by their average position.
///
/// Ranks are 1-based, so they always sum to `n·(n+1)/2`. Use `rank` of the negated values for
/// descending ranks.
pub fn rank(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start+1 ..= end share their mean.
        let shared = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = shared;
        }
        start = end;
    }
    ranks
}

fn check_probability(p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "quantile probability {p} is outside [0, 1]"
        )))
    }
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "h lies in [0, n-1] so floor/ceil fit in usize"
)]
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let h = p * (sorted.len() - 1) as f64;
    let lo = h.floor();
    let hi = h.ceil();
    let (a, b) = (sorted[lo as usize], sorted[hi as usize]);
    if a == b {
        return a;
    }
    a + (h - lo) * (b - a)
}
