// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed column store and datasets for `wrangle`.
//!
//! This crate provides:
//! - a closed cell type ([`Value`]) and per-column type tags ([`DataType`]),
//! - typed columnar storage ([`ColumnData`], [`Categorical`]) behind an immutable
//!   [`Dataset`] that carries its own grouping keys, and
//! - the numeric summary library ([`stats`]) used by aggregation and binning.
//!
//! Datasets share their columns through `Arc`, so operators that leave a column unchanged
//! never copy it, and an input dataset is never modified by an operator.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod column;
mod dataset;
mod error;
#[cfg(not(feature = "std"))]
mod float;
mod source;
pub mod stats;
mod value;

pub use column::{Categorical, Column, ColumnData};
pub use dataset::{Dataset, DatasetBuilder};
pub use error::{Error, Result};
pub use source::{DataSource, InMemorySource};
pub use value::{DataType, Value};

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("wrangle_core requires either the `std` or `libm` feature for floating-point math");
