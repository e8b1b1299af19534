// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by the column store and every verb.

extern crate alloc;

use alloc::string::String;

/// Errors raised at the operator boundary that detects them.
///
/// Operators never return partial results: they either produce a complete [`Dataset`]
/// or fail with exactly one of these.
///
/// [`Dataset`]: crate::Dataset
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A referenced column name (or position) does not exist.
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
    /// A value or column has the wrong type for the requested operation.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// A predicate references an unknown column or compares incompatible types.
    #[error("invalid predicate: {0}")]
    InvalidPredicate(String),
    /// A selection mixes inclusion and exclusion selectors.
    #[error("cannot mix inclusion and exclusion selectors")]
    ConflictingSelectors,
    /// A summary function received an empty vector.
    #[error("empty input")]
    EmptyInput,
    /// A summary function received fewer values than it needs.
    #[error("insufficient data: needed at least {needed} values, found {found}")]
    InsufficientData {
        /// Minimum number of values required.
        needed: usize,
        /// Number of values available.
        found: usize,
    },
    /// A binning request has a non-positive count or width.
    #[error("invalid bin spec: {0}")]
    InvalidBinSpec(String),
    /// An argument is outside its domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A data source could not be reached or read.
    #[error("data source unavailable: {0}")]
    SourceUnavailable(String),
    /// Loaded or constructed data does not form a valid rectangular dataset.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
}

/// Result alias used across `wrangle`.
pub type Result<T, E = Error> = core::result::Result<T, E>;
