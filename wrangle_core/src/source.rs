// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam where datasets enter the engine.

use crate::dataset::Dataset;
use crate::error::Result;

/// Supplies an initial dataset.
///
/// Loading is the only blocking boundary in the engine and is modeled as one synchronous
/// call. Implementations report unreachable inputs with
/// [`Error::SourceUnavailable`](crate::Error::SourceUnavailable) and malformed ones with
/// [`Error::SchemaMismatch`](crate::Error::SchemaMismatch). Retrying, if any, is up to the
/// implementation.
pub trait DataSource {
    /// Loads the dataset.
    fn load(&self) -> Result<Dataset>;
}

/// A source backed by a dataset already in memory.
///
/// Every load returns a clone that shares the column storage.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    dataset: Dataset,
}

impl InMemorySource {
    /// Wraps a dataset.
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }
}

impl DataSource for InMemorySource {
    fn load(&self) -> Result<Dataset> {
        tracing::debug!(
            rows = self.dataset.row_count(),
            columns = self.dataset.column_count(),
            "loaded in-memory dataset"
        );
        Ok(self.dataset.clone())
    }
}

impl<F> DataSource for F
where
    F: Fn() -> Result<Dataset>,
{
    fn load(&self) -> Result<Dataset> {
        self()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::sync::Arc;

    use super::*;
    use crate::Error;

    #[test]
    fn in_memory_loads_share_columns() {
        let ds = Dataset::builder().numeric("x", [1.0, 2.0]).build().unwrap();
        let source = InMemorySource::new(ds);
        let a = source.load().unwrap();
        let b = source.load().unwrap();
        assert!(Arc::ptr_eq(&a.columns()[0], &b.columns()[0]));
    }

    #[test]
    fn closures_are_sources() {
        let failing = || -> Result<Dataset> { Err(Error::SourceUnavailable("offline".into())) };
        assert_eq!(
            failing.load().unwrap_err(),
            Error::SourceUnavailable("offline".into())
        );
    }
}
