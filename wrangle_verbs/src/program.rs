// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pipelines as data: a list of verbs built up front and executed later.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use wrangle_core::{DataSource, Dataset, Error};

use crate::arrange::SortKey;
use crate::bin::BinSpec;
use crate::expr::{Expr, Predicate};
use crate::group::CountOptions;
use crate::select::Selector;

/// One step of a [`Pipeline`]. Each variant carries the arguments of the verb function of the
/// same name.
#[derive(Debug, Clone, PartialEq)]
pub enum Verb {
    /// [`filter`](crate::filter())
    Filter(Vec<Predicate>),
    /// [`select`](crate::select())
    Select(Vec<Selector>),
    /// [`rename`](crate::rename())
    Rename(Vec<(String, String)>),
    /// [`arrange`](crate::arrange())
    Arrange(Vec<SortKey>),
    /// [`group_by`](crate::group_by())
    GroupBy(Vec<String>),
    /// [`ungroup`](crate::ungroup())
    Ungroup,
    /// [`count`](crate::count())
    Count {
        /// Columns to count by.
        columns: Vec<String>,
        /// Sorting and naming options.
        options: CountOptions,
    },
    /// [`summarise`](crate::summarise())
    Summarise(Vec<(String, Expr)>),
    /// [`mutate`](crate::mutate())
    Mutate(Vec<(String, Expr)>),
    /// [`slice`](crate::slice())
    Slice(Vec<usize>),
    /// [`top_n`](crate::top_n())
    TopN {
        /// Rows to keep per group (before ties).
        k: usize,
        /// Ranking column.
        column: String,
    },
    /// [`bin`](crate::bin())
    Bin {
        /// Numeric input column.
        column: String,
        /// Break placement.
        spec: BinSpec,
        /// Output column.
        output: String,
    },
}

impl Verb {
    /// The verb's function name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Filter(_) => "filter",
            Self::Select(_) => "select",
            Self::Rename(_) => "rename",
            Self::Arrange(_) => "arrange",
            Self::GroupBy(_) => "group_by",
            Self::Ungroup => "ungroup",
            Self::Count { .. } => "count",
            Self::Summarise(_) => "summarise",
            Self::Mutate(_) => "mutate",
            Self::Slice(_) => "slice",
            Self::TopN { .. } => "top_n",
            Self::Bin { .. } => "bin",
        }
    }

    /// Applies the verb to `data`.
    pub fn apply(&self, data: &Dataset) -> Result<Dataset, Error> {
        match self {
            Self::Filter(ps) => crate::filter::filter(data, ps.iter().cloned()),
            Self::Select(sels) => crate::select::select(data, sels.iter().cloned()),
            Self::Rename(pairs) => {
                crate::select::rename(data, pairs.iter().map(|(a, b)| (a, b.clone())))
            }
            Self::Arrange(keys) => crate::arrange::arrange(data, keys.iter().cloned()),
            Self::GroupBy(keys) => crate::group::group_by(data, keys),
            Self::Ungroup => Ok(crate::group::ungroup(data)),
            Self::Count { columns, options } => crate::group::count(data, columns, options),
            Self::Summarise(pairs) => crate::summarise::summarise(data, pairs.iter().cloned()),
            Self::Mutate(pairs) => crate::mutate::mutate(data, pairs.iter().cloned()),
            Self::Slice(positions) => crate::rank::slice(data, positions.iter().copied()),
            Self::TopN { k, column } => crate::rank::top_n(data, *k, column),
            Self::Bin {
                column,
                spec,
                output,
            } => crate::bin::bin(data, column, spec, output),
        }
    }
}

/// A pipeline step failed.
///
/// Steps are numbered from 1 in [`Pipeline::verbs`] order; step 0 is the data source load in
/// [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("step {step} ({verb}) failed: {source}")]
pub struct PipelineError {
    /// 1-based step number, or 0 for the load.
    pub step: usize,
    /// Name of the failing verb.
    pub verb: &'static str,
    /// The underlying error.
    #[source]
    pub source: Error,
}

/// A sequence of verbs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Pipeline {
    verbs: Vec<Verb>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self { verbs: Vec::new() }
    }

    /// Adds a verb to the end of the pipeline.
    pub fn push(&mut self, verb: Verb) {
        self.verbs.push(verb);
    }

    /// Builder form of [`Pipeline::push`].
    pub fn then(mut self, verb: Verb) -> Self {
        self.push(verb);
        self
    }

    /// Returns the verb list.
    pub fn verbs(&self) -> &[Verb] {
        &self.verbs
    }

    /// Executes the verbs in order, each on the previous step's output.
    ///
    /// The first failing step stops execution; no partial result is returned. An empty
    /// pipeline returns its input unchanged.
    #[tracing::instrument(level = "debug", skip_all, fields(steps = self.verbs.len()))]
    pub fn execute(&self, input: &Dataset) -> Result<Dataset, PipelineError> {
        let mut data = input.clone();
        for (i, verb) in self.verbs.iter().enumerate() {
            let step = i + 1;
            data = verb.apply(&data).map_err(|source| {
                tracing::debug!(step, verb = verb.name(), error = %source, "pipeline step failed");
                PipelineError {
                    step,
                    verb: verb.name(),
                    source,
                }
            })?;
            tracing::trace!(
                step,
                verb = verb.name(),
                rows = data.row_count(),
                columns = data.column_count(),
                "pipeline step"
            );
        }
        Ok(data)
    }

    /// Loads from `source` and executes the pipeline on the result.
    pub fn run(&self, source: &dyn DataSource) -> Result<Dataset, PipelineError> {
        let data = source.load().map_err(|source| PipelineError {
            step: 0,
            verb: "load",
            source,
        })?;
        self.execute(&data)
    }
}
