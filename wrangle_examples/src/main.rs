// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Narrated `wrangle` pipelines over a small employee table.
//!
//! Run with `--csv <PATH>` to glimpse and summarise your own file instead, and with
//! `--log debug` (or `RUST_LOG`) to watch each verb report its row counts.

mod csv_source;
mod inspect;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wrangle_core::{DataSource, Dataset, InMemorySource};
use wrangle_verbs::{
    BinSpec, CaseWhen, CountOptions, Expr, Pipe, Pipeline, Verb, Verbs, col, cumsum, desc,
    mean, median, n, n_distinct, rank, row_number, sd, starts_with, sum,
};

use crate::csv_source::CsvSource;
use crate::inspect::{glimpse, render, summary};

/// Command line options.
#[derive(Debug, Parser)]
#[command(name = "wrangle-demo", version, about = "Narrated wrangle pipelines")]
struct Args {
    /// Load this CSV file (header row required) instead of the built-in sample.
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Tracing filter, e.g. `debug` or `wrangle_verbs=trace`. `RUST_LOG` wins when set.
    #[arg(long, value_name = "FILTER", default_value = "warn")]
    log: String,

    /// Rows shown per table.
    #[arg(long, value_name = "N", default_value_t = 10)]
    rows: usize,
}

fn employees() -> wrangle_core::Result<Dataset> {
    Dataset::builder()
        .text(
            "name",
            ["Ann", "Bo", "Cy", "Di", "Ed", "Flo", "Gus", "Hal", "Ivy", "Jo"],
        )
        .categorical(
            "department",
            ["Sales", "Eng", "Sales", "Eng", "Ops", "Eng", "Sales", "Ops", "Eng", "Sales"],
        )
        .integer(
            "age",
            [Some(34_i64), Some(45), None, Some(29), Some(51), Some(38), Some(26), Some(44), Some(31), Some(58)],
        )
        .numeric(
            "salary",
            [
                52_000.0, 98_000.0, 61_000.0, 87_000.0, 55_000.0, 104_000.0, 47_000.0, 58_000.0,
                91_000.0, 72_000.0,
            ],
        )
        .numeric(
            "sales_q1",
            [
                Some(12.5_f64), None, Some(9.0), None, None, None, Some(15.25), None, None,
                Some(7.75),
            ],
        )
        .build()
}

fn section(title: &str) {
    println!("\n== {title} ==");
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    if let Some(path) = &args.csv {
        let data = CsvSource::new(path).load()?;
        section(&path.display().to_string());
        print!("{}", glimpse(&data));
        section("summary");
        print!("{}", summary(&data)?);
        return Ok(());
    }

    let source = InMemorySource::new(employees()?);
    let staff = source.load()?;
    section("the data");
    print!("{}", glimpse(&staff));
    section("column summaries");
    print!("{}", summary(&staff)?);

    section("well paid, youngest first");
    let paid = staff
        .filter([col("salary").ge(60_000.0), !col("age").is_missing()])?
        .select(["name", "department", "age", "salary"])?
        .arrange(["age"])?;
    print!("{}", render(&paid, args.rows)?);

    section("headcount per department");
    let heads = staff.count(["department"], &CountOptions::default().sorted())?;
    print!("{}", render(&heads, args.rows)?);

    section("department pay");
    let pay = staff
        .group_by(["department"])?
        .summarise([
            ("n", n()),
            ("mean", mean(col("salary"))),
            ("median", median(col("salary"))),
            ("spread", sd(col("salary"))),
            ("ages", n_distinct(col("age"))),
        ])?
        .arrange([desc("mean")])?;
    print!("{}", render(&pay, args.rows)?);

    section("rank and running total within department");
    let ranked = staff
        .group_by(["department"])?
        .mutate([
            ("pay_rank", rank(-col("salary"))),
            ("payroll", cumsum(col("salary"))),
            ("seat", row_number()),
            ("share", col("salary") / sum(col("salary"))),
        ])?
        .arrange(["department", "pay_rank"])?;
    print!("{}", render(&ranked, args.rows)?);

    section("top earner per department");
    let top = staff.group_by(["department"])?.top_n(1, "salary")?;
    print!("{}", render(&top, args.rows)?);

    section("age bands and pay grades");
    let grade = CaseWhen::new()
        .when(col("salary").ge(90_000.0), "senior")
        .when(col("salary").ge(60_000.0), "mid")
        .otherwise("junior");
    let banded = staff
        .bin("age", &BinSpec::Width { width: 10.0, boundary: Some(0.0) }, "band")?
        .mutate([("grade", Expr::from(grade))])?
        .select(["name", "age", "band", "grade"])?
        .pipe(|d| d.slice(1..=5))?;
    print!("{}", render(&banded, args.rows)?);

    section("the same report as a pipeline");
    let pipeline = Pipeline::new()
        .then(Verb::Filter(vec![col("department").not_equals("Ops")]))
        .then(Verb::Bin {
            column: "salary".into(),
            spec: BinSpec::Number { n: 3 },
            output: "pay_band".into(),
        })
        .then(Verb::Count {
            columns: vec!["department".into(), "pay_band".into()],
            options: CountOptions::default(),
        })
        .then(Verb::Arrange(vec!["department".into(), "pay_band".into()]));
    print!("{}", render(&pipeline.run(&source)?, args.rows)?);

    let broken = pipeline.clone().then(Verb::TopN {
        k: 1,
        column: "bonus".into(),
    });
    if let Err(err) = broken.run(&source) {
        println!("\n{err}");
    }

    section("quarterly columns only");
    let quarters = staff.select([starts_with("sales_")])?;
    print!("{}", render(&quarters, 3)?);

    Ok(())
}
