// Copyright 2025 the Wrangle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text views of a dataset: a transposed glimpse, per-column summaries and a table.

use std::fmt::Write;

use wrangle_core::{ColumnData, DataType, Dataset, Result, Value, stats};
use wrangle_verbs::n_groups;

/// Values shown per column by [`glimpse`].
const GLIMPSE_VALUES: usize = 6;

fn short(ty: DataType) -> &'static str {
    match ty {
        DataType::Numeric => "dbl",
        DataType::Integer => "int",
        DataType::Boolean => "lgl",
        DataType::Categorical => "fct",
        DataType::Text => "chr",
    }
}

/// One line per column: name, type and the first few values.
pub(crate) fn glimpse(data: &Dataset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Rows: {}", data.row_count());
    let _ = writeln!(out, "Columns: {}", data.column_count());
    if data.is_grouped() {
        let _ = writeln!(out, "Groups: {}", data.group_keys().join(", "));
    }
    let width = data.column_names().map(str::len).max().unwrap_or(0);
    for column in data.columns() {
        let shown: Vec<String> = (0..data.row_count().min(GLIMPSE_VALUES))
            .map(|r| column.data.value(r).to_string())
            .collect();
        let more = if data.row_count() > GLIMPSE_VALUES { ", ..." } else { "" };
        let _ = writeln!(
            out,
            "$ {:<width$} <{}> {}{more}",
            column.name,
            short(column.data_type()),
            shown.join(", ")
        );
    }
    out
}

/// Type, missing count and a distribution sketch per column.
///
/// Numeric columns show their five-number summary; categorical columns show level counts.
pub(crate) fn summary(data: &Dataset) -> Result<String> {
    let mut out = String::new();
    for column in data.columns() {
        let _ = write!(
            out,
            "{} <{}> missing={}",
            column.name,
            short(column.data_type()),
            column.data.missing_count()
        );
        match &column.data {
            ColumnData::Numeric(_) | ColumnData::Integer(_) => {
                let values = column.data.numeric()?;
                if !values.is_empty() {
                    let [lo, q1, med, q3, hi] = stats::fivenum(&values)?;
                    let _ = write!(
                        out,
                        " min={lo} q1={q1} median={med} q3={q3} max={hi} mean={:.2}",
                        stats::mean(&values)?
                    );
                }
            }
            ColumnData::Categorical(c) => {
                let levels: Vec<String> = c
                    .levels()
                    .iter()
                    .zip(c.level_counts())
                    .map(|(l, n)| format!("{l}: {n}"))
                    .collect();
                let _ = write!(out, " levels=[{}]", levels.join(", "));
            }
            ColumnData::Boolean(v) => {
                let yes = v.iter().filter(|b| **b == Some(true)).count();
                let _ = write!(out, " true={yes}");
            }
            ColumnData::Text(_) => {}
        }
        out.push('\n');
    }
    Ok(out)
}

/// A fixed-width table of the first `max_rows` rows.
pub(crate) fn render(data: &Dataset, max_rows: usize) -> Result<String> {
    let shown = data.row_count().min(max_rows);
    let mut grid: Vec<Vec<String>> = vec![data.column_names().map(str::to_owned).collect()];
    grid.extend((0..shown).map(|r| data.row(r).iter().map(Value::to_string).collect::<Vec<_>>()));

    let widths: Vec<usize> = (0..data.column_count())
        .map(|c| grid.iter().map(|row| row[c].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    if data.is_grouped() {
        let _ = writeln!(
            out,
            "# Groups: {} [{}]",
            data.group_keys().join(", "),
            n_groups(data)?
        );
    }
    for (i, row) in grid.iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:>w$}"))
            .collect();
        let _ = writeln!(out, "{}", line.join("  "));
        if i == 0 {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            let _ = writeln!(out, "{}", rule.join("  "));
        }
    }
    if data.row_count() > shown {
        let _ = writeln!(out, "# ... with {} more rows", data.row_count() - shown);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use wrangle_verbs::group_by;

    use super::*;

    fn staff() -> Dataset {
        Dataset::builder()
            .categorical("dept", ["Sales", "Eng", "Sales"])
            .integer("age", [Some(34_i64), None, Some(29)])
            .numeric("salary", [50.0, 80.0, 70.0])
            .build()
            .unwrap()
    }

    #[test]
    fn glimpse_lists_columns() {
        let text = glimpse(&staff());
        assert!(text.starts_with("Rows: 3\nColumns: 3\n"));
        assert!(text.contains("$ dept   <fct> Sales, Eng, Sales"));
        assert!(text.contains("$ age    <int> 34, NA, 29"));
    }

    #[test]
    fn summary_reports_distributions() {
        let text = summary(&staff()).unwrap();
        assert!(text.contains("salary <dbl> missing=0 min=50 q1=60 median=70 q3=75 max=80"));
        assert!(text.contains("age <int> missing=1"));
        assert!(text.contains("levels=[Eng: 1, Sales: 2]"));
    }

    #[test]
    fn render_aligns_and_truncates() {
        let grouped = group_by(&staff(), ["dept"]).unwrap();
        let text = render(&grouped, 2).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# Groups: dept [2]");
        assert_eq!(lines[1], " dept  age  salary");
        assert_eq!(lines[2], "-----  ---  ------");
        assert_eq!(lines[3], "Sales   34      50");
        assert_eq!(lines.last().copied(), Some("# ... with 1 more rows"));
    }
}
