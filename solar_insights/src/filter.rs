//! Row selection: membership filtering on the location column and free-text search.

use std::collections::BTreeSet;

use anyhow::anyhow;
use log::debug;
use polars::lazy::dsl::{col, lit, Expr};
use polars::prelude::{DataType, IntoLazy, NamedFrom, Series};

use crate::error::SolarResult;
use crate::table::Table;

/// Combine multiple queries with OR. If there are no queries in the input list, returns None.
fn combine_exprs_with_or(exprs: Vec<Expr>) -> Option<Expr> {
    let mut query: Option<Expr> = None;
    for expr in exprs {
        query = if let Some(partial_query) = query {
            Some(partial_query.or(expr))
        } else {
            Some(expr)
        };
    }
    query
}

/// Search in a column case-insensitively for a string literal (i.e. not a regex!). The search
/// parameter can appear anywhere in the rendered column value.
fn filter_contains(column: &str, value: &str) -> Expr {
    let regex = format!("(?i){}", regex::escape(value));
    col(column)
        .cast(DataType::String)
        .str()
        .contains(lit(regex), false)
}

/// Rows whose `column` value (rendered as text) is one of `allowed`, in their original order.
/// Nulls never match, and an empty `allowed` gives an empty view.
pub fn filter_rows(table: &Table, column: &str, allowed: &[String]) -> SolarResult<Table> {
    if !table.schema().contains(column) {
        return Err(anyhow!("Cannot filter on unknown column '{column}'").into());
    }
    if allowed.is_empty() {
        return Ok(table.empty_view());
    }
    let allowed_series = Series::new("allowed", allowed.to_vec());
    let frame = table
        .frame()
        .clone()
        .lazy()
        .filter(
            col(column)
                .cast(DataType::String)
                .is_in(lit(allowed_series)),
        )
        .collect()?;
    debug!(
        "Filtered {} to {} of {} rows",
        column,
        frame.height(),
        table.height()
    );
    Ok(table.view(frame))
}

/// Rows where any column contains `term`, ignoring case. A blank term keeps every row.
pub fn search_rows(table: &Table, term: &str) -> SolarResult<Table> {
    let term = term.trim();
    if term.is_empty() {
        return Ok(table.clone());
    }
    let exprs = table
        .column_names()
        .iter()
        .map(|name| filter_contains(name, term))
        .collect();
    let Some(query) = combine_exprs_with_or(exprs) else {
        return Ok(table.clone());
    };
    let frame = table.frame().clone().lazy().filter(query).collect()?;
    debug!("Search for '{term}' matched {} rows", frame.height());
    Ok(table.view(frame))
}

/// Sorted distinct non-null values of a column, rendered as text.
pub fn distinct_values(table: &Table, column: &str) -> SolarResult<Vec<String>> {
    let values: BTreeSet<String> = table
        .string_values(column)?
        .into_iter()
        .flatten()
        .collect();
    Ok(values.into_iter().collect())
}
