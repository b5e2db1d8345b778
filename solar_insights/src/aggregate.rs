//! Ranking groups (regions or locations) by the average of a metric.

use log::{debug, warn};
use polars::prelude::*;
use serde::Serialize;

use crate::error::{SolarError, SolarResult};
use crate::table::Table;
use crate::COL;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGroup {
    pub label: String,
    pub average: f64,
}

/// Groups ordered by average value, highest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingResult {
    pub group_header: String,
    pub value_header: String,
    pub entries: Vec<RankedGroup>,
}

impl RankingResult {
    pub fn empty(metric_col: &str) -> Self {
        Self {
            group_header: COL::REGION.to_string(),
            value_header: COL::avg_label(metric_col),
            entries: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn best(&self) -> Option<&RankedGroup> {
        self.entries.first()
    }

    /// How far the best group is ahead of the second one.
    pub fn lead_over_second(&self) -> Option<f64> {
        match self.entries.as_slice() {
            [first, second, ..] => Some(first.average - second.average),
            _ => None,
        }
    }

    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let labels: Vec<&str> = self.entries.iter().map(|e| e.label.as_str()).collect();
        let averages: Vec<f64> = self.entries.iter().map(|e| e.average).collect();
        DataFrame::new(vec![
            Series::new(&self.group_header, labels),
            Series::new(&self.value_header, averages),
        ])
    }
}

/// Bounds for how many groups a ranking may show: `[min, min(max, distinct groups)]`, with
/// the upper bound never below the lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopNBounds {
    pub min: usize,
    pub max: usize,
}

impl TopNBounds {
    pub fn new(min: usize, max: usize, distinct_groups: usize) -> Self {
        Self {
            min,
            max: max.min(distinct_groups).max(min),
        }
    }

    pub fn clamp(&self, requested: usize) -> usize {
        requested.clamp(self.min, self.max)
    }
}

/// Top `top_n` groups of `group_col` by mean `metric_col`. Invalid requests (unknown
/// columns, non-numeric metric) give an empty ranking rather than an error.
pub fn top_regions(table: &Table, group_col: &str, metric_col: &str, top_n: usize) -> RankingResult {
    match try_top_regions(table, group_col, metric_col, top_n) {
        Ok(ranking) => ranking,
        Err(err) => {
            warn!("Returning empty ranking: {err}");
            RankingResult::empty(metric_col)
        }
    }
}

fn validate(table: &Table, group_col: &str, metric_col: &str) -> SolarResult<()> {
    let schema = table.schema();
    if !schema.contains(group_col) {
        return Err(SolarError::InvalidAggregationRequest(format!(
            "unknown group column '{group_col}'"
        )));
    }
    if !schema.contains(metric_col) {
        return Err(SolarError::InvalidAggregationRequest(format!(
            "unknown metric column '{metric_col}'"
        )));
    }
    if !schema.is_numeric(metric_col) {
        return Err(SolarError::InvalidAggregationRequest(format!(
            "metric column '{metric_col}' is not numeric"
        )));
    }
    Ok(())
}

pub fn try_top_regions(
    table: &Table,
    group_col: &str,
    metric_col: &str,
    top_n: usize,
) -> SolarResult<RankingResult> {
    validate(table, group_col, metric_col)?;
    let avg = COL::avg_label(metric_col);
    let ranked = table
        .frame()
        .clone()
        .lazy()
        .filter(col(group_col).is_not_null())
        // Stable grouping keeps first-seen order so ties sort deterministically
        .group_by_stable([col(group_col)])
        .agg([col(metric_col)
            .cast(DataType::Float64)
            .fill_nan(lit(NULL))
            .mean()
            .alias(&avg)])
        .filter(col(&avg).is_not_null())
        .sort_by_exprs(
            vec![col(&avg)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .limit(IdxSize::try_from(top_n).unwrap_or(IdxSize::MAX))
        .select([col(group_col).cast(DataType::String).alias(COL::REGION), col(&avg)])
        .collect()?;
    debug!("Ranking of {group_col} by {avg}: {ranked:?}");

    let entries = ranked
        .column(COL::REGION)?
        .str()?
        .into_iter()
        .zip(ranked.column(&avg)?.f64()?)
        .filter_map(|(label, average)| {
            Some(RankedGroup {
                label: label?.to_string(),
                average: average?,
            })
        })
        .collect();
    Ok(RankingResult {
        group_header: COL::REGION.to_string(),
        value_header: avg,
        entries,
    })
}
