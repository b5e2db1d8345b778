//! Distribution statistics of a metric: the summary panel and per-group boxplot figures.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::SolarResult;
use crate::table::Table;
use crate::COL;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; zero when there is a single value
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryStats {
    /// Statistics of `values`, or `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        let mean = mean(&sorted)?;
        Some(Self {
            mean,
            median: quantile(&sorted, 0.5)?,
            std_dev: sample_std_dev(&sorted, mean).unwrap_or(0.0),
            min: *sorted.first()?,
            max: *sorted.last()?,
        })
    }

    /// Label/value pairs in panel order.
    pub fn rows(&self) -> [(&'static str, f64); 5] {
        [
            (COL::STAT_MEAN, self.mean),
            (COL::STAT_MEDIAN, self.median),
            (COL::STAT_STD_DEV, self.std_dev),
            (COL::STAT_MIN, self.min),
            (COL::STAT_MAX, self.max),
        ]
    }
}

/// Figures needed to draw one box of a boxplot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxplotSummary {
    pub group: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxplotSummary {
    fn from_values(group: &str, values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        Some(Self {
            group: group.to_string(),
            count: sorted.len(),
            min: *sorted.first()?,
            q1: quantile(&sorted, 0.25)?,
            median: quantile(&sorted, 0.5)?,
            q3: quantile(&sorted, 0.75)?,
            max: *sorted.last()?,
        })
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with N-1 in the denominator. Undefined for fewer than two values.
pub(crate) fn sample_std_dev(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Linearly interpolated quantile of already sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Mean, median, sample standard deviation, min and max of `metric`, ignoring nulls. `None`
/// when the view holds no values for it.
pub fn distribution_summary(table: &Table, metric: &str) -> SolarResult<Option<SummaryStats>> {
    let values: Vec<f64> = table.float_values(metric)?.into_iter().flatten().collect();
    Ok(SummaryStats::from_values(&values))
}

/// One boxplot summary per group, in the order of `groups`. Groups without any value of
/// `metric` are left out.
pub fn boxplot_summaries(
    table: &Table,
    group_col: &str,
    metric: &str,
    groups: &[String],
) -> SolarResult<Vec<BoxplotSummary>> {
    let mut values_by_group: HashMap<String, Vec<f64>> = HashMap::new();
    for (group, value) in table
        .string_values(group_col)?
        .into_iter()
        .zip(table.float_values(metric)?)
    {
        if let (Some(group), Some(value)) = (group, value) {
            values_by_group.entry(group).or_default().push(value);
        }
    }
    Ok(groups
        .iter()
        .filter_map(|group| {
            values_by_group
                .get(group)
                .and_then(|values| BoxplotSummary::from_values(group, values))
        })
        .collect())
}
