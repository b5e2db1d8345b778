//! Z-score outlier detection across one or more numeric columns.

use log::{debug, warn};
use polars::prelude::{BooleanChunked, NewChunkedArray};
use serde::Serialize;

use crate::error::SolarResult;
use crate::stats::{mean, sample_std_dev};
use crate::table::Table;
use crate::COL;

pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// One flag per row of the table the detector ran on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OutlierFlags(pub Vec<bool>);

impl OutlierFlags {
    pub fn count(&self) -> usize {
        self.0.iter().filter(|flag| **flag).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

/// Absolute z-scores of a column, `None` where the value is null or the spread is zero.
fn abs_z_scores(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let spread = mean(&present).and_then(|m| sample_std_dev(&present, m).map(|s| (m, s)));
    match spread {
        Some((m, s)) if s > 0.0 => values
            .iter()
            .map(|value| value.map(|v| ((v - m) / s).abs()))
            .collect(),
        // A constant (or near empty) column has no statistical outliers
        _ => vec![None; values.len()],
    }
}

/// Flag rows where the absolute z-score of any of `columns` exceeds `threshold`. Columns
/// that are missing or not numeric are skipped with a warning.
pub fn detect_outliers_zscore(table: &Table, columns: &[String], threshold: f64) -> OutlierFlags {
    let mut flags = vec![false; table.height()];
    for column in columns {
        let values = match table.float_values(column) {
            Ok(values) => values,
            Err(err) => {
                warn!("Skipping column in outlier detection: {err}");
                continue;
            }
        };
        for (flag, z) in flags.iter_mut().zip(abs_z_scores(&values)) {
            if z.is_some_and(|z| z > threshold) {
                *flag = true;
            }
        }
    }
    let flags = OutlierFlags(flags);
    debug!(
        "Flagged {} of {} rows as outliers over {:?}",
        flags.count(),
        flags.len(),
        columns
    );
    flags
}

/// The rows of `table` flagged in `flags`.
pub fn outlier_rows(table: &Table, flags: &OutlierFlags) -> SolarResult<Table> {
    let mask = BooleanChunked::from_slice(COL::OUTLIER_FLAG, flags.as_slice());
    Ok(table.view(table.frame().filter(&mask)?))
}
