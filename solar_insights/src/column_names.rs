//! This module stores the column names and labels of the derived tables (rankings, statistics
//! panels and boxplot summaries). Note that the presentation layer reads these back when it
//! renders, so they must stay in sync with the headers the CLI displays.

pub const REGION: &str = "Region";
pub const AVG_PREFIX: &str = "Avg";

pub const STAT_METRIC: &str = "Metric";
pub const STAT_VALUE: &str = "Value";
pub const STAT_MEAN: &str = "Mean";
pub const STAT_MEDIAN: &str = "Median";
pub const STAT_STD_DEV: &str = "Std Dev";
pub const STAT_MIN: &str = "Min";
pub const STAT_MAX: &str = "Max";

pub const BOX_COUNT: &str = "Count";
pub const BOX_Q1: &str = "Q1";
pub const BOX_Q3: &str = "Q3";

pub const OUTLIER_FLAG: &str = "is_outlier";

/// Header of the averaged metric column in a ranking, e.g. `Avg GHI`.
pub fn avg_label(metric: &str) -> String {
    format!("{AVG_PREFIX} {metric}")
}
