//! Everything the dashboard shows for one selection, computed in a single top-to-bottom pass.

use nonempty::NonEmpty;
use serde::Serialize;

use crate::aggregate::RankingResult;
use crate::outliers::OutlierFlags;
use crate::stats::{BoxplotSummary, SummaryStats};
use crate::table::{ColumnSpec, Table};

/// The locations and metric a user is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub locations: NonEmpty<String>,
    pub metric: String,
}

impl Selection {
    /// `None` when no location is selected.
    pub fn new(locations: Vec<String>, metric: &str) -> Option<Self> {
        NonEmpty::from_vec(locations).map(|locations| Self {
            locations,
            metric: metric.to_string(),
        })
    }

    pub fn locations(&self) -> Vec<String> {
        self.locations.iter().cloned().collect()
    }
}

/// Headline numbers of the statistics panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyStatistics {
    pub selected_locations: usize,
    pub total_locations: usize,
    pub records: usize,
    pub total_records: usize,
    pub metric: String,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub max: Option<f64>,
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

impl KeyStatistics {
    pub fn location_share(&self) -> f64 {
        percentage(self.selected_locations, self.total_locations)
    }

    pub fn record_share(&self) -> f64 {
        percentage(self.records, self.total_records)
    }
}

/// Shape of the loaded dataset and its first rows.
#[derive(Debug, Clone)]
pub struct DatasetInfo {
    pub columns: Vec<ColumnSpec>,
    pub rows: usize,
    pub preview: Table,
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub selection: Selection,
    pub location_column: String,
    pub group_column: String,
    pub filtered: Table,
    pub key_statistics: KeyStatistics,
    pub summary: Option<SummaryStats>,
    pub boxplots: Vec<BoxplotSummary>,
    pub top_n: usize,
    pub ranking: RankingResult,
    pub outlier_threshold: f64,
    /// Rows of `filtered` whose metric value is an outlier
    pub outliers: OutlierFlags,
}

impl DashboardView {
    /// Whether the selection matched any rows at all.
    pub fn has_data(&self) -> bool {
        !self.filtered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_requires_a_location() {
        assert_eq!(Selection::new(vec![], "GHI"), None);
        let selection = Selection::new(vec!["Benin".into(), "Togo".into()], "GHI").unwrap();
        assert_eq!(selection.locations(), vec!["Benin", "Togo"]);
        assert_eq!(selection.metric, "GHI");
    }

    #[test]
    fn shares_are_percentages() {
        let stats = KeyStatistics {
            selected_locations: 1,
            total_locations: 4,
            records: 3,
            total_records: 12,
            metric: "GHI".into(),
            mean: None,
            std_dev: None,
            max: None,
        };
        assert_eq!(stats.location_share(), 25.0);
        assert_eq!(stats.record_share(), 25.0);
        let empty = KeyStatistics {
            total_locations: 0,
            total_records: 0,
            ..stats
        };
        assert_eq!(empty.location_share(), 0.0);
    }
}
