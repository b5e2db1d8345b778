use std::sync::Arc;

use anyhow::anyhow;
use log::debug;

use crate::aggregate::{top_regions, RankingResult, TopNBounds};
use crate::cache::TableCache;
use crate::classify::{ColumnClassifier, ColumnRoles};
use crate::config::Config;
use crate::dashboard::{DashboardView, DatasetInfo, KeyStatistics, Selection};
use crate::error::SolarResult;
use crate::filter::{distinct_values, filter_rows, search_rows};
use crate::loader::DataSource;
use crate::outliers::{detect_outliers_zscore, outlier_rows, OutlierFlags};
use crate::stats::{boxplot_summaries, distribution_summary};
use crate::table::Table;

// Re-exports
pub use column_names as COL;

// Modules
pub mod aggregate;
pub mod cache;
pub mod classify;
pub mod column_names;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod formatters;
pub mod loader;
pub mod outliers;
pub mod stats;
pub mod table;

/// A loaded dataset together with its column roles, ready to answer dashboard queries
pub struct SolarInsights {
    pub table: Arc<Table>,
    pub roles: ColumnRoles,
    pub locations: Vec<String>,
    pub config: Config,
}

impl SolarInsights {
    /// Classify the columns of an already loaded table
    pub fn from_table(
        table: Arc<Table>,
        config: Config,
        location_choice: Option<&str>,
    ) -> SolarResult<Self> {
        debug!("config: {config:?}");
        let roles = ColumnClassifier::from_config(&config).classify(&table, location_choice)?;
        let locations = distinct_values(&table, &roles.location_column)?;
        Ok(Self {
            table,
            roles,
            locations,
            config,
        })
    }

    /// Load `source` through `cache` and classify its columns
    pub fn load(
        source: &DataSource,
        cache: &mut TableCache,
        config: Config,
        location_choice: Option<&str>,
    ) -> SolarResult<Self> {
        let table = cache.load(source)?;
        Self::from_table(table, config, location_choice)
    }

    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            columns: self.table.schema().columns().to_vec(),
            rows: self.table.height(),
            preview: self.table.head(3),
        }
    }

    /// The first few locations, as preselected when the dashboard opens
    pub fn default_locations(&self) -> Vec<String> {
        self.locations
            .iter()
            .take(self.config.default_selection_size)
            .cloned()
            .collect()
    }

    pub fn top_n_bounds(&self) -> TopNBounds {
        TopNBounds::new(
            self.config.top_n_min,
            self.config.top_n_max,
            self.locations.len(),
        )
    }

    /// Build a selection, defaulting the metric to the first offered one. Returns
    /// `Ok(None)` when no location is selected.
    pub fn selection(
        &self,
        locations: Vec<String>,
        metric: Option<&str>,
    ) -> SolarResult<Option<Selection>> {
        let metric = metric.unwrap_or(self.roles.default_metric());
        if !self.roles.metric_columns.iter().any(|m| m == metric) {
            return Err(anyhow!(
                "Unknown metric '{metric}', expected one of: {}",
                self.roles.metric_columns.join(", ")
            )
            .into());
        }
        Ok(Selection::new(locations, metric))
    }

    /// Rows of the selected locations
    pub fn filtered(&self, selection: &Selection) -> SolarResult<Table> {
        filter_rows(
            &self.table,
            &self.roles.location_column,
            &selection.locations(),
        )
    }

    /// Rows of the selected locations matching an optional search term
    pub fn rows(&self, selection: &Selection, search: Option<&str>) -> SolarResult<Table> {
        let filtered = self.filtered(selection)?;
        match search {
            Some(term) => search_rows(&filtered, term),
            None => Ok(filtered),
        }
    }

    /// Ranking over the whole dataset, grouped by region when there is one
    pub fn ranking(&self, metric: &str, top_n: usize) -> RankingResult {
        top_regions(
            &self.table,
            self.roles.group_column(),
            metric,
            self.top_n_bounds().clamp(top_n),
        )
    }

    pub fn outliers(&self, view: &Table, columns: &[String], threshold: f64) -> OutlierFlags {
        detect_outliers_zscore(view, columns, threshold)
    }

    pub fn outlier_rows(&self, view: &Table, columns: &[String], threshold: f64) -> SolarResult<Table> {
        outlier_rows(view, &self.outliers(view, columns, threshold))
    }

    /// Compute every panel of the dashboard for `selection`
    pub fn view(&self, selection: &Selection, top_n: usize) -> SolarResult<DashboardView> {
        let metric = selection.metric.as_str();
        let filtered = self.filtered(selection)?;
        let summary = distribution_summary(&filtered, metric)?;
        let key_statistics = KeyStatistics {
            selected_locations: selection.locations.len(),
            total_locations: self.locations.len(),
            records: filtered.height(),
            total_records: self.table.height(),
            metric: metric.to_string(),
            mean: summary.map(|s| s.mean),
            std_dev: summary.map(|s| s.std_dev),
            max: summary.map(|s| s.max),
        };
        let boxplots = boxplot_summaries(
            &filtered,
            &self.roles.location_column,
            metric,
            &selection.locations(),
        )?;
        let top_n = self.top_n_bounds().clamp(top_n);
        let ranking = self.ranking(metric, top_n);
        let outliers = self.outliers(
            &filtered,
            &[metric.to_string()],
            self.config.outlier_threshold,
        );
        Ok(DashboardView {
            selection: selection.clone(),
            location_column: self.roles.location_column.clone(),
            group_column: self.roles.group_column().to_string(),
            filtered,
            key_statistics,
            summary,
            boxplots,
            top_n,
            ranking,
            outlier_threshold: self.config.outlier_threshold,
            outliers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolarError;

    const CSV: &str = "\
Country,Region,GHI,DNI,Tamb
Benin,Kandi,250,180,30.5
Benin,Malanville,260,190,31.0
Togo,Lome,200,150,28.0
Togo,Dapaong,210,160,29.5
Sierra Leone,Bumbuna,180,120,26.0
Sierra Leone,Freetown,170,110,27.5
";

    fn insights() -> SolarInsights {
        let source = DataSource::from_reader("test.csv", CSV.as_bytes()).unwrap();
        SolarInsights::load(&source, &mut TableCache::new(), Config::default(), None).unwrap()
    }

    #[test]
    fn loads_and_classifies() {
        let insights = insights();
        assert_eq!(insights.roles.location_column, "Country");
        assert_eq!(insights.roles.region_column.as_deref(), Some("Region"));
        assert_eq!(insights.roles.metric_columns, vec!["GHI", "DNI", "Tamb"]);
        assert_eq!(insights.locations, vec!["Benin", "Sierra Leone", "Togo"]);
        assert_eq!(insights.default_locations().len(), 3);
        assert_eq!(insights.info().rows, 6);
        assert_eq!(insights.info().preview.height(), 3);
    }

    #[test]
    fn builds_full_view() {
        let insights = insights();
        let selection = insights
            .selection(vec!["Togo".into(), "Benin".into()], None)
            .unwrap()
            .unwrap();
        let view = insights.view(&selection, 5).unwrap();
        assert!(view.has_data());
        assert_eq!(view.filtered.height(), 4);
        assert_eq!(view.key_statistics.records, 4);
        assert_eq!(view.key_statistics.total_records, 6);
        assert_eq!(view.key_statistics.mean, Some(230.0));
        assert_eq!(view.summary.unwrap().max, 260.0);
        let groups: Vec<&str> = view.boxplots.iter().map(|b| b.group.as_str()).collect();
        assert_eq!(groups, vec!["Togo", "Benin"]);
        // Only three locations, so the ranking is capped at three regions
        assert_eq!(view.top_n, 3);
        assert_eq!(view.ranking.len(), 3);
        assert_eq!(view.ranking.best().unwrap().label, "Malanville");
        assert_eq!(view.group_column, "Region");
        assert_eq!(view.outliers.len(), 4);
        assert_eq!(view.outliers.count(), 0);
    }

    #[test]
    fn empty_selection_and_unknown_metric() {
        let insights = insights();
        assert_eq!(insights.selection(vec![], Some("DNI")).unwrap(), None);
        assert!(matches!(
            insights.selection(vec!["Togo".into()], Some("Country")),
            Err(SolarError::AnyhowError(_))
        ));
    }

    #[test]
    fn rows_can_be_searched() {
        let insights = insights();
        let selection = insights
            .selection(insights.locations.clone(), Some("DNI"))
            .unwrap()
            .unwrap();
        let rows = insights.rows(&selection, Some("free")).unwrap();
        assert_eq!(rows.height(), 1);
        assert_eq!(insights.rows(&selection, None).unwrap().height(), 6);
    }
}
