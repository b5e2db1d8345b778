//! Working out which columns of an arbitrary table play which role: the location to filter
//! by, an optional finer region to rank by, and the numeric metrics to analyse.

use log::{debug, info};
use serde::Serialize;

use crate::config::Config;
use crate::error::{SolarError, SolarResult};
use crate::table::Table;

/// Outcome of looking for the location column. When nothing matches, the caller has to ask
/// the user to pick one of the candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    Detected(String),
    NeedsUserInput(Vec<String>),
}

/// Roles of the table's columns, derived once per loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRoles {
    pub location_column: String,
    pub region_column: Option<String>,
    /// Metrics offered to the user; the preferred ones when any are present
    pub metric_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
}

impl ColumnRoles {
    /// Column used for ranking: the region if there is one, else the location.
    pub fn group_column(&self) -> &str {
        self.region_column
            .as_deref()
            .unwrap_or(&self.location_column)
    }

    pub fn default_metric(&self) -> &str {
        // Never empty: classification fails without numeric columns
        &self.metric_columns[0]
    }
}

#[derive(Debug, Clone)]
pub struct ColumnClassifier {
    location_aliases: Vec<String>,
    region_aliases: Vec<String>,
    preferred_metrics: Vec<String>,
}

fn matches_alias(name: &str, aliases: &[String]) -> bool {
    let lower = name.to_lowercase();
    aliases.iter().any(|alias| alias.to_lowercase() == lower)
}

impl ColumnClassifier {
    pub fn new(
        location_aliases: Vec<String>,
        region_aliases: Vec<String>,
        preferred_metrics: Vec<String>,
    ) -> Self {
        Self {
            location_aliases,
            region_aliases,
            preferred_metrics,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.location_aliases.clone(),
            config.region_aliases.clone(),
            config.preferred_metrics.clone(),
        )
    }

    pub fn detect_location(&self, table: &Table) -> Detection {
        let columns = table.column_names();
        match columns
            .iter()
            .find(|name| matches_alias(name, &self.location_aliases))
        {
            Some(name) => Detection::Detected(name.clone()),
            None => Detection::NeedsUserInput(columns),
        }
    }

    pub fn detect_region(&self, table: &Table, location_column: &str) -> Option<String> {
        table
            .column_names()
            .into_iter()
            .find(|name| name != location_column && matches_alias(name, &self.region_aliases))
    }

    /// Preferred metrics present in the table, in priority order, falling back to every
    /// numeric column in table order.
    pub fn metric_columns(&self, table: &Table) -> SolarResult<Vec<String>> {
        let numeric = table.schema().numeric_columns();
        if numeric.is_empty() {
            return Err(SolarError::NoNumericColumns);
        }
        let preferred: Vec<String> = self
            .preferred_metrics
            .iter()
            .filter(|metric| numeric.contains(metric))
            .cloned()
            .collect();
        if preferred.is_empty() {
            debug!("No preferred metrics found, using all numeric columns");
            Ok(numeric)
        } else {
            Ok(preferred)
        }
    }

    /// Classify every column. An explicit `location_choice` takes precedence over detection
    /// but must name an existing column.
    pub fn classify(&self, table: &Table, location_choice: Option<&str>) -> SolarResult<ColumnRoles> {
        let location_column = match (location_choice, self.detect_location(table)) {
            (Some(choice), _) if table.schema().contains(choice) => choice.to_string(),
            (None, Detection::Detected(column)) => column,
            (_, detection) => {
                let columns = match detection {
                    Detection::NeedsUserInput(candidates) => candidates,
                    Detection::Detected(_) => table.column_names(),
                };
                return Err(SolarError::SchemaError {
                    aliases: self.location_aliases.clone(),
                    columns,
                });
            }
        };
        info!("Using location column: {location_column}");
        let region_column = self.detect_region(table, &location_column);
        if let Some(region) = &region_column {
            info!("Detected region column: {region}");
        }
        let metric_columns = self.metric_columns(table)?;
        Ok(ColumnRoles {
            location_column,
            region_column,
            metric_columns,
            numeric_columns: table.schema().numeric_columns(),
        })
    }
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;

    use super::*;

    fn table(frame: DataFrame) -> Table {
        Table::new(frame)
    }

    #[test]
    fn country_and_preferred_metrics_are_detected() {
        let t = table(
            df!(
                "Country" => &["Benin"],
                "GHI" => &[1.0],
                "DNI" => &[2.0],
            )
            .unwrap(),
        );
        let roles = ColumnClassifier::default().classify(&t, None).unwrap();
        assert_eq!(roles.location_column, "Country");
        assert_eq!(roles.region_column, None);
        assert_eq!(roles.metric_columns, vec!["GHI", "DNI"]);
        assert_eq!(roles.group_column(), "Country");
    }

    #[test]
    fn metrics_follow_priority_order() {
        let t = table(
            df!(
                "state" => &["Kandi"],
                "RH" => &[40.0],
                "elevation" => &[300i64],
                "DHI" => &[2.0],
                "GHI" => &[1.0],
            )
            .unwrap(),
        );
        let classifier = ColumnClassifier::default();
        assert_eq!(classifier.metric_columns(&t).unwrap(), vec!["GHI", "DHI", "RH"]);
    }

    #[test]
    fn all_numeric_columns_without_preferred_metrics() {
        let t = table(
            df!(
                "Location" => &["Lome"],
                "irradiance" => &[1.0],
                "year" => &[2021i64],
            )
            .unwrap(),
        );
        let roles = ColumnClassifier::default().classify(&t, None).unwrap();
        assert_eq!(roles.metric_columns, vec!["irradiance", "year"]);
    }

    #[test]
    fn region_excludes_location_column() {
        // "Region" is a location alias too; it is taken as location, then "City" as region
        let t = table(
            df!(
                "Region" => &["West"],
                "City" => &["Kandi"],
                "GHI" => &[1.0],
            )
            .unwrap(),
        );
        let roles = ColumnClassifier::default().classify(&t, None).unwrap();
        assert_eq!(roles.location_column, "Region");
        assert_eq!(roles.region_column.as_deref(), Some("City"));
        assert_eq!(roles.group_column(), "City");
    }

    #[test]
    fn first_matching_location_column_wins() {
        let t = table(
            df!(
                "site" => &["a"],
                "NATION" => &["Benin"],
                "country" => &["Togo"],
                "GHI" => &[1.0],
            )
            .unwrap(),
        );
        assert_eq!(
            ColumnClassifier::default().detect_location(&t),
            Detection::Detected("NATION".into())
        );
    }

    #[test]
    fn missing_location_needs_user_input() {
        let t = table(df!("site" => &["a"], "GHI" => &[1.0]).unwrap());
        let classifier = ColumnClassifier::default();
        assert_eq!(
            classifier.detect_location(&t),
            Detection::NeedsUserInput(vec!["site".into(), "GHI".into()])
        );
        assert!(matches!(
            classifier.classify(&t, None),
            Err(SolarError::SchemaError { .. })
        ));
        let roles = classifier.classify(&t, Some("site")).unwrap();
        assert_eq!(roles.location_column, "site");
        assert!(matches!(
            classifier.classify(&t, Some("nope")),
            Err(SolarError::SchemaError { .. })
        ));
    }

    #[test]
    fn no_numeric_columns_is_reported() {
        let t = table(df!("Country" => &["Benin"], "notes" => &["sunny"]).unwrap());
        assert!(matches!(
            ColumnClassifier::default().classify(&t, None),
            Err(SolarError::NoNumericColumns)
        ));
    }
}
