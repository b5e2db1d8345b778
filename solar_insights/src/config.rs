use serde::{Deserialize, Serialize};

/// Column names recognised as holding the geographic grouping (country, state, ...).
pub const LOCATION_ALIASES: [&str; 6] = [
    "country",
    "countries",
    "location",
    "nation",
    "state",
    "region",
];

/// Column names recognised as a finer-grained region within a location.
pub const REGION_ALIASES: [&str; 6] = ["region", "regions", "area", "zone", "district", "city"];

/// Solar metrics offered first when present, in this order.
pub const PREFERRED_METRICS: [&str; 9] = [
    "GHI", "DNI", "DHI", "Tamb", "TModA", "TModB", "WS", "WSgust", "RH",
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_path: String,
    pub location_aliases: Vec<String>,
    pub region_aliases: Vec<String>,
    pub preferred_metrics: Vec<String>,
    pub outlier_threshold: f64,
    pub default_top_n: usize,
    pub top_n_min: usize,
    pub top_n_max: usize,
    pub default_selection_size: usize,
    pub preview_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_path: "data/solar_data.csv".into(),
            location_aliases: to_strings(&LOCATION_ALIASES),
            region_aliases: to_strings(&REGION_ALIASES),
            preferred_metrics: to_strings(&PREFERRED_METRICS),
            outlier_threshold: 3.0,
            default_top_n: 5,
            top_n_min: 3,
            top_n_max: 20,
            default_selection_size: 3,
            preview_rows: 5,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
