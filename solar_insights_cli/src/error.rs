use polars::error::PolarsError;
use solar_insights::error::SolarError;

#[derive(thiserror::Error, Debug)]
pub enum SolarCliError {
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
    #[error("serde JSON error: {0}")]
    SerdeJSONError(#[from] serde_json::Error),
    #[error("Invalid TOML in config file: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("{0}")]
    SolarError(#[from] SolarError),
    #[error("std IO error: {0}")]
    IOError(#[from] std::io::Error),
}

pub type SolarCliResult<T> = Result<T, SolarCliError>;
