//! Error types.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum SolarError {
    #[error("Data file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to parse CSV: {0}")]
    ParseError(String),
    #[error("No location column found; looked for {aliases:?} among {columns:?}")]
    SchemaError {
        aliases: Vec<String>,
        columns: Vec<String>,
    },
    #[error("No numeric columns found in the dataset")]
    NoNumericColumns,
    #[error("Invalid aggregation request: {0}")]
    InvalidAggregationRequest(String),
    #[error("Wrapped anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),
    #[error("Wrapped polars error: {0}")]
    PolarsError(#[from] polars::error::PolarsError),
    #[error("std IO error: {0}")]
    IOError(#[from] std::io::Error),
}

pub type SolarResult<T> = Result<T, SolarError>;
