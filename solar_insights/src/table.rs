//! The in-memory table the dashboard works on: a polars `DataFrame` paired with a schema
//! descriptor derived once, when the table is first built from loaded data.

use anyhow::anyhow;
use polars::prelude::*;
use serde::Serialize;
use strum_macros::Display;

use crate::error::SolarResult;

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl From<&DataType> for ColumnKind {
    fn from(dtype: &DataType) -> Self {
        if dtype.is_numeric() {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    /// The storage type polars inferred, e.g. `f64` or `str`
    pub dtype: String,
    pub kind: ColumnKind,
}

/// Column name → declared type, in table order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableSchema {
    columns: Vec<ColumnSpec>,
}

impl TableSchema {
    pub fn from_frame(frame: &DataFrame) -> Self {
        let columns = frame
            .get_columns()
            .iter()
            .map(|series| ColumnSpec {
                name: series.name().to_string(),
                dtype: series.dtype().to_string(),
                kind: series.dtype().into(),
            })
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.get(name)
            .map(|c| c.kind == ColumnKind::Numeric)
            .unwrap_or(false)
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Numeric columns in table order
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Numeric)
            .map(|c| c.name.clone())
            .collect()
    }
}

/// An immutable table. Derived views (filtered, searched, head) are fresh `Table`s that
/// share the schema of the table they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    frame: DataFrame,
    schema: TableSchema,
}

impl Table {
    pub fn new(frame: DataFrame) -> Self {
        let schema = TableSchema::from_frame(&frame);
        Self { frame, schema }
    }

    /// Wrap a frame derived from this table, keeping the schema descriptor.
    pub fn view(&self, frame: DataFrame) -> Self {
        Self {
            frame,
            schema: self.schema.clone(),
        }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.names()
    }

    pub fn head(&self, n: usize) -> Self {
        self.view(self.frame.head(Some(n)))
    }

    /// An empty view with the same columns.
    pub fn empty_view(&self) -> Self {
        self.head(0)
    }

    fn series(&self, column: &str) -> SolarResult<&Series> {
        if !self.schema.contains(column) {
            return Err(anyhow!("Unknown column '{column}'").into());
        }
        Ok(self.frame.column(column)?)
    }

    /// Values of a numeric column as floats. Nulls and NaN are both `None`.
    pub fn float_values(&self, column: &str) -> SolarResult<Vec<Option<f64>>> {
        if !self.schema.is_numeric(column) {
            return Err(anyhow!("Column '{column}' is not numeric").into());
        }
        let series = self.series(column)?.cast(&DataType::Float64)?;
        Ok(series
            .f64()?
            .into_iter()
            .map(|value| value.filter(|v| !v.is_nan()))
            .collect())
    }

    /// Values of any column rendered as strings, nulls kept as `None`.
    pub fn string_values(&self, column: &str) -> SolarResult<Vec<Option<String>>> {
        let series = self.series(column)?.cast(&DataType::String)?;
        Ok(series
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect())
    }
}

impl From<DataFrame> for Table {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}
