use anyhow::{anyhow, Result};
use enum_dispatch::enum_dispatch;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value;
use std::io::Cursor;
use std::io::Write;

/// Utility function to convert from polars `AnyValue` to `serde_json::Value`
/// Doesn't cover all types but most of them.
fn any_value_to_json(value: &AnyValue) -> Result<Value> {
    match value {
        AnyValue::Null => Ok(Value::Null),
        AnyValue::Boolean(b) => Ok(Value::Bool(*b)),
        AnyValue::String(s) => Ok(Value::String((*s).to_string())),
        AnyValue::StringOwned(s) => Ok(Value::String(s.to_string())),
        AnyValue::Int8(n) => Ok(json!(*n)),
        AnyValue::Int16(n) => Ok(json!(*n)),
        AnyValue::Int32(n) => Ok(json!(*n)),
        AnyValue::Int64(n) => Ok(json!(*n)),
        AnyValue::UInt8(n) => Ok(json!(*n)),
        AnyValue::UInt16(n) => Ok(json!(*n)),
        AnyValue::UInt32(n) => Ok(json!(*n)),
        AnyValue::UInt64(n) => Ok(json!(*n)),
        AnyValue::Float32(n) => Ok(json!(*n)),
        AnyValue::Float64(n) => Ok(json!(*n)),
        _ => Err(anyhow!("Failed to convert type")),
    }
}

/// Trait to define different output generators. Defines two
/// functions, format which generates a serialized string of the
/// `DataFrame` and save which writes it to a writer
#[enum_dispatch]
pub trait OutputGenerator {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()>;
    fn format(&self, df: &mut DataFrame) -> Result<String> {
        // Just creating an empty vec to store the buffered output
        let mut data: Vec<u8> = vec![];
        let mut buff = Cursor::new(&mut data);
        self.save(&mut buff, df)?;

        Ok(String::from_utf8(data)?)
    }
}

/// Enum of OutputFormatters one for each potential
/// output type
#[enum_dispatch(OutputGenerator)]
#[derive(Serialize, Deserialize, Debug)]
pub enum OutputFormatter {
    Csv(CSVFormatter),
    Json(JSONFormatter),
}

/// Format the rows as a UTF-8 CSV file with a header line
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct CSVFormatter;

impl OutputGenerator for CSVFormatter {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()> {
        CsvWriter::new(writer).include_header(true).finish(df)?;
        Ok(())
    }
}

/// Format the rows as a JSON array with one object per row
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct JSONFormatter;

impl OutputGenerator for JSONFormatter {
    fn save(&self, writer: &mut impl Write, df: &mut DataFrame) -> Result<()> {
        let mut rows: Vec<Value> = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            let mut record = serde_json::Map::new();
            for col in df.get_columns() {
                let val = any_value_to_json(&col.get(idx)?)?;
                record.insert(col.name().to_string(), val);
            }
            rows.push(Value::Object(record));
        }
        serde_json::to_writer(&mut *writer, &rows)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter_rows;
    use crate::loader::load_csv_from_bytes;
    use crate::table::Table;

    fn test_df() -> DataFrame {
        df!(
             "Country" => &["Benin", "Togo, Lome", "Benin"],
             "GHI" => &[Some(2.5), Some(3.0), None],
             "RH" => &[40i64, 55, 61],
        )
        .unwrap()
    }

    #[test]
    fn csv_formatter_should_work() {
        let mut df = test_df();
        let output = CSVFormatter.format(&mut df);
        let correct_str = [
            "Country,GHI,RH",
            "Benin,2.5,40",
            "\"Togo, Lome\",3.0,55",
            "Benin,,61",
            "",
        ]
        .join("\n");
        assert!(output.is_ok(), "Output should not error");
        assert_eq!(output.unwrap(), correct_str, "Output should be correct");
    }

    #[test]
    fn json_formatter_should_work() {
        let mut df = test_df();
        let output = JSONFormatter.format(&mut df).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            parsed,
            json!([
                {"Country": "Benin", "GHI": 2.5, "RH": 40},
                {"Country": "Togo, Lome", "GHI": 3.0, "RH": 55},
                {"Country": "Benin", "GHI": null, "RH": 61},
            ])
        );
    }

    #[test]
    fn exported_view_parses_back_to_the_same_rows() {
        let table = Table::new(test_df());
        let filtered = filter_rows(&table, "Country", &["Benin".into()]).unwrap();
        let formatter: OutputFormatter = CSVFormatter.into();
        let csv = formatter.format(&mut filtered.frame().clone()).unwrap();
        let reparsed = load_csv_from_bytes(csv.into_bytes()).unwrap();
        assert_eq!(reparsed.height(), filtered.height());
        assert_eq!(reparsed.column_names(), filtered.column_names());
        assert!(reparsed.frame().equals_missing(filtered.frame()));
    }
}
