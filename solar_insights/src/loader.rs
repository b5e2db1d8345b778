//! Reading CSV resources into a `Table`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{debug, info};
use polars::prelude::*;

use crate::error::{SolarError, SolarResult};
use crate::table::Table;

/// Where a table comes from: a local file, or bytes handed over by the user (an upload or
/// standard input).
#[derive(Debug, Clone)]
pub enum DataSource {
    Path(PathBuf),
    Bytes { label: String, bytes: Vec<u8> },
}

/// Identity of a resource, used to key the table cache. A file's identity changes when
/// the file is rewritten; uploaded bytes are identified by their content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceIdentity {
    File {
        path: PathBuf,
        modified: Option<SystemTime>,
        len: u64,
    },
    Upload {
        label: String,
        digest: u64,
    },
}

impl DataSource {
    pub fn from_reader<R: Read>(label: &str, mut reader: R) -> SolarResult<Self> {
        let mut bytes = vec![];
        reader.read_to_end(&mut bytes)?;
        Ok(Self::Bytes {
            label: label.to_string(),
            bytes,
        })
    }

    pub fn identity(&self) -> SolarResult<SourceIdentity> {
        match self {
            DataSource::Path(path) => {
                let metadata =
                    std::fs::metadata(path).map_err(|_| SolarError::NotFound(path.clone()))?;
                Ok(SourceIdentity::File {
                    path: path.clone(),
                    modified: metadata.modified().ok(),
                    len: metadata.len(),
                })
            }
            DataSource::Bytes { label, bytes } => {
                let mut hasher = DefaultHasher::new();
                bytes.hash(&mut hasher);
                Ok(SourceIdentity::Upload {
                    label: label.clone(),
                    digest: hasher.finish(),
                })
            }
        }
    }

    pub fn load(&self) -> SolarResult<Table> {
        match self {
            DataSource::Path(path) => load_csv(path),
            DataSource::Bytes { label, bytes } => {
                debug!("Parsing {} bytes uploaded as '{label}'", bytes.len());
                load_csv_from_bytes(bytes.clone())
            }
        }
    }
}

/// Cell contents read as missing values, on top of empty cells.
pub const MISSING_VALUE_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn read_options() -> CsvReadOptions {
    let null_values = NullValues::AllColumns(
        MISSING_VALUE_MARKERS
            .iter()
            .map(|marker| marker.to_string())
            .collect(),
    );
    // Scan every row so a column's type reflects all of its values
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .map_parse_options(|options| options.with_null_values(Some(null_values.clone())))
}

/// Load a CSV file from disk.
pub fn load_csv<P: AsRef<Path>>(path: P) -> SolarResult<Table> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(SolarError::NotFound(path.to_path_buf()));
    }
    info!("Attempting to load dataframe from {}", path.display());
    let bytes = std::fs::read(path)?;
    load_csv_from_bytes(bytes)
}

/// Parse CSV text held in memory.
pub fn load_csv_from_bytes(bytes: Vec<u8>) -> SolarResult<Table> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(SolarError::ParseError("input is empty".into()));
    }
    let frame = read_options()
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| SolarError::ParseError(e.to_string()))?;
    info!("Loaded dataframe with shape: {:?}", frame.shape());
    Ok(Table::new(frame))
}
