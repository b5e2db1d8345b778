//! Reuse of the most recently loaded table while its source is unchanged.

use std::sync::Arc;

use log::debug;

use crate::error::SolarResult;
use crate::loader::{DataSource, SourceIdentity};
use crate::table::Table;

/// Memoizes the most recently loaded table by the identity of its source. Callers get a
/// shared immutable table; a source with a different identity replaces the entry.
#[derive(Debug, Default)]
pub struct TableCache {
    entry: Option<(SourceIdentity, Arc<Table>)>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, source: &DataSource) -> SolarResult<Arc<Table>> {
        let identity = source.identity()?;
        if let Some((cached_identity, table)) = &self.entry {
            if *cached_identity == identity {
                debug!("Table cache hit for {identity:?}");
                return Ok(Arc::clone(table));
            }
        }
        debug!("Table cache miss for {identity:?}");
        let table = Arc::new(source.load()?);
        self.entry = Some((identity, Arc::clone(&table)));
        Ok(table)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn same_source_is_served_from_cache() {
        let mut cache = TableCache::new();
        let source = DataSource::from_reader("upload.csv", "Country,GHI\nBenin,1\n".as_bytes())
            .unwrap();
        let first = cache.load(&source).unwrap();
        let second = cache.load(&source).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn changed_source_is_reloaded() {
        let mut cache = TableCache::new();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Country,GHI\nBenin,1\n").unwrap();
        file.flush().unwrap();
        let source = DataSource::Path(file.path().to_path_buf());
        let first = cache.load(&source).unwrap();
        assert_eq!(first.height(), 1);

        // Appending changes the length, hence the identity
        file.write_all(b"Togo,2\n").unwrap();
        file.flush().unwrap();
        let second = cache.load(&source).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.height(), 2);
    }

    #[test]
    fn invalidate_clears_entry() {
        let mut cache = TableCache::new();
        let source =
            DataSource::from_reader("upload.csv", "Country,GHI\nBenin,1\n".as_bytes()).unwrap();
        cache.load(&source).unwrap();
        assert!(!cache.is_empty());
        cache.invalidate();
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_file_is_not_cached() {
        let mut cache = TableCache::new();
        let source = DataSource::Path("no/such/file.csv".into());
        assert!(cache.load(&source).is_err());
        assert!(cache.is_empty());
    }
}
