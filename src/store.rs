//! Source-table loading with content-addressed memoization.
//!
//! Parsing the wide sheets is the only expensive, repeatable step in the
//! pipeline, so [`TableStore`] caches each parsed table keyed by path and a
//! SHA-256 digest of the file bytes. A reload with unchanged content is a
//! cache hit; an edited file re-parses transparently. The cache is an
//! explicit value owned by whoever builds the pipeline, with explicit
//! [`TableStore::invalidate`] and [`TableStore::clear`], not a process-wide
//! singleton.

use crate::reshape::WideTable;
use anyhow::{Context, Result};
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct CachedTable {
    digest: [u8; 32],
    table: Arc<WideTable>,
}

/// Memoizing loader for wide CSV tables.
#[derive(Default)]
pub struct TableStore {
    cache: HashMap<PathBuf, CachedTable>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a wide CSV table, reusing the cached parse when the file bytes
    /// are unchanged.
    ///
    /// Headers are coerced to trimmed strings, so numerically-typed year
    /// headers written by spreadsheet exports survive detection. A file that
    /// cannot be read or parsed at all is a fatal error for this dataset
    /// only, with the path named in the message.
    pub fn load(&mut self, path: &Path) -> Result<Arc<WideTable>> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading table file {}", path.display()))?;
        let digest: [u8; 32] = Sha256::digest(&bytes).into();

        if let Some(hit) = self.cache.get(path) {
            if hit.digest == digest {
                debug!("cache hit for {}", path.display());
                return Ok(Arc::clone(&hit.table));
            }
            debug!("content changed, re-parsing {}", path.display());
        }

        let table = Arc::new(
            parse_csv(&bytes).with_context(|| format!("parsing CSV table {}", path.display()))?,
        );
        self.cache
            .insert(path.to_path_buf(), CachedTable { digest, table: Arc::clone(&table) });
        Ok(table)
    }

    /// Drop the cached parse for one path.
    pub fn invalidate(&mut self, path: &Path) {
        self.cache.remove(path);
    }

    /// Drop every cached parse.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

fn parse_csv(bytes: &[u8]) -> Result<WideTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }
    Ok(WideTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(path: &Path, text: &str) {
        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(text.as_bytes()).unwrap();
    }

    #[test]
    fn loads_and_trims_headers() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("totals.csv");
        write_file(&p, "Country, 2000 ,2001\nAtlantis,1.5,2.5\n");

        let mut store = TableStore::new();
        let t = store.load(&p).unwrap();
        assert_eq!(t.headers, vec!["Country", "2000", "2001"]);
        assert_eq!(t.rows.len(), 1);
    }

    #[test]
    fn unchanged_file_is_a_cache_hit() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("totals.csv");
        write_file(&p, "Country,2000\nAtlantis,1.0\n");

        let mut store = TableStore::new();
        let a = store.load(&p).unwrap();
        let b = store.load(&p).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn edited_file_reparses_and_invalidate_resets() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("totals.csv");
        write_file(&p, "Country,2000\nAtlantis,1.0\n");

        let mut store = TableStore::new();
        let a = store.load(&p).unwrap();

        write_file(&p, "Country,2000\nAtlantis,2.0\n");
        let b = store.load(&p).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(b.rows[0][1], "2.0");

        store.invalidate(&p);
        let c = store.load(&p).unwrap();
        assert!(!Arc::ptr_eq(&b, &c));
        assert_eq!(*b, *c);
    }

    #[test]
    fn missing_file_is_an_error_naming_the_path() {
        let mut store = TableStore::new();
        let err = store.load(Path::new("/nonexistent/ghg.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/ghg.csv"));
    }
}
