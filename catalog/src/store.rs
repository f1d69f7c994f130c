use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::error::CatalogError;
use crate::types::PosterRecord;

/// Catalog is the durable key -> record view of the poster dataset,
/// serialized as one JSON document.
///
/// Keys are held in a BTreeMap so iteration is always lexicographic;
/// `keys_with_embeddings` relies on that order as the canonical id
/// assignment when the index ordering artifact has to be rebuilt.
#[derive(Debug, Default)]
pub struct Catalog {
    records: BTreeMap<String, PosterRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the catalog document. A missing file yields an empty catalog
    /// (first ingestion creates it); a present-but-corrupt file is an
    /// error rather than silent data loss.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            warn!(path = %path.display(), "catalog file not found, starting empty");
            return Ok(Self::new());
        }
        let f = File::open(path)?;
        let records: BTreeMap<String, PosterRecord> =
            serde_json::from_reader(BufReader::new(f))?;
        info!(count = records.len(), "loaded catalog");
        Ok(Self { records })
    }

    /// Persist the catalog atomically: write to a temporary file in the
    /// target directory, then rename over the destination so concurrent
    /// readers never observe a partial document.
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut bw = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut bw, &self.records)?;
            bw.flush()?;
        }
        tmp.persist(path)
            .map_err(|e| CatalogError::Io(e.to_string()))?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&PosterRecord> {
        self.records.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Insert or overwrite a record under its slug.
    pub fn insert(&mut self, record: PosterRecord) {
        self.records.insert(record.slug.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PosterRecord)> {
        self.records.iter()
    }

    /// Keys of records carrying an embedding snapshot, in lexicographic
    /// order. This is the canonical rebuild order for index ids.
    pub fn keys_with_embeddings(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|(_, r)| r.embedding.is_some())
            .map(|(k, _)| k.clone())
            .collect()
    }
}
