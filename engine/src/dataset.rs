//! On-disk dataset layout and startup reconciliation.

use std::path::{Path, PathBuf};

use animikyoku_catalog::Catalog;
use animikyoku_vecstore::FlatIndex;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::error::EngineError;
use crate::types::IndexStats;

/// File layout under one data directory.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    data_dir: PathBuf,
}

impl DatasetPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Binary vector arena.
    pub fn vectors(&self) -> PathBuf {
        self.data_dir.join("index.amkv")
    }

    /// Ordered id -> key mapping, parallel to the arena.
    pub fn mapping(&self) -> PathBuf {
        self.data_dir.join("index.keys.json")
    }

    /// Catalog document.
    pub fn catalog(&self) -> PathBuf {
        self.data_dir.join("posters.json")
    }

    /// Directory for raw poster assets.
    pub fn posters_dir(&self) -> PathBuf {
        self.data_dir.join("posters")
    }
}

pub(crate) struct DatasetState {
    pub index: FlatIndex,
    pub catalog: Catalog,
}

/// The resident dataset: flat index plus catalog behind one RwLock.
///
/// Searches take a read guard and run concurrently; every mutation takes
/// the write guard for its whole critical section, so ingestions are
/// serialized against each other and against nothing else.
pub struct Dataset {
    paths: DatasetPaths,
    dim: usize,
    pub(crate) state: RwLock<DatasetState>,
}

impl Dataset {
    /// Load (or initialize) the dataset from disk.
    ///
    /// A missing vectors file starts an empty index. A missing or
    /// length-mismatched mapping triggers a full rebuild from the
    /// catalog's embedding snapshots in lexicographic key order; that
    /// order does not reproduce original insertion order, so ids shift.
    pub fn open(paths: DatasetPaths, dim: usize) -> Result<Self, EngineError> {
        std::fs::create_dir_all(paths.data_dir())
            .map_err(|e| EngineError::Ingestion(format!("create data dir: {e}")))?;

        let catalog = Catalog::load(&paths.catalog())?;

        let vectors_path = paths.vectors();
        let mut index = if vectors_path.exists() {
            let idx = animikyoku_vecstore::load_vectors(&vectors_path)?;
            if idx.dimension() != dim {
                return Err(EngineError::Contract(format!(
                    "index dimension {} does not match configured {}",
                    idx.dimension(),
                    dim
                )));
            }
            idx
        } else {
            FlatIndex::new(dim)
        };

        match animikyoku_vecstore::load_keys(&paths.mapping())? {
            Some(keys) if keys.len() == index.len() => {
                index.set_keys(keys)?;
            }
            other => {
                if index.is_empty() && other.is_none() {
                    info!("starting with an empty dataset");
                } else {
                    warn!(
                        vectors = index.len(),
                        keys = other.map(|k| k.len()).unwrap_or(0),
                        "id mapping missing or out of step, rebuilding from catalog"
                    );
                    index = rebuild_from_catalog(&catalog, dim)?;
                    animikyoku_vecstore::save(&index, &vectors_path, &paths.mapping())?;
                }
            }
        }

        info!(
            vectors = index.len(),
            records = catalog.len(),
            dir = %paths.data_dir().display(),
            "dataset ready"
        );

        Ok(Self {
            paths,
            dim,
            state: RwLock::new(DatasetState { index, catalog }),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    pub fn paths(&self) -> &DatasetPaths {
        &self.paths
    }

    pub async fn stats(&self) -> IndexStats {
        let state = self.state.read().await;
        let vector_count = state.index.len();
        let mapping_count = state.index.key_count();
        IndexStats {
            vector_count,
            mapping_count,
            catalog_count: state.catalog.len(),
            dimension: self.dim,
            healthy: vector_count == mapping_count,
        }
    }
}

/// Rebuild the index from catalog embedding snapshots, lexicographic key
/// order. Records whose snapshot has the wrong dimension are skipped.
fn rebuild_from_catalog(catalog: &Catalog, dim: usize) -> Result<FlatIndex, EngineError> {
    let mut index = FlatIndex::new(dim);
    for key in catalog.keys_with_embeddings() {
        let Some(embedding) = catalog.get(&key).and_then(|r| r.embedding.as_deref()) else {
            continue;
        };
        if embedding.len() != dim {
            error!(
                key,
                got = embedding.len(),
                want = dim,
                "skipping record with malformed embedding snapshot"
            );
            continue;
        }
        index.add(&key, embedding)?;
    }
    info!(vectors = index.len(), "rebuilt index from catalog");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use animikyoku_catalog::{PosterRecord, Provenance};
    use chrono::Utc;

    fn unit2(x: f32, y: f32) -> Vec<f32> {
        let n = (x * x + y * y).sqrt();
        vec![x / n, y / n]
    }

    fn record(slug: &str, embedding: Vec<f32>) -> PosterRecord {
        PosterRecord {
            title: slug.to_string(),
            slug: slug.to_string(),
            path: None,
            season: None,
            embedding: Some(embedding),
            added_at: Utc::now(),
            source: Provenance::Manual,
            notes: String::new(),
        }
    }

    #[tokio::test]
    async fn test_open_fresh_directory() {
        let dir = tempfile::tempdir().unwrap();
        let ds = Dataset::open(DatasetPaths::new(dir.path()), 2).unwrap();
        let stats = ds.stats().await;
        assert_eq!(stats.vector_count, 0);
        assert!(stats.healthy);
    }

    #[tokio::test]
    async fn test_open_rebuilds_when_mapping_lost() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DatasetPaths::new(dir.path());

        let mut catalog = Catalog::new();
        catalog.insert(record("zeta", unit2(0.0, 1.0)));
        catalog.insert(record("akira", unit2(1.0, 0.0)));
        catalog.save(&paths.catalog()).unwrap();

        let mut index = FlatIndex::new(2);
        index.add("zeta", &unit2(0.0, 1.0)).unwrap();
        index.add("akira", &unit2(1.0, 0.0)).unwrap();
        animikyoku_vecstore::save(&index, &paths.vectors(), &paths.mapping()).unwrap();
        // Simulate a lost ordering artifact.
        std::fs::remove_file(paths.mapping()).unwrap();

        let ds = Dataset::open(paths.clone(), 2).unwrap();
        let state = ds.state.read().await;
        // Lexicographic rebuild order, not insertion order.
        assert_eq!(state.index.keys(), &["akira".to_string(), "zeta".to_string()]);
        let hits = state.index.search(&unit2(1.0, 0.0), 1, 0.0).unwrap();
        assert_eq!(hits[0].key, "akira");
        // The rebuilt mapping was persisted.
        drop(state);
        assert!(paths.mapping().exists());
    }

    #[tokio::test]
    async fn test_open_rejects_dimension_change() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DatasetPaths::new(dir.path());

        let mut index = FlatIndex::new(2);
        index.add("a", &unit2(1.0, 0.0)).unwrap();
        animikyoku_vecstore::save(&index, &paths.vectors(), &paths.mapping()).unwrap();

        assert!(matches!(
            Dataset::open(paths, 3),
            Err(EngineError::Contract(_))
        ));
    }

    #[tokio::test]
    async fn test_rebuild_skips_malformed_snapshot() {
        let mut catalog = Catalog::new();
        catalog.insert(record("good", unit2(1.0, 0.0)));
        catalog.insert(record("bad", vec![1.0, 0.0, 0.0]));
        let index = rebuild_from_catalog(&catalog, 2).unwrap();
        assert_eq!(index.keys(), &["good".to_string()]);
    }
}
