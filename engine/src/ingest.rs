//! Ingestion pipeline: one poster in, one vector and one record out.

use animikyoku_catalog::{slug, PosterRecord};
use animikyoku_embed::is_unit_norm;
use chrono::Utc;
use tracing::{info, warn};

use crate::engine::Engine;
use crate::error::EngineError;
use crate::sniff;
use crate::types::{IngestReceipt, IngestRequest};

impl Engine {
    /// Ingest one poster under the mutation lock.
    ///
    /// Embedding happens before the lock is taken, so a slow embedding
    /// server never blocks other writers. The critical section covers
    /// collision resolution, the index append, the catalog insert, and
    /// both persistence steps (index first, then catalog). An embedding
    /// failure is a clean no-op; a failure inside the critical section
    /// is reported as `Ingestion` because state may have partially
    /// changed — the next startup reconciles it from the catalog.
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestReceipt, EngineError> {
        let format = sniff::sniff(&request.image).ok_or_else(|| {
            EngineError::InvalidImage("payload is not a JPEG, PNG, or WEBP image".into())
        })?;
        if request.title.trim().is_empty() {
            return Err(EngineError::Contract("title must not be empty".into()));
        }

        let base = slug::normalize(&request.title);
        let vector = self.embedder.embed_image(&request.image).await?;

        let dim = self.dataset.dimension();
        if vector.len() != dim {
            return Err(EngineError::Contract(format!(
                "embedding has {} dimensions, index wants {dim}",
                vector.len()
            )));
        }
        if !is_unit_norm(&vector) {
            warn!(title = %request.title, "rejecting embedding that is not unit-norm");
            return Err(EngineError::Contract(
                "embedding is not unit-norm".into(),
            ));
        }

        let mut state = self.dataset.state.write().await;

        let key = slug::resolve_collision(&base, |k| state.catalog.contains_key(k))?;
        let was_renamed = key != base;
        if was_renamed {
            info!(requested = %base, assigned = %key, "slug taken, assigned variant");
        }

        let id = state
            .index
            .add(&key, &vector)
            .map_err(|e| EngineError::Ingestion(format!("index append: {e}")))?;

        let filename = format!("{key}.{}", format.extension());
        state.catalog.insert(PosterRecord {
            title: request.title.clone(),
            slug: key.clone(),
            path: request
                .persist_asset
                .then(|| format!("posters/{filename}")),
            season: request.season,
            embedding: Some(vector),
            added_at: Utc::now(),
            source: request.source,
            notes: request.notes.clone(),
        });

        let paths = self.dataset.paths();
        animikyoku_vecstore::save(&state.index, &paths.vectors(), &paths.mapping())
            .map_err(|e| EngineError::Ingestion(format!("persist index: {e}")))?;
        state
            .catalog
            .save(&paths.catalog())
            .map_err(|e| EngineError::Ingestion(format!("persist catalog: {e}")))?;

        // Asset persistence is advisory: the vector and the record are
        // already durable, so a failed image write only costs the file.
        if request.persist_asset {
            let dir = paths.posters_dir();
            let result = std::fs::create_dir_all(&dir)
                .and_then(|_| std::fs::write(dir.join(&filename), &request.image));
            if let Err(e) = result {
                warn!(key = %key, error = %e, "failed to persist poster asset");
            }
        }

        let vector_count = state.index.len();
        info!(key = %key, id, was_renamed, vector_count, "poster ingested");

        Ok(IngestReceipt {
            key,
            was_renamed,
            vector_count,
        })
    }
}
