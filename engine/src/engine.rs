use std::sync::Arc;

use animikyoku_embed::ImageEmbedder;
use animikyoku_vecstore::VecError;
use tracing::{debug, error, info};

use crate::dataset::Dataset;
use crate::error::EngineError;
use crate::merge::merge_themes;
use crate::sniff;
use crate::sources::{FallbackIdentifier, MetadataSource, ThemeSource};
use crate::types::{
    Identification, IdentifyOptions, IdentifyReport, IndexStats, MatchCandidate, VerifyReport,
};
use crate::NEIGHBORS;

/// Engine wires the dataset, the embedder, and the external sources into
/// the identify and ingest pipelines.
pub struct Engine {
    pub(crate) dataset: Arc<Dataset>,
    pub(crate) embedder: Arc<dyn ImageEmbedder>,
    fallback: Option<Arc<dyn FallbackIdentifier>>,
    metadata: Option<Arc<dyn MetadataSource>>,
    primary_themes: Option<Arc<dyn ThemeSource>>,
    supplemental_themes: Option<Arc<dyn ThemeSource>>,
}

#[derive(Default)]
pub struct EngineBuilder {
    dataset: Option<Arc<Dataset>>,
    embedder: Option<Arc<dyn ImageEmbedder>>,
    fallback: Option<Arc<dyn FallbackIdentifier>>,
    metadata: Option<Arc<dyn MetadataSource>>,
    primary_themes: Option<Arc<dyn ThemeSource>>,
    supplemental_themes: Option<Arc<dyn ThemeSource>>,
}

impl EngineBuilder {
    pub fn dataset(mut self, dataset: Arc<Dataset>) -> Self {
        self.dataset = Some(dataset);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn ImageEmbedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn fallback(mut self, fallback: Arc<dyn FallbackIdentifier>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn metadata(mut self, metadata: Arc<dyn MetadataSource>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn primary_themes(mut self, source: Arc<dyn ThemeSource>) -> Self {
        self.primary_themes = Some(source);
        self
    }

    pub fn supplemental_themes(mut self, source: Arc<dyn ThemeSource>) -> Self {
        self.supplemental_themes = Some(source);
        self
    }

    /// A dataset and an embedder are required; everything else degrades
    /// to index-only identification when absent.
    pub fn build(self) -> Result<Engine, EngineError> {
        let dataset = self
            .dataset
            .ok_or_else(|| EngineError::Contract("no dataset configured".into()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| EngineError::Contract("no embedder configured".into()))?;
        if embedder.dimension() != dataset.dimension() {
            return Err(EngineError::Contract(format!(
                "embedder dimension {} does not match dataset {}",
                embedder.dimension(),
                dataset.dimension()
            )));
        }
        Ok(Engine {
            dataset,
            embedder,
            fallback: self.fallback,
            metadata: self.metadata,
            primary_themes: self.primary_themes,
            supplemental_themes: self.supplemental_themes,
        })
    }
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Identify a poster image.
    ///
    /// The index is consulted first; a top neighbor at or above the
    /// trust threshold is accepted without touching any external service.
    /// Otherwise the fallback identifier (when configured and not
    /// disabled per request) names the title. Accepted titles are
    /// enriched with canonical metadata and merged theme collections.
    pub async fn identify(
        &self,
        image: &[u8],
        opts: IdentifyOptions,
    ) -> Result<IdentifyReport, EngineError> {
        let format = sniff::sniff(image).ok_or_else(|| {
            EngineError::InvalidImage("payload is not a JPEG, PNG, or WEBP image".into())
        })?;

        let query = self.embedder.embed_image(image).await?;

        let (candidates, index_title) = {
            let state = self.dataset.state.read().await;
            let hits = match state.index.search(&query, NEIGHBORS, 0.0) {
                Ok(hits) => hits,
                Err(e @ VecError::MappingMismatch { .. }) => {
                    // Integrity breach: refuse the index, let the
                    // fallback carry the request.
                    error!(error = %e, "index refused search, treating as no results");
                    vec![]
                }
                Err(e) => return Err(e.into()),
            };
            let candidates: Vec<MatchCandidate> = hits
                .iter()
                .map(|h| MatchCandidate {
                    key: h.key.clone(),
                    similarity: h.similarity,
                })
                .collect();
            let index_title = candidates.first().map(|c| {
                state
                    .catalog
                    .get(&c.key)
                    .map(|r| r.title.clone())
                    .unwrap_or_else(|| c.key.clone())
            });
            (candidates, index_title)
        };

        let best_similarity = candidates.first().map(|c| c.similarity);
        debug!(
            ?best_similarity,
            threshold = opts.threshold,
            candidates = candidates.len(),
            "index consulted"
        );

        let identification = match (candidates.first(), best_similarity) {
            (Some(best), Some(sim)) if sim >= opts.threshold => Identification::IndexMatch {
                key: best.key.clone(),
                title: index_title.unwrap_or_else(|| best.key.clone()),
                similarity: sim,
            },
            _ => match (&self.fallback, opts.index_only) {
                (Some(fallback), false) => {
                    let verdict = fallback.identify(image, format.mime()).await?;
                    if verdict.is_anime {
                        info!(title = %verdict.title, confidence = %verdict.confidence, "fallback named the poster");
                        Identification::FallbackMatch {
                            title: verdict.title,
                            confidence: verdict.confidence,
                        }
                    } else {
                        Identification::NotRecognized {
                            detected: verdict.title,
                        }
                    }
                }
                _ => Identification::NoMatch {
                    threshold: opts.threshold,
                    best_similarity,
                },
            },
        };

        let (anime, themes) = match identification.title() {
            Some(title) => self.enrich(title).await?,
            None => (None, vec![]),
        };

        Ok(IdentifyReport {
            identification,
            candidates,
            anime,
            themes,
        })
    }

    /// Canonical metadata plus merged themes for an accepted title.
    ///
    /// Theme lookups run against the validated display title when the
    /// metadata source resolved one, and the two providers are queried
    /// concurrently.
    async fn enrich(
        &self,
        title: &str,
    ) -> Result<
        (
            Option<animikyoku_anilist::Media>,
            Vec<animikyoku_animethemes::ThemeCollection>,
        ),
        EngineError,
    > {
        let anime = match &self.metadata {
            Some(source) => Some(source.lookup(title).await?),
            None => None,
        };

        let lookup_title = anime
            .as_ref()
            .and_then(|m| m.title.preferred())
            .unwrap_or(title)
            .to_string();

        let (primary, supplemental) = tokio::join!(
            async {
                match &self.primary_themes {
                    Some(source) => source.themes(&lookup_title).await,
                    None => vec![],
                }
            },
            async {
                match &self.supplemental_themes {
                    Some(source) => source.themes(&lookup_title).await,
                    None => vec![],
                }
            }
        );

        Ok((anime, merge_themes(primary, supplemental)))
    }

    /// Check that a known poster resolves to its own key.
    pub async fn verify(&self, image: &[u8], expected_key: &str) -> Result<VerifyReport, EngineError> {
        sniff::sniff(image).ok_or_else(|| {
            EngineError::InvalidImage("payload is not a JPEG, PNG, or WEBP image".into())
        })?;
        let query = self.embedder.embed_image(image).await?;

        let state = self.dataset.state.read().await;
        let top = state
            .index
            .search(&query, 1, 0.0)?
            .into_iter()
            .next()
            .map(|h| MatchCandidate {
                key: h.key,
                similarity: h.similarity,
            });
        let verified = top.as_ref().is_some_and(|t| t.key == expected_key);

        Ok(VerifyReport {
            expected_key: expected_key.to_string(),
            top,
            verified,
        })
    }

    pub async fn stats(&self) -> IndexStats {
        self.dataset.stats().await
    }
}
