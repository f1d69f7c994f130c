//! End-to-end pipeline tests with stubbed collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use animikyoku_anilist::{Media, MediaTitle};
use animikyoku_animethemes::{ThemeCollection, ThemeTrack};
use animikyoku_catalog::Provenance;
use animikyoku_embed::{EmbedError, ImageEmbedder};
use animikyoku_engine::{
    Dataset, DatasetPaths, Engine, EngineError, FallbackIdentifier, FallbackVerdict,
    Identification, IdentifyOptions, IngestRequest, MetadataSource, ThemeSource,
};
use async_trait::async_trait;

const DIM: usize = 4;

/// The byte after the JPEG magic picks the embedding:
/// 0..=3 select a basis vector, 9 is a vector at 0.35 similarity to
/// basis 0, and 8 is a vector at exactly 0.70 similarity to basis 0.
struct StubEmbedder;

#[async_trait]
impl ImageEmbedder for StubEmbedder {
    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>, EmbedError> {
        let tag = image.get(3).copied().unwrap_or(0);
        Ok(match tag {
            9 => vec![0.35, (1.0f32 - 0.35 * 0.35).sqrt(), 0.0, 0.0],
            8 => vec![0.70, (1.0f32 - 0.70 * 0.70).sqrt(), 0.0, 0.0],
            t => {
                let mut v = vec![0.0; DIM];
                v[t as usize % DIM] = 1.0;
                v
            }
        })
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

struct StubFallback {
    verdict: FallbackVerdict,
    calls: AtomicUsize,
}

impl StubFallback {
    fn recognizing(title: &str) -> Arc<Self> {
        Arc::new(Self {
            verdict: FallbackVerdict {
                title: title.to_string(),
                is_anime: true,
                confidence: "High".to_string(),
            },
            calls: AtomicUsize::new(0),
        })
    }

    fn declining(detected: &str) -> Arc<Self> {
        Arc::new(Self {
            verdict: FallbackVerdict {
                title: detected.to_string(),
                is_anime: false,
                confidence: "High".to_string(),
            },
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FallbackIdentifier for StubFallback {
    async fn identify(&self, _image: &[u8], _mime: &str) -> Result<FallbackVerdict, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.verdict.clone())
    }
}

struct StubMetadata;

#[async_trait]
impl MetadataSource for StubMetadata {
    async fn lookup(&self, _title: &str) -> Result<Media, EngineError> {
        Ok(Media {
            id: 9253,
            title: MediaTitle {
                romaji: Some("Steins;Gate".into()),
                english: Some("Steins;Gate".into()),
                native: None,
            },
            ..Default::default()
        })
    }
}

struct StubThemes {
    collections: Vec<ThemeCollection>,
}

#[async_trait]
impl ThemeSource for StubThemes {
    async fn themes(&self, _title: &str) -> Vec<ThemeCollection> {
        self.collections.clone()
    }
}

fn track(title: &str) -> ThemeTrack {
    ThemeTrack {
        title: title.to_string(),
        artist: "artist".to_string(),
        video_url: None,
    }
}

fn jpeg(tag: u8) -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, tag]
}

fn open_dataset(dir: &std::path::Path) -> Arc<Dataset> {
    Arc::new(Dataset::open(DatasetPaths::new(dir), DIM).unwrap())
}

fn index_only_engine(dir: &std::path::Path) -> Engine {
    Engine::builder()
        .dataset(open_dataset(dir))
        .embedder(Arc::new(StubEmbedder))
        .build()
        .unwrap()
}

#[tokio::test]
async fn empty_index_without_fallback_is_no_match() {
    let dir = tempfile::tempdir().unwrap();
    let engine = index_only_engine(dir.path());

    let report = engine
        .identify(&jpeg(0), IdentifyOptions::default())
        .await
        .unwrap();
    assert!(report.candidates.is_empty());
    assert!(matches!(
        report.identification,
        Identification::NoMatch {
            best_similarity: None,
            ..
        }
    ));
    assert!(report.anime.is_none());
    assert!(report.themes.is_empty());
}

#[tokio::test]
async fn ingested_poster_matches_itself() {
    let dir = tempfile::tempdir().unwrap();
    let engine = index_only_engine(dir.path());

    engine
        .ingest(IngestRequest::new(jpeg(0), "Steins;Gate", Provenance::Manual))
        .await
        .unwrap();

    let report = engine
        .identify(&jpeg(0), IdentifyOptions::default())
        .await
        .unwrap();
    match report.identification {
        Identification::IndexMatch {
            key,
            title,
            similarity,
        } => {
            assert_eq!(key, "steins_gate");
            assert_eq!(title, "Steins;Gate");
            assert!(similarity >= 0.99, "got {similarity}");
        }
        other => panic!("expected index match, got {other:?}"),
    }
}

#[tokio::test]
async fn trusted_match_never_calls_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = StubFallback::recognizing("Should Not Be Asked");
    let engine = Engine::builder()
        .dataset(open_dataset(dir.path()))
        .embedder(Arc::new(StubEmbedder))
        .fallback(fallback.clone())
        .build()
        .unwrap();

    engine
        .ingest(IngestRequest::new(jpeg(0), "Akira", Provenance::Manual))
        .await
        .unwrap();
    let report = engine
        .identify(&jpeg(0), IdentifyOptions::default())
        .await
        .unwrap();

    assert!(matches!(
        report.identification,
        Identification::IndexMatch { .. }
    ));
    assert_eq!(fallback.call_count(), 0);
}

#[tokio::test]
async fn untrusted_match_falls_back_and_enriches() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = StubFallback::recognizing("Steins;Gate");
    let engine = Engine::builder()
        .dataset(open_dataset(dir.path()))
        .embedder(Arc::new(StubEmbedder))
        .fallback(fallback.clone())
        .metadata(Arc::new(StubMetadata))
        .primary_themes(Arc::new(StubThemes {
            collections: vec![ThemeCollection {
                season_name: "Steins;Gate".into(),
                openings: vec![track("Hacking to the Gate")],
                endings: vec![],
                osts: vec![],
            }],
        }))
        .supplemental_themes(Arc::new(StubThemes {
            collections: vec![ThemeCollection {
                season_name: "Movie".into(),
                openings: vec![],
                endings: vec![],
                osts: vec![track("Gate of Steiner")],
            }],
        }))
        .build()
        .unwrap();

    engine
        .ingest(IngestRequest::new(jpeg(0), "Akira", Provenance::Manual))
        .await
        .unwrap();

    // Tag 9 embeds at 0.35 similarity to the stored poster.
    let report = engine
        .identify(&jpeg(9), IdentifyOptions::default())
        .await
        .unwrap();

    match &report.identification {
        Identification::FallbackMatch { title, confidence } => {
            assert_eq!(title, "Steins;Gate");
            assert_eq!(confidence, "High");
        }
        other => panic!("expected fallback match, got {other:?}"),
    }
    assert_eq!(fallback.call_count(), 1);

    // The untrusted neighbor is still reported as a candidate.
    assert_eq!(report.candidates.len(), 1);
    assert!((report.candidates[0].similarity - 0.35).abs() < 1e-4);

    assert_eq!(report.anime.as_ref().unwrap().id, 9253);
    assert_eq!(report.themes.len(), 1);
    assert_eq!(report.themes[0].openings[0].title, "Hacking to the Gate");
    assert_eq!(report.themes[0].osts[0].title, "Gate of Steiner");
}

#[tokio::test]
async fn fallback_decline_is_not_recognized_and_skips_enrichment() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::builder()
        .dataset(open_dataset(dir.path()))
        .embedder(Arc::new(StubEmbedder))
        .fallback(StubFallback::declining("a photograph of a cat"))
        .metadata(Arc::new(StubMetadata))
        .build()
        .unwrap();

    let report = engine
        .identify(&jpeg(0), IdentifyOptions::default())
        .await
        .unwrap();
    match &report.identification {
        Identification::NotRecognized { detected } => {
            assert_eq!(detected, "a photograph of a cat");
        }
        other => panic!("expected not recognized, got {other:?}"),
    }
    assert!(report.anime.is_none());
    assert!(report.themes.is_empty());
}

#[tokio::test]
async fn similarity_at_threshold_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = StubFallback::recognizing("unused");
    let engine = Engine::builder()
        .dataset(open_dataset(dir.path()))
        .embedder(Arc::new(StubEmbedder))
        .fallback(fallback.clone())
        .build()
        .unwrap();

    engine
        .ingest(IngestRequest::new(jpeg(0), "Akira", Provenance::Manual))
        .await
        .unwrap();

    // Tag 8 embeds at exactly the default threshold.
    let report = engine
        .identify(&jpeg(8), IdentifyOptions::default())
        .await
        .unwrap();
    assert!(
        matches!(report.identification, Identification::IndexMatch { .. }),
        "similarity equal to the threshold must be trusted"
    );
    assert_eq!(fallback.call_count(), 0);
}

#[tokio::test]
async fn index_only_option_suppresses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = StubFallback::recognizing("unused");
    let engine = Engine::builder()
        .dataset(open_dataset(dir.path()))
        .embedder(Arc::new(StubEmbedder))
        .fallback(fallback.clone())
        .build()
        .unwrap();

    let opts = IdentifyOptions {
        index_only: true,
        ..Default::default()
    };
    let report = engine.identify(&jpeg(0), opts).await.unwrap();
    assert!(matches!(
        report.identification,
        Identification::NoMatch { .. }
    ));
    assert_eq!(fallback.call_count(), 0);
}

#[tokio::test]
async fn custom_threshold_changes_the_decision() {
    let dir = tempfile::tempdir().unwrap();
    let engine = index_only_engine(dir.path());

    engine
        .ingest(IngestRequest::new(jpeg(0), "Akira", Provenance::Manual))
        .await
        .unwrap();

    // 0.35 similarity fails the default threshold but clears 0.3.
    let opts = IdentifyOptions {
        index_only: false,
        threshold: 0.3,
    };
    let report = engine.identify(&jpeg(9), opts).await.unwrap();
    assert!(matches!(
        report.identification,
        Identification::IndexMatch { .. }
    ));
}

#[tokio::test]
async fn reopened_dataset_survives_lost_mapping() {
    let dir = tempfile::tempdir().unwrap();
    {
        let engine = index_only_engine(dir.path());
        engine
            .ingest(IngestRequest::new(jpeg(0), "Steins;Gate", Provenance::Manual))
            .await
            .unwrap();
        engine
            .ingest(IngestRequest::new(jpeg(1), "Akira", Provenance::Manual))
            .await
            .unwrap();
    }

    std::fs::remove_file(DatasetPaths::new(dir.path()).mapping()).unwrap();

    let engine = index_only_engine(dir.path());
    let stats = engine.stats().await;
    assert_eq!(stats.vector_count, 2);
    assert!(stats.healthy);

    let report = engine
        .identify(&jpeg(1), IdentifyOptions::default())
        .await
        .unwrap();
    match report.identification {
        Identification::IndexMatch { key, .. } => assert_eq!(key, "akira"),
        other => panic!("expected index match after rebuild, got {other:?}"),
    }
}

#[tokio::test]
async fn verify_reports_the_top_key() {
    let dir = tempfile::tempdir().unwrap();
    let engine = index_only_engine(dir.path());

    engine
        .ingest(IngestRequest::new(jpeg(0), "Steins;Gate", Provenance::Manual))
        .await
        .unwrap();
    engine
        .ingest(IngestRequest::new(jpeg(1), "Akira", Provenance::Manual))
        .await
        .unwrap();

    let report = engine.verify(&jpeg(0), "steins_gate").await.unwrap();
    assert!(report.verified);
    assert_eq!(report.top.as_ref().unwrap().key, "steins_gate");

    let report = engine.verify(&jpeg(0), "akira").await.unwrap();
    assert!(!report.verified);
}
