use animikyoku_anilist::Media;
use animikyoku_animethemes::ThemeCollection;
use animikyoku_catalog::Provenance;
use serde::Serialize;

/// One ranked neighbor from the index, with its catalog key.
#[derive(Debug, Clone, Serialize)]
pub struct MatchCandidate {
    pub key: String,
    pub similarity: f32,
}

/// How a poster was identified, if at all.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Identification {
    /// The best index neighbor cleared the trust threshold.
    IndexMatch {
        key: String,
        /// Display title from the catalog record, falling back to the key.
        title: String,
        similarity: f32,
    },
    /// The index was not trusted; the fallback identifier named the title.
    FallbackMatch {
        title: String,
        confidence: String,
    },
    /// The fallback looked at the image and declined to call it an anime poster.
    NotRecognized {
        detected: String,
    },
    /// No trusted neighbor and no fallback available (or fallback disabled).
    NoMatch {
        threshold: f32,
        best_similarity: Option<f32>,
    },
}

impl Identification {
    /// The accepted title, when identification succeeded.
    pub fn title(&self) -> Option<&str> {
        match self {
            Identification::IndexMatch { title, .. } => Some(title),
            Identification::FallbackMatch { title, .. } => Some(title),
            _ => None,
        }
    }
}

/// Full result of an identify request.
#[derive(Debug, Clone, Serialize)]
pub struct IdentifyReport {
    pub identification: Identification,
    /// Ranked neighbors that informed the decision, best first.
    pub candidates: Vec<MatchCandidate>,
    /// Canonical metadata for the accepted title, when a metadata source
    /// is configured and the lookup succeeded.
    pub anime: Option<Media>,
    /// Merged theme collections for the accepted title.
    pub themes: Vec<ThemeCollection>,
}

/// Per-request knobs for identification.
#[derive(Debug, Clone, Copy)]
pub struct IdentifyOptions {
    /// Skip the fallback identifier even when one is configured.
    pub index_only: bool,
    /// Minimum similarity for the top neighbor to be accepted.
    pub threshold: f32,
}

impl Default for IdentifyOptions {
    fn default() -> Self {
        IdentifyOptions {
            index_only: false,
            threshold: crate::DEFAULT_TRUST_THRESHOLD,
        }
    }
}

/// A poster submitted for ingestion.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub image: Vec<u8>,
    pub title: String,
    pub source: Provenance,
    pub season: Option<u32>,
    pub notes: String,
    /// Write the raw image next to the dataset. Failure to do so is
    /// logged but never fails the ingestion.
    pub persist_asset: bool,
}

impl IngestRequest {
    pub fn new(image: Vec<u8>, title: impl Into<String>, source: Provenance) -> Self {
        IngestRequest {
            image,
            title: title.into(),
            source,
            season: None,
            notes: String::new(),
            persist_asset: true,
        }
    }
}

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReceipt {
    /// Final catalog key, after collision resolution.
    pub key: String,
    /// True when the requested slug was taken and a variant was assigned.
    pub was_renamed: bool,
    /// Vector count after the addition.
    pub vector_count: usize,
}

/// Snapshot of dataset health.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub vector_count: usize,
    pub mapping_count: usize,
    pub catalog_count: usize,
    pub dimension: usize,
    /// True when the vector count and the id mapping agree.
    pub healthy: bool,
}

/// Result of checking a known poster against the index.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub expected_key: String,
    pub top: Option<MatchCandidate>,
    /// True when the nearest neighbor is the expected key.
    pub verified: bool,
}
