use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance records how a catalog entry came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Confirmed result of the automatic fallback identifier.
    #[serde(rename = "fallback_confirmed")]
    FallbackConfirmed,

    /// A user corrected a misidentification.
    #[serde(rename = "user_correction")]
    UserCorrection,

    /// Entered by an operator.
    #[serde(rename = "manual")]
    Manual,

    /// Produced by an offline index rebuild.
    #[serde(rename = "rebuild")]
    Rebuild,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::FallbackConfirmed => f.write_str("fallback_confirmed"),
            Provenance::UserCorrection => f.write_str("user_correction"),
            Provenance::Manual => f.write_str("manual"),
            Provenance::Rebuild => f.write_str("rebuild"),
        }
    }
}

/// PosterRecord is one catalog entry, keyed by its slug.
///
/// A record carrying an embedding snapshot corresponds to exactly one
/// index entry with the same key; the snapshot exists so the index order
/// can be rebuilt offline without re-embedding every poster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosterRecord {
    /// Canonical display title, e.g. "Steins;Gate".
    #[serde(rename = "title")]
    pub title: String,

    /// Normalized key, identical to the map key this record sits under.
    #[serde(rename = "slug")]
    pub slug: String,

    /// Relative path to the stored poster asset, if one was persisted.
    #[serde(rename = "path", default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Season number, when known.
    #[serde(rename = "season", default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,

    /// Snapshot of the embedding held by the index under the same key.
    #[serde(rename = "embedding", default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// Ingestion timestamp.
    #[serde(rename = "added_at")]
    pub added_at: DateTime<Utc>,

    /// How this record was created.
    #[serde(rename = "source")]
    pub source: Provenance,

    /// Free-text note.
    #[serde(rename = "notes", default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}
