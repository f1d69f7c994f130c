//! Poster identification engine: exact similarity search over a local
//! dataset, with a vision fallback and metadata/theme enrichment.

pub mod dataset;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod merge;
pub mod sniff;
pub mod sources;
pub mod types;

/// Minimum top-neighbor similarity for the index to be trusted.
pub const DEFAULT_TRUST_THRESHOLD: f32 = 0.70;

/// Neighbors retrieved per identify request.
pub const NEIGHBORS: usize = 3;

pub use dataset::{Dataset, DatasetPaths};
pub use engine::{Engine, EngineBuilder};
pub use error::EngineError;
pub use merge::merge_themes;
pub use sniff::{sniff, ImageFormat};
pub use sources::{FallbackIdentifier, FallbackVerdict, MetadataSource, ThemeSource};
pub use types::{
    Identification, IdentifyOptions, IdentifyReport, IndexStats, IngestReceipt, IngestRequest,
    MatchCandidate, VerifyReport,
};
