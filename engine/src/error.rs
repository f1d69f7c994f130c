use thiserror::Error;

/// Engine-level failures.
///
/// `Embed` means the pipeline aborted before any state changed.
/// `Ingestion` means the critical section started; in-memory or on-disk
/// state may have partially changed and the next startup reconciles it.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine: invalid image: {0}")]
    InvalidImage(String),

    #[error("engine: contract violation: {0}")]
    Contract(String),

    #[error("engine: index error: {0}")]
    Index(#[from] animikyoku_vecstore::VecError),

    #[error("engine: catalog error: {0}")]
    Catalog(#[from] animikyoku_catalog::CatalogError),

    #[error("engine: embedding error: {0}")]
    Embed(#[from] animikyoku_embed::EmbedError),

    #[error("engine: fallback identifier failed: {0}")]
    Fallback(String),

    #[error("engine: metadata lookup failed: {0}")]
    Metadata(String),

    #[error("engine: ingestion failed: {0}")]
    Ingestion(String),
}
