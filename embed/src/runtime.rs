//! Process-wide embedder singleton.
//!
//! Standing up the embedding backend is the expensive part of the
//! pipeline (model weights on the sidecar, connection pool here), so it
//! is installed once per process and shared. Initialization is explicit
//! and failure leaves the slot empty; callers check `is_ready` instead
//! of discovering an implicit import-time side effect.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::info;

use crate::embed::ImageEmbedder;
use crate::error::EmbedError;

static EMBEDDER: OnceCell<Arc<dyn ImageEmbedder>> = OnceCell::new();

/// Install the process-wide embedder. Returns an error if one is
/// already installed.
pub fn init(embedder: Arc<dyn ImageEmbedder>) -> Result<(), EmbedError> {
    let dim = embedder.dimension();
    EMBEDDER
        .set(embedder)
        .map_err(|_| EmbedError::AlreadyInitialized)?;
    info!(dim, "embedder installed");
    Ok(())
}

/// True once `init` has succeeded.
pub fn is_ready() -> bool {
    EMBEDDER.get().is_some()
}

/// The installed embedder, or `EmbedError::NotReady` when
/// initialization has not happened (or failed and was never retried).
pub fn get() -> Result<Arc<dyn ImageEmbedder>, EmbedError> {
    EMBEDDER.get().cloned().ok_or(EmbedError::NotReady)
}
