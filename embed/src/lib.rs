pub mod clip;
pub mod config;
pub mod embed;
pub mod error;
pub mod runtime;

pub use clip::{ClipServer, MODEL_CLIP_VIT_B_32};
pub use config::EmbedConfig;
pub use embed::{ImageEmbedder, NORM_MAX, NORM_MIN, is_unit_norm, norm};
pub use error::EmbedError;
