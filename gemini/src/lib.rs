pub mod client;
pub mod error;
pub mod types;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL, DEFAULT_MODEL, extract_video_id};
pub use error::GeminiError;
pub use types::{PosterIdentification, SeasonCollection, Song};
