pub mod client;
pub mod error;
pub mod types;

pub use client::{Client, DEFAULT_API_URL};
pub use error::AniListError;
pub use types::{CoverImage, Media, MediaTitle};
