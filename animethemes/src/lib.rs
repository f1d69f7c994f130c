pub mod client;
pub mod error;
pub mod matching;
pub mod types;

pub use client::{Client, DEFAULT_API_URL, ThemeCollection, ThemeTrack};
pub use error::ThemesError;
pub use matching::{is_title_match, normalize_tokens};
