//! Trait seams for the external collaborators.
//!
//! The orchestrator only talks to these traits; the concrete API clients
//! plug in behind them, and tests substitute canned implementations.

use animikyoku_animethemes::{ThemeCollection, ThemeTrack};
use async_trait::async_trait;
use tracing::warn;

use crate::error::EngineError;

/// What the vision fallback said about a poster.
#[derive(Debug, Clone)]
pub struct FallbackVerdict {
    pub title: String,
    pub is_anime: bool,
    pub confidence: String,
}

/// A vision model that names a poster when the index cannot.
#[async_trait]
pub trait FallbackIdentifier: Send + Sync {
    async fn identify(&self, image: &[u8], mime: &str) -> Result<FallbackVerdict, EngineError>;
}

/// Canonical metadata lookup by title.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn lookup(&self, title: &str) -> Result<animikyoku_anilist::Media, EngineError>;
}

/// A provider of theme collections for a title.
///
/// Theme lookups are best-effort: a provider that fails logs the failure
/// and contributes nothing, it never fails the identify request.
#[async_trait]
pub trait ThemeSource: Send + Sync {
    async fn themes(&self, title: &str) -> Vec<ThemeCollection>;
}

#[async_trait]
impl FallbackIdentifier for animikyoku_gemini::Client {
    async fn identify(&self, image: &[u8], mime: &str) -> Result<FallbackVerdict, EngineError> {
        let id = self
            .identify_poster(image, mime)
            .await
            .map_err(|e| EngineError::Fallback(e.to_string()))?;
        Ok(FallbackVerdict {
            title: id.title,
            is_anime: id.is_anime,
            confidence: id.confidence,
        })
    }
}

#[async_trait]
impl MetadataSource for animikyoku_anilist::Client {
    async fn lookup(&self, title: &str) -> Result<animikyoku_anilist::Media, EngineError> {
        self.fetch_anime(title)
            .await
            .map_err(|e| EngineError::Metadata(e.to_string()))
    }
}

#[async_trait]
impl ThemeSource for animikyoku_animethemes::Client {
    async fn themes(&self, title: &str) -> Vec<ThemeCollection> {
        match self.fetch_themes(title).await {
            Ok(collections) => collections,
            Err(e) => {
                warn!(title, error = %e, "theme database lookup failed");
                vec![]
            }
        }
    }
}

#[async_trait]
impl ThemeSource for animikyoku_gemini::Client {
    async fn themes(&self, title: &str) -> Vec<ThemeCollection> {
        match self.supplemental_themes(title).await {
            Ok(seasons) => seasons.into_iter().map(season_to_collection).collect(),
            Err(e) => {
                warn!(title, error = %e, "supplemental theme lookup failed");
                vec![]
            }
        }
    }
}

/// Model-supplied seasons carry no video links.
fn season_to_collection(season: animikyoku_gemini::SeasonCollection) -> ThemeCollection {
    let to_tracks = |songs: Vec<animikyoku_gemini::Song>| {
        songs
            .into_iter()
            .map(|s| ThemeTrack {
                title: s.title,
                artist: s.artist,
                video_url: None,
            })
            .collect()
    };
    ThemeCollection {
        season_name: season.season_name,
        openings: to_tracks(season.openings),
        endings: to_tracks(season.endings),
        osts: to_tracks(season.osts),
    }
}
