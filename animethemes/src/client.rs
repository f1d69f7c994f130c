use std::time::Duration;

use reqwest::Client as ReqwestClient;
use tracing::debug;

use crate::error::ThemesError;
use crate::matching::is_title_match;
use crate::types::{Anime, AnimeIndex};

/// Default AnimeThemes REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.animethemes.moe/anime";

/// Base URL for direct theme video files.
const VIDEO_BASE_URL: &str = "https://v.animethemes.moe";

/// One theme track with an optional direct video URL.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ThemeTrack {
    pub title: String,
    pub artist: String,
    pub video_url: Option<String>,
}

/// Themes for one season or entry, grouped by role.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ThemeCollection {
    pub season_name: String,
    pub openings: Vec<ThemeTrack>,
    pub endings: Vec<ThemeTrack>,
    pub osts: Vec<ThemeTrack>,
}

impl ThemeCollection {
    pub fn is_empty(&self) -> bool {
        self.openings.is_empty() && self.endings.is_empty() && self.osts.is_empty()
    }
}

/// AnimeThemes REST client.
pub struct Client {
    http: ReqwestClient,
    api_url: String,
}

impl Client {
    pub fn new() -> Result<Self, ThemesError> {
        Self::with_api_url(DEFAULT_API_URL)
    }

    pub fn with_api_url(api_url: &str) -> Result<Self, ThemesError> {
        let http = ReqwestClient::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ThemesError::Http(e.to_string()))?;
        Ok(Self {
            http,
            api_url: api_url.to_string(),
        })
    }

    /// Fetch theme collections for a title.
    ///
    /// The upstream search is fuzzy, so results are re-filtered by
    /// token-subset title match against the name and its synonyms. A 404
    /// or an empty/unmatched result set yields an empty list, which is a
    /// normal outcome — the secondary source may still contribute.
    pub async fn fetch_themes(&self, title: &str) -> Result<Vec<ThemeCollection>, ThemesError> {
        let resp = self
            .http
            .get(&self.api_url)
            .query(&[
                ("q", title),
                (
                    "include",
                    "animethemes.song.artists,animethemes.animethemeentries.videos,animesynonyms",
                ),
                ("limit", "6"),
            ])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ThemesError::Http(e.to_string()))?;

        if resp.status().as_u16() == 404 {
            return Ok(vec![]);
        }
        if !resp.status().is_success() {
            return Err(ThemesError::Api(format!("HTTP {}", resp.status())));
        }

        let index: AnimeIndex = resp
            .json()
            .await
            .map_err(|e| ThemesError::Api(e.to_string()))?;

        let matched: Vec<&Anime> = index
            .anime
            .iter()
            .filter(|a| {
                is_title_match(title, &a.name)
                    || a.animesynonyms
                        .iter()
                        .any(|s| is_title_match(title, &s.text))
            })
            .collect();

        debug!(
            candidates = index.anime.len(),
            matched = matched.len(),
            "filtered theme search results"
        );

        Ok(matched.into_iter().filter_map(map_anime).collect())
    }
}

/// Map one upstream anime entry into a collection; `None` when it
/// carries no usable themes.
fn map_anime(anime: &Anime) -> Option<ThemeCollection> {
    let mut col = ThemeCollection {
        season_name: if anime.name.is_empty() {
            "Unknown".to_string()
        } else {
            anime.name.clone()
        },
        ..Default::default()
    };

    for theme in &anime.animethemes {
        let (title, artist) = match &theme.song {
            Some(song) => {
                let title = song
                    .title
                    .clone()
                    .unwrap_or_else(|| "Unknown Title".to_string());
                let artist = if song.artists.is_empty() {
                    "Unknown Artist".to_string()
                } else {
                    song.artists
                        .iter()
                        .map(|a| a.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                (title, artist)
            }
            None => ("Unknown Title".to_string(), "Unknown Artist".to_string()),
        };

        let video_url = theme
            .animethemeentries
            .first()
            .and_then(|e| e.videos.first())
            .map(|v| format!("{VIDEO_BASE_URL}/{}", v.basename));

        let track = ThemeTrack {
            title,
            artist,
            video_url,
        };

        match theme.theme_type.as_str() {
            "OP" => col.openings.push(track),
            "ED" => col.endings.push(track),
            // Insert songs land with the OSTs.
            "IN" => col.osts.push(track),
            _ => {}
        }
    }

    (!col.is_empty()).then_some(col)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "anime": [
            {
                "name": "Steins;Gate",
                "animesynonyms": [{"text": "SG"}],
                "animethemes": [
                    {
                        "type": "OP",
                        "song": {"title": "Hacking to the Gate", "artists": [{"name": "Kanako Ito"}]},
                        "animethemeentries": [{"videos": [{"basename": "SteinsGate-OP1.webm"}]}]
                    },
                    {
                        "type": "IN",
                        "song": {"title": "Sky Clad no Kansokusha", "artists": []},
                        "animethemeentries": []
                    }
                ]
            },
            {
                "name": "Completely Unrelated Show",
                "animesynonyms": [],
                "animethemes": [
                    {"type": "OP", "song": {"title": "X", "artists": []}, "animethemeentries": []}
                ]
            }
        ]
    }"#;

    #[test]
    fn test_map_anime_roles_and_video_url() {
        let index: AnimeIndex = serde_json::from_str(SAMPLE).unwrap();
        let col = map_anime(&index.anime[0]).unwrap();

        assert_eq!(col.season_name, "Steins;Gate");
        assert_eq!(col.openings.len(), 1);
        assert_eq!(col.openings[0].artist, "Kanako Ito");
        assert_eq!(
            col.openings[0].video_url.as_deref(),
            Some("https://v.animethemes.moe/SteinsGate-OP1.webm")
        );
        assert_eq!(col.osts.len(), 1);
        assert_eq!(col.osts[0].artist, "Unknown Artist");
        assert!(col.osts[0].video_url.is_none());
    }

    #[test]
    fn test_map_anime_empty_is_none() {
        let anime: Anime = serde_json::from_str(
            r#"{"name": "Nothing", "animesynonyms": [], "animethemes": []}"#,
        )
        .unwrap();
        assert!(map_anime(&anime).is_none());
    }
}
