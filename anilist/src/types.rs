use serde::{Deserialize, Serialize};

/// Title variants as reported by AniList.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaTitle {
    #[serde(default)]
    pub romaji: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub native: Option<String>,
}

impl MediaTitle {
    /// Preferred display order: english, romaji, native.
    pub fn preferred(&self) -> Option<&str> {
        self.english
            .as_deref()
            .or(self.romaji.as_deref())
            .or(self.native.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverImage {
    #[serde(rename = "extraLarge", default)]
    pub extra_large: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioNode {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioConnection {
    #[serde(default)]
    pub nodes: Vec<StudioNode>,
}

/// Media is the canonical anime metadata record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Media {
    pub id: i64,
    #[serde(default)]
    pub title: MediaTitle,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "coverImage", default)]
    pub cover_image: Option<CoverImage>,
    #[serde(rename = "bannerImage", default)]
    pub banner_image: Option<String>,
    #[serde(rename = "averageScore", default)]
    pub average_score: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub episodes: Option<i32>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(rename = "seasonYear", default)]
    pub season_year: Option<i32>,
    #[serde(default)]
    pub studios: Option<StudioConnection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_title_order() {
        let t = MediaTitle {
            romaji: Some("Shingeki no Kyojin".into()),
            english: Some("Attack on Titan".into()),
            native: Some("進撃の巨人".into()),
        };
        assert_eq!(t.preferred(), Some("Attack on Titan"));

        let t = MediaTitle {
            romaji: Some("Shingeki no Kyojin".into()),
            english: None,
            native: Some("進撃の巨人".into()),
        };
        assert_eq!(t.preferred(), Some("Shingeki no Kyojin"));

        assert_eq!(MediaTitle::default().preferred(), None);
    }

    #[test]
    fn test_media_parses_api_shape() {
        let json = r##"{
            "id": 9253,
            "title": {"romaji": "Steins;Gate", "english": "Steins;Gate", "native": "シュタインズ・ゲート"},
            "description": "Time travel.",
            "coverImage": {"extraLarge": "https://x/xl.png", "large": "https://x/l.png", "color": "#e4a15d"},
            "bannerImage": null,
            "averageScore": 89,
            "genres": ["Sci-Fi", "Thriller"],
            "status": "FINISHED",
            "episodes": 24,
            "season": "SPRING",
            "seasonYear": 2011,
            "studios": {"nodes": [{"name": "White Fox"}]}
        }"##;
        let m: Media = serde_json::from_str(json).unwrap();
        assert_eq!(m.id, 9253);
        assert_eq!(m.episodes, Some(24));
        assert_eq!(m.studios.unwrap().nodes[0].name, "White Fox");
    }
}
