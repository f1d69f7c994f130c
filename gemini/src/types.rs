use serde::Deserialize;

/// Result of the poster identification prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct PosterIdentification {
    /// Series title when recognized; otherwise a short description of
    /// what the image actually shows.
    #[serde(default)]
    pub title: String,

    /// Whether the model judged the image to belong to the expected
    /// domain (anime / manga / donghua).
    #[serde(rename = "isAnime", default)]
    pub is_anime: bool,

    /// "High", "Medium" or "Low".
    #[serde(default = "default_confidence")]
    pub confidence: String,
}

fn default_confidence() -> String {
    "Medium".to_string()
}

/// One song as reported by the model.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Song {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
}

/// Themes for one season as reported by the model.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SeasonCollection {
    #[serde(rename = "seasonName", default = "default_season")]
    pub season_name: String,
    #[serde(default)]
    pub openings: Vec<Song>,
    #[serde(default)]
    pub endings: Vec<Song>,
    #[serde(default)]
    pub osts: Vec<Song>,
}

fn default_season() -> String {
    "General".to_string()
}
