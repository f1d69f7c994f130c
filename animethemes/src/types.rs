use serde::Deserialize;

/// Wire types for the AnimeThemes REST response. Only the fields the
/// mapper reads are declared.

#[derive(Debug, Deserialize)]
pub struct AnimeIndex {
    #[serde(default)]
    pub anime: Vec<Anime>,
}

#[derive(Debug, Deserialize)]
pub struct Anime {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub animesynonyms: Vec<Synonym>,
    #[serde(default)]
    pub animethemes: Vec<AnimeTheme>,
}

#[derive(Debug, Deserialize)]
pub struct Synonym {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AnimeTheme {
    /// "OP", "ED" or "IN".
    #[serde(rename = "type", default)]
    pub theme_type: String,
    #[serde(default)]
    pub song: Option<ThemeSong>,
    #[serde(default)]
    pub animethemeentries: Vec<ThemeEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeSong {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

#[derive(Debug, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ThemeEntry {
    #[serde(default)]
    pub videos: Vec<Video>,
}

#[derive(Debug, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub basename: String,
}
