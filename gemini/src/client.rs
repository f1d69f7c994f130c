use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::error::GeminiError;
use crate::types::{PosterIdentification, SeasonCollection};

/// Default Generative Language API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for identification and theme prompts.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const IDENTIFY_PROMPT: &str = r#"Analyze this image. It is likely an anime poster or screenshot.

Tasks:
1. Determine if this image is related to Anime, Manga, or Donghua (Chinese animation).
2. Identify the official series title accurately.
3. If there is text in the image (Japanese or English), use it to confirm the title.

If the image is NOT anime (e.g., a real photo, a car, a landscape, Western cartoon, or random object):
- Set 'isAnime' to false.
- Set 'title' to a brief description of what the image is (e.g., "Photograph of a cat").

If it IS anime:
- Set 'isAnime' to true.
- Return the official English title if available, otherwise the Romaji title.

Return a JSON object with these exact keys: title, isAnime, confidence (High/Medium/Low)."#;

/// Gemini client for poster identification and supplemental theme
/// lookups.
///
/// All calls are single-shot `generateContent` requests with a JSON
/// response mime type; there is no streaming and no retry.
pub struct Client {
    http: ReqwestClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl Client {
    pub fn new(api_key: impl Into<String>) -> Result<Self, GeminiError> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    async fn generate(&self, contents: Value) -> Result<String, GeminiError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = json!({
            "contents": contents,
            "generationConfig": { "response_mime_type": "application/json" },
        });

        let resp = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GeminiError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(GeminiError::Api(format!("HTTP {status}: {text}")));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| GeminiError::Api(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or(GeminiError::EmptyResponse)
    }

    /// Identify the series shown on a poster image.
    ///
    /// `is_anime == false` in the result means the model recognized the
    /// image as something outside the domain; `title` then describes
    /// what it saw instead.
    pub async fn identify_poster(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<PosterIdentification, GeminiError> {
        let contents = json!([{
            "parts": [
                { "text": IDENTIFY_PROMPT },
                { "inline_data": { "mime_type": mime_type, "data": BASE64.encode(image) } },
            ]
        }]);

        let text = self.generate(contents).await?;
        serde_json::from_str(&text).map_err(|e| GeminiError::Malformed(e.to_string()))
    }

    /// Fetch supplemental themes (iconic insert songs and OSTs) for a
    /// series. An unusable answer degrades to an empty list; this is a
    /// best-effort enrichment source.
    pub async fn supplemental_themes(
        &self,
        title: &str,
    ) -> Result<Vec<SeasonCollection>, GeminiError> {
        let prompt = format!(
            r#"For the anime series "{title}", identify the most iconic "Insert Songs" and "Original Soundtracks (OSTs)" that are emotionally significant or viral.

Examples of what we are looking for:
- "I Really Want to Stay at Your House" (Cyberpunk: Edgerunners)
- "Komm, susser Tod" (End of Evangelion)
- "Vogel im Kafig" (Attack on Titan)
- "Libera Me From Hell" (Gurren Lagann)

Instructions:
1. Focus heavily on the 'osts' array. Include vocal insert songs and main themes here.
2. Also list the main Openings and Endings if you know them (as a fallback).
3. Group by Season/Arc if possible (e.g., "Season 1").

Return a JSON array of season objects. Each object must have:
- seasonName (string)
- openings (array of objects with title and artist)
- endings (array of objects with title and artist)
- osts (array of objects with title and artist)"#
        );

        let contents = json!([{ "parts": [{ "text": prompt }] }]);
        let text = self.generate(contents).await?;

        match serde_json::from_str(&text) {
            Ok(seasons) => Ok(seasons),
            Err(e) => {
                warn!(error = %e, "unparseable supplemental themes answer");
                Ok(vec![])
            }
        }
    }

    /// Find an embeddable YouTube video id for a song query. Returns
    /// `None` when the answer carries nothing that looks like an id.
    pub async fn find_video_id(&self, query: &str) -> Result<Option<String>, GeminiError> {
        let prompt = format!(
            r#"Find a valid YouTube video ID for the anime song query: "{query}".

CRITICAL INSTRUCTIONS FOR EMBEDDING:
The user will watch this video in an embedded iframe on a 3rd party site.

1. **AVOID** "Official Music Videos" (MVs) from VEVO or major artist channels. They block embedding (Error 150/153).
2. **PRIORITIZE** "Topic" channel uploads (Auto-generated by YouTube) as they are usually embed-friendly.
3. **PRIORITIZE** "Lyric Videos" or fan uploads.
4. Search specifically for "Topic" or "Audio" versions if an MV exists.

Extract ONLY the 11-character YouTube video ID. Return ONLY the ID string, no other text."#
        );

        let contents = json!([{ "parts": [{ "text": prompt }] }]);
        let text = self.generate(contents).await?;
        Ok(extract_video_id(&text))
    }
}

// Word boundaries keep the pattern from slicing 11 characters out of a
// longer token.
static VIDEO_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-zA-Z0-9_-]{11}\b").expect("video id pattern"));

/// Pull the first 11-character video id out of a model answer.
pub fn extract_video_id(text: &str) -> Option<String> {
    VIDEO_ID_RE.find(text).map(|m| m.as_str().to_string())
}

/// Builder for the Gemini client.
pub struct ClientBuilder {
    api_key: String,
    model: String,
    base_url: String,
}

impl ClientBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn build(self) -> Result<Client, GeminiError> {
        if self.api_key.is_empty() {
            return Err(GeminiError::Config);
        }
        let http = ReqwestClient::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GeminiError::Http(e.to_string()))?;
        Ok(Client {
            http,
            api_key: self.api_key,
            model: self.model,
            base_url: self.base_url,
        })
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_api_key() {
        assert!(matches!(Client::new(""), Err(GeminiError::Config)));
        assert!(Client::new("key").is_ok());
    }

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("The ID is dQw4w9WgXcQ."),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("no id here"), None);
        // Longer tokens must not be sliced.
        assert_eq!(extract_video_id("abcdefghijklmnop"), None);
    }

    #[test]
    fn test_generate_response_parsing() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"title\": \"Akira\", \"isAnime\": true}"}]}}
            ]
        }"#;
        let r: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(r.candidates.len(), 1);
        assert!(r.candidates[0].content.parts[0].text.contains("Akira"));
    }
}
