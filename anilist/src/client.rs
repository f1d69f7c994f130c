use std::time::Duration;

use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::error::AniListError;
use crate::types::Media;

/// Default AniList GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://graphql.anilist.co";

const ANIME_QUERY: &str = r#"
query ($search: String) {
  Media (search: $search, type: ANIME) {
    id
    title { romaji english native }
    description
    coverImage { extraLarge large color }
    bannerImage
    averageScore
    genres
    status
    episodes
    season
    seasonYear
    studios(isMain: true) { nodes { name } }
  }
}
"#;

const TRENDING_QUERY: &str = r#"
query {
  Page(page: 1, perPage: 5) {
    media(sort: TRENDING_DESC, type: ANIME, isAdult: false) {
      id
      title { romaji english native }
      coverImage { extraLarge large color }
      bannerImage
      genres
      averageScore
    }
  }
}
"#;

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
struct GraphQlResponse<T> {
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct MediaData {
    #[serde(rename = "Media")]
    media: Option<Media>,
}

#[derive(Deserialize)]
struct PageData {
    #[serde(rename = "Page")]
    page: Page,
}

#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    media: Vec<Media>,
}

/// AniList GraphQL client.
pub struct Client {
    http: ReqwestClient,
    api_url: String,
}

impl Client {
    pub fn new() -> Result<Self, AniListError> {
        Self::with_api_url(DEFAULT_API_URL)
    }

    pub fn with_api_url(api_url: &str) -> Result<Self, AniListError> {
        // Single-digit-seconds timeouts: an unresponsive upstream fails
        // fast rather than hanging the identification request.
        let http = ReqwestClient::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AniListError::Http(e.to_string()))?;
        Ok(Self {
            http,
            api_url: api_url.to_string(),
        })
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        body: serde_json::Value,
    ) -> Result<T, AniListError> {
        let resp = self
            .http
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AniListError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AniListError::Api(format!("HTTP {status}: {text}")));
        }

        let parsed: GraphQlResponse<T> = resp
            .json()
            .await
            .map_err(|e| AniListError::Api(e.to_string()))?;

        if let Some(errors) = parsed.errors {
            let joined = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(AniListError::Api(joined));
        }

        parsed
            .data
            .ok_or_else(|| AniListError::Api("response carried no data".into()))
    }

    /// Look up canonical metadata for a title. Errors with `NotFound`
    /// when AniList returns no media for the search.
    pub async fn fetch_anime(&self, title: &str) -> Result<Media, AniListError> {
        let body = json!({
            "query": ANIME_QUERY,
            "variables": { "search": title },
        });
        let data: MediaData = self.post(body).await?;
        data.media.ok_or_else(|| AniListError::NotFound {
            title: title.to_string(),
        })
    }

    /// Current trending page. Degrades to empty on upstream failure;
    /// trending is decoration, not part of identification.
    pub async fn fetch_trending(&self) -> Vec<Media> {
        let body = json!({ "query": TRENDING_QUERY });
        match self.post::<PageData>(body).await {
            Ok(data) => data.page.media,
            Err(e) => {
                warn!(error = %e, "trending fetch failed");
                vec![]
            }
        }
    }
}
