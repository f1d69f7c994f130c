use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EmbedConfig;
use crate::embed::{ImageEmbedder, is_unit_norm, norm};
use crate::error::EmbedError;

/// CLIP model served by the default sidecar.
pub const MODEL_CLIP_VIT_B_32: &str = "clip-ViT-B-32";

const CLIP_DEFAULT_BASE_URL: &str = "http://127.0.0.1:8300/v1";
const CLIP_DEFAULT_DIM: usize = 512;

/// ClipServer is an `ImageEmbedder` backed by a CLIP inference sidecar
/// speaking an OpenAI-compatible embeddings endpoint with base64 image
/// input.
///
/// The sidecar owns the model weights; this client only validates shape
/// and norm of what comes back. Vectors outside the unit-norm band are
/// logged, not rejected; the ingestion pipeline decides whether to
/// refuse them.
pub struct ClipServer {
    client: Client,
    model: String,
    dim: usize,
    base_url: String,
}

impl ClipServer {
    pub fn new() -> Result<Self, EmbedError> {
        Self::with_config(EmbedConfig::default())
    }

    pub fn with_config(cfg: EmbedConfig) -> Result<Self, EmbedError> {
        // Same timeout discipline as the other service clients: an
        // unresponsive sidecar fails the request, it does not hang it.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| EmbedError::Http(e.to_string()))?;
        Ok(Self {
            client,
            model: if cfg.model.is_empty() {
                MODEL_CLIP_VIT_B_32.to_string()
            } else {
                cfg.model
            },
            dim: if cfg.dimension == 0 {
                CLIP_DEFAULT_DIM
            } else {
                cfg.dimension
            },
            base_url: if cfg.base_url.is_empty() {
                CLIP_DEFAULT_BASE_URL.to_string()
            } else {
                cfg.base_url
            },
        })
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<String>,
    encoding_format: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait::async_trait]
impl ImageEmbedder for ClipServer {
    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>, EmbedError> {
        if image.is_empty() {
            return Err(EmbedError::EmptyInput);
        }

        let url = format!("{}/embeddings", self.base_url);
        let body = EmbeddingRequest {
            model: &self.model,
            input: vec![BASE64.encode(image)],
            encoding_format: "float",
        };

        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EmbedError::Api(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(EmbedError::Api(format!("HTTP {status}: {body}")));
        }

        let parsed: EmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| EmbedError::Api(e.to_string()))?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(EmbedError::MissingEmbedding)?;

        if vector.len() != self.dim {
            return Err(EmbedError::DimensionMismatch {
                got: vector.len(),
                want: self.dim,
            });
        }
        if !is_unit_norm(&vector) {
            debug!(norm = norm(&vector), "embedding outside unit-norm band");
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
