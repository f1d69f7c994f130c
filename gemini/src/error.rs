use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("gemini: api_key must be non-empty")]
    Config,

    #[error("gemini: request failed: {0}")]
    Http(String),

    #[error("gemini: API error: {0}")]
    Api(String),

    #[error("gemini: empty response")]
    EmptyResponse,

    #[error("gemini: malformed answer: {0}")]
    Malformed(String),
}
