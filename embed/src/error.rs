use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("embed: empty input")]
    EmptyInput,

    #[error("embed: HTTP client error: {0}")]
    Http(String),

    #[error("embed: API error: {0}")]
    Api(String),

    #[error("embed: response carried no embedding")]
    MissingEmbedding,

    #[error("embed: dimension mismatch: got {got}, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("embed: embedder already initialized")]
    AlreadyInitialized,

    #[error("embed: embedder not initialized")]
    NotReady,
}
