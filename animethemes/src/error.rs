use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThemesError {
    #[error("animethemes: request failed: {0}")]
    Http(String),

    #[error("animethemes: API error: {0}")]
    Api(String),
}
