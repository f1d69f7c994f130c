use thiserror::Error;

#[derive(Error, Debug)]
pub enum AniListError {
    #[error("anilist: request failed: {0}")]
    Http(String),

    #[error("anilist: API error: {0}")]
    Api(String),

    #[error("anilist: no results for {title:?}")]
    NotFound { title: String },
}
