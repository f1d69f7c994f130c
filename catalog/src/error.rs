use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog: {0}")]
    Io(String),

    #[error("catalog: serialization error: {0}")]
    Serialization(String),

    #[error("catalog: too many slug variants for {base:?}")]
    SlugOverflow { base: String },
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Serialization(e.to_string())
    }
}
