use thiserror::Error;

#[derive(Error, Debug)]
pub enum VecError {
    #[error("vecstore: dimension mismatch: got {got}, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("vecstore: id mapping mismatch: {vectors} vectors, {keys} keys")]
    MappingMismatch { vectors: usize, keys: usize },

    #[error("vecstore: {0}")]
    Io(String),

    #[error("vecstore: invalid format: {0}")]
    InvalidFormat(String),
}
