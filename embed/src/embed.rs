use crate::error::EmbedError;

/// Accepted unit-norm band for embedding vectors.
pub const NORM_MIN: f32 = 0.99;
pub const NORM_MAX: f32 = 1.01;

/// ImageEmbedder maps raw image bytes to a fixed-dimension unit-norm
/// vector.
///
/// Implementations must be safe for concurrent use (Send + Sync).
#[async_trait::async_trait]
pub trait ImageEmbedder: Send + Sync {
    /// Return the embedding vector for one image.
    /// Fails on unreadable or invalid image data.
    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>, EmbedError>;

    /// Return the dimensionality of the output vectors.
    fn dimension(&self) -> usize;
}

/// Euclidean norm with f64 accumulation.
pub fn norm(v: &[f32]) -> f32 {
    let mut sum: f64 = 0.0;
    for &x in v {
        sum += x as f64 * x as f64;
    }
    sum.sqrt() as f32
}

/// True when the vector's norm sits inside [NORM_MIN, NORM_MAX].
pub fn is_unit_norm(v: &[f32]) -> bool {
    let n = norm(v);
    (NORM_MIN..=NORM_MAX).contains(&n)
}
