use tracing::warn;

use crate::error::VecError;

/// SearchHit is a single result from a similarity search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Key of the matched vector.
    pub key: String,

    /// Cosine similarity in [-1, 1]. Higher values indicate higher
    /// similarity (inputs are unit-norm, so inner product == cosine).
    pub similarity: f32,

    /// Raw inner product as computed by the scan. Identical to
    /// `similarity` for a flat inner-product index; kept separate so
    /// callers never have to know which metric produced it.
    pub distance: f32,
}

/// FlatIndex is an exact nearest-neighbor index over unit-norm vectors
/// using inner product, which equals cosine similarity for normalized
/// inputs.
///
/// The index is append-only: a vector's id is its insertion position
/// (0-based, contiguous, never reused). A parallel ordered key list maps
/// ids back to string keys; `keys.len() == vector count` is the integrity
/// invariant that every completed mutation must preserve.
///
/// Every search is a full linear scan. At the intended corpus size
/// (hundreds of vectors) that is a few hundred thousand multiply-adds,
/// well under a millisecond.
pub struct FlatIndex {
    dim: usize,
    /// Row-major vector arena, `len == count * dim`.
    data: Vec<f32>,
    /// Ordered id -> key mapping, parallel to `data`.
    keys: Vec<String>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
            keys: Vec::new(),
        }
    }

    /// Number of vectors stored.
    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// Number of entries in the id -> key mapping. Equal to `len()`
    /// unless the ordering artifact was lost and not yet rebuilt.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Append a vector and its key, returning the new id (== previous
    /// vector count).
    ///
    /// The vector is expected to be unit-norm; a norm outside
    /// [0.99, 1.01] is logged but not rejected here (ingest-time
    /// validation is the pipeline's job). Appending onto an index whose
    /// mapping is already out of step would bake the corruption in, so
    /// that case is refused.
    pub fn add(&mut self, key: &str, vector: &[f32]) -> Result<usize, VecError> {
        if vector.len() != self.dim {
            return Err(VecError::DimensionMismatch {
                got: vector.len(),
                want: self.dim,
            });
        }
        if self.keys.len() != self.len() {
            return Err(VecError::MappingMismatch {
                vectors: self.len(),
                keys: self.keys.len(),
            });
        }

        let norm = norm(vector);
        if !(0.99..=1.01).contains(&norm) {
            warn!(key, norm, "adding vector that is not unit-norm");
        }

        let id = self.len();
        self.data.extend_from_slice(vector);
        self.keys.push(key.to_string());
        Ok(id)
    }

    /// Exact top-k search, highest similarity first.
    ///
    /// Returns an empty list for an empty index. A mapping that disagrees
    /// with the vector count is a fatal integrity condition: the search
    /// refuses (error, no results) rather than returning ids it cannot
    /// resolve. Ties are broken by lowest insertion id, which keeps the
    /// full linear scan deterministic.
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<Vec<SearchHit>, VecError> {
        if query.len() != self.dim {
            return Err(VecError::DimensionMismatch {
                got: query.len(),
                want: self.dim,
            });
        }

        let count = self.len();
        if count == 0 || k == 0 {
            return Ok(vec![]);
        }

        if self.keys.len() != count {
            return Err(VecError::MappingMismatch {
                vectors: count,
                keys: self.keys.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = (0..count)
            .map(|id| {
                let row = &self.data[id * self.dim..(id + 1) * self.dim];
                (id, inner_product(query, row))
            })
            .collect();

        // Descending similarity, ties by lowest insertion id.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k.min(count));

        Ok(scored
            .into_iter()
            .filter(|&(_, sim)| sim >= min_similarity)
            .map(|(id, sim)| SearchHit {
                key: self.keys[id].clone(),
                similarity: sim,
                distance: sim,
            })
            .collect())
    }

    /// Replace the id -> key mapping, e.g. after a rebuild from the
    /// catalog when the ordering artifact was lost.
    ///
    /// The caller supplies keys in the canonical rebuild order
    /// (lexicographic). That order does not reproduce the original
    /// insertion order, so previously assigned ids shift on a forced
    /// rebuild; subsequent `add` calls continue from the new order.
    pub fn set_keys(&mut self, keys: Vec<String>) -> Result<(), VecError> {
        if keys.len() != self.len() {
            return Err(VecError::MappingMismatch {
                vectors: self.len(),
                keys: keys.len(),
            });
        }
        self.keys = keys;
        Ok(())
    }

    pub(crate) fn vectors(&self) -> &[f32] {
        &self.data
    }

    pub(crate) fn from_raw(dim: usize, data: Vec<f32>) -> Self {
        Self {
            dim,
            data,
            keys: Vec::new(),
        }
    }
}

/// Inner product with f64 accumulation to keep small similarity
/// differences stable across platforms.
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    let mut dot: f64 = 0.0;
    for i in 0..a.len().min(b.len()) {
        dot += a[i] as f64 * b[i] as f64;
    }
    dot as f32
}

/// Euclidean norm with f64 accumulation.
pub fn norm(v: &[f32]) -> f32 {
    let mut sum: f64 = 0.0;
    for &x in v {
        sum += x as f64 * x as f64;
    }
    sum.sqrt() as f32
}
