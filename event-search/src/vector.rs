//! Embedding vectors and model identities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the default sentence-embedding model
pub const DEFAULT_MODEL: &str = "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2";

/// Dimensionality of the default model
pub const DEFAULT_DIMENSION: usize = 384;

/// Dense, L2-normalized text embedding
///
/// The empty vector is a valid value meaning "no embedding": it is what
/// blank text embeds to, and what an event carries before backfill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    /// The "no embedding" value
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Wrap raw values as-is, without normalizing
    pub fn from_raw(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Scale values to unit length. A zero vector stays zero.
    pub fn normalized(mut values: Vec<f32>) -> Self {
        let norm = l2_norm(&values);
        if norm > 0.0 && norm.is_finite() {
            for v in values.iter_mut() {
                *v /= norm;
            }
        }
        Self(values)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Euclidean norm
    pub fn norm(&self) -> f32 {
        l2_norm(&self.0)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl AsRef<[f32]> for EmbeddingVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Name of the model that produced an embedding
///
/// Persisted next to each vector so embeddings from another model
/// version can be told apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelIdentity(String);

impl ModelIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModelIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl fmt::Display for ModelIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Euclidean length of a vector
pub fn l2_norm(values: &[f32]) -> f32 {
    values.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Dot product of two equal-length vectors
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
