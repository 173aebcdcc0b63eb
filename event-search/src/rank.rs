//! Top-k cosine ranking
//!
//! Full scan over (item, vector) pairs. Vectors are unit length by
//! construction, so the dot product is the cosine similarity; nothing is
//! re-normalized here.

use serde::Serialize;

use crate::vector::{dot, l2_norm};

/// Default number of results returned by [`rank`]
pub const DEFAULT_TOP_K: usize = 20;

/// An item paired with its similarity to the query, in [-1, 1]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate<T> {
    pub item: T,
    pub score: f32,
}

/// Rank candidates by cosine similarity to `query`, best first, keeping at
/// most `k`.
///
/// An empty or zero query ranks nothing. Candidates that are empty, have
/// a different dimensionality, or have zero norm are skipped. Equal scores
/// keep their input order.
pub fn rank<T, V, I>(query: &[f32], candidates: I, k: usize) -> Vec<ScoredCandidate<T>>
where
    I: IntoIterator<Item = (T, V)>,
    V: AsRef<[f32]>,
{
    if query.is_empty() || !is_usable(l2_norm(query)) {
        return Vec::new();
    }

    let mut scored: Vec<ScoredCandidate<T>> = candidates
        .into_iter()
        .filter_map(|(item, vector)| {
            let vector = vector.as_ref();
            if vector.len() != query.len() || !is_usable(l2_norm(vector)) {
                return None;
            }
            Some(ScoredCandidate {
                item,
                score: dot(query, vector),
            })
        })
        .collect();

    // Stable sort keeps input order for ties
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(k);
    scored
}

fn is_usable(norm: f32) -> bool {
    norm > 0.0 && norm.is_finite()
}
