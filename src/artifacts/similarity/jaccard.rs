//! Jaccard similarity between two indexes
//!
//! <https://en.wikipedia.org/wiki/Jaccard_index>

use crate::areas::index::Index;
use crate::artifacts::core::settings::DEFAULT_PRECISION;
use crate::artifacts::index::token::{Dimension, Token, intersect, sorted_unique};
use std::fmt;

/// Jaccard similarity between two indexes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JaccardSimilarity {
    /// Mean of the content and path similarities
    pub similarity: f64,
    /// Similarity of the sets of file contents
    pub content_similarity: f64,
    /// Similarity of the sets of file paths
    pub path_similarity: f64,
}

impl JaccardSimilarity {
    pub fn between(a: &Index, b: &Index) -> Self {
        let content_similarity = similarity_along(a.tokens(), b.tokens(), Dimension::Content);
        let path_similarity = similarity_along(a.tokens(), b.tokens(), Dimension::Path);

        JaccardSimilarity {
            similarity: (content_similarity + path_similarity) / 2.0,
            content_similarity,
            path_similarity,
        }
    }
}

impl fmt::Display for JaccardSimilarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(DEFAULT_PRECISION);
        write!(
            f,
            "{:.precision$} {:.precision$} {:.precision$}",
            self.similarity, self.content_similarity, self.path_similarity
        )
    }
}

pub fn jaccard(a: &Index, b: &Index) -> JaccardSimilarity {
    JaccardSimilarity::between(a, b)
}

// Two empty sets are identical, so an empty union counts as a perfect match.
fn similarity_along(a: &[Token], b: &[Token], dimension: Dimension) -> f64 {
    let a = sorted_unique(a, dimension);
    let b = sorted_unique(b, dimension);

    let shared = intersect(&a, &b, dimension).len();
    let union = a.len() + b.len() - shared;

    if union == 0 {
        return 1.0;
    }

    shared as f64 / union as f64
}
