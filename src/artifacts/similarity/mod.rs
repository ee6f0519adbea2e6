//! Similarity between two indexes
//!
//! - `jaccard`: Jaccard index over paths, over contents, and their mean

pub mod jaccard;
