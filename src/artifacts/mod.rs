//! Data types and algorithms
//!
//! - `checksum`: POSIX `cksum` CRCs and cache keys
//! - `core`: settings, error types and the packing traits
//! - `index`: fingerprint tokens and the on-disk index framing
//! - `records`: reader for inspector listings of disk images
//! - `similarity`: Jaccard similarity between indexes

pub mod checksum;
pub mod core;
pub mod index;
pub mod records;
pub mod similarity;
