//! Command implementations
//!
//! Every command is an `impl Session` block, split in two categories:
//!
//! - `plumbing`: low-level helpers exposing the checksum engine and the index (cksum,
//!   hash-path, ls-index)
//! - `porcelain`: the user-facing comparison of trees (compare)

pub mod plumbing;
pub mod porcelain;
