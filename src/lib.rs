//! Estimate how similar two or more file trees are.
//!
//! Every file of a tree is fingerprinted into a [`Token`](artifacts::index::token::Token)
//! made of a path checksum and a content checksum. Two trees are then compared with a
//! Jaccard index computed independently over paths and over contents.

pub mod areas;
pub mod artifacts;
pub mod commands;
