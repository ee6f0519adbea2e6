//! Stateful components
//!
//! - `cache`: on-disk cache of image indexes
//! - `index`: the fingerprint set of one tree and its serialized form
//! - `indexer`: concurrent directory walker building an index
//! - `session`: wires settings, cache and indexer together for the commands

pub mod cache;
pub mod index;
pub mod indexer;
pub mod session;
