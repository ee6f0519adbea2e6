//! Plumbing commands
//!
//! Direct access to the building blocks of a comparison, mostly useful for scripting
//! and for checking fingerprints against other tools.
//!
//! ## Commands
//!
//! - `cksum`: POSIX checksum and size of files
//! - `hash-path`: checksum of a normalized path, as used in tokens
//! - `ls-index`: tokens of a tree in path order

pub mod cksum;
pub mod hash_path;
pub mod ls_index;
