//! Index file format
//!
//! An index is the fingerprint set of one tree: one [`token::Token`] per file.
//!
//! ## File Format (Version 1)
//!
//! The payload below is zlib compressed as a whole.
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "WLKX" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Token count (4 bytes)
//!
//! Tokens (8 bytes each, sorted and unique by path hash):
//!   - Path hash (4 bytes)
//!   - Content hash (4 bytes)
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod index_header;
pub mod token;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12; // 4 bytes for marker, 4 for version, 4 for token count

/// Size of a serialized token in bytes
pub const TOKEN_SIZE: usize = 8;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "WLKX";

/// Index file format version
pub const VERSION: u32 = 1;
