//! Fingerprint tokens and the set algebra over them
//!
//! A token pairs the checksum of a file's path with the checksum of its content.
//! Comparisons always look at a single [`Dimension`] of a token, so the same list can
//! be viewed as a set of paths or as a set of contents.

use crate::artifacts::core::error::DecodeError;
use crate::artifacts::core::{Packable, Unpackable};
use crate::artifacts::index::TOKEN_SIZE;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::cmp::Ordering;
use std::fmt;

/// Fingerprint of a single file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, new)]
pub struct Token {
    pub path_hash: u32,
    pub content_hash: u32,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}:{:x}", self.path_hash, self.content_hash)
    }
}

impl Packable for Token {
    fn serialize(&self) -> std::io::Result<Bytes> {
        let mut bytes = Vec::with_capacity(TOKEN_SIZE);
        bytes.write_u32::<byteorder::NetworkEndian>(self.path_hash)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.content_hash)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for Token {
    fn deserialize(bytes: Bytes) -> Result<Self, DecodeError> {
        if bytes.len() < TOKEN_SIZE {
            return Err(DecodeError::Truncated);
        }

        Ok(Token {
            path_hash: byteorder::NetworkEndian::read_u32(&bytes[0..4]),
            content_hash: byteorder::NetworkEndian::read_u32(&bytes[4..8]),
        })
    }
}

/// Which half of a token a comparison looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Path,
    Content,
}

impl Dimension {
    pub fn key(self, token: &Token) -> u32 {
        match self {
            Dimension::Path => token.path_hash,
            Dimension::Content => token.content_hash,
        }
    }

    pub fn compare(self, a: &Token, b: &Token) -> Ordering {
        self.key(a).cmp(&self.key(b))
    }
}

/// Copy of `tokens` sorted along `dimension`, keeping one token per distinct value.
///
/// The sort is stable, so among tokens sharing a value the one that came first in
/// `tokens` is retained.
pub fn sorted_unique(tokens: &[Token], dimension: Dimension) -> Vec<Token> {
    let mut res = tokens.to_vec();
    res.sort_by_key(|token| dimension.key(token));
    res.dedup_by_key(|token| dimension.key(token));
    res
}

pub fn sorted_unique_by_path(tokens: &[Token]) -> Vec<Token> {
    sorted_unique(tokens, Dimension::Path)
}

pub fn sorted_unique_by_content(tokens: &[Token]) -> Vec<Token> {
    sorted_unique(tokens, Dimension::Content)
}

/// Tokens of `a` whose value along `dimension` also occurs in `b`.
///
/// Both slices must already be sorted and unique along the same dimension (see
/// [`sorted_unique`]); the result is undefined otherwise. Each token of `a` costs one
/// binary search in `b`.
pub fn intersect(a: &[Token], b: &[Token], dimension: Dimension) -> Vec<Token> {
    a.iter()
        .filter(|token| {
            b.binary_search_by(|probe| dimension.compare(probe, token))
                .is_ok()
        })
        .copied()
        .collect()
}
