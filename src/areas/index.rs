//! Fingerprint index
//!
//! The index is the fingerprint set of one tree: a list of tokens in the order they
//! were produced. Comparisons never mutate it; they work on sorted and deduplicated
//! copies (see [`crate::artifacts::index::token`]), so the original order stays
//! available for inspection.
//!
//! ## Persistence
//!
//! [`Index::encode`] writes the path-sorted, path-unique tokens framed by a header and
//! a SHA-1 trailer, zlib compressed. [`Index::decode`] is its exact inverse and rejects
//! anything it did not write.

use crate::artifacts::core::error::DecodeError;
use crate::artifacts::core::{Packable, Unpackable};
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::token::{Token, sorted_unique_by_content, sorted_unique_by_path};
use crate::artifacts::index::{HEADER_SIZE, TOKEN_SIZE};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::fmt;
use std::io::{Read, Write};

/// Upper bound on the capacity reserved from an untrusted token count
const MAX_PREALLOCATED_TOKENS: usize = 1 << 16;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    tokens: Vec<Token>,
}

impl Index {
    pub fn new() -> Self {
        Index { tokens: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Index {
            tokens: Vec::with_capacity(capacity),
        }
    }

    /// Append a token.
    ///
    /// Not synchronized: while an index is being built, exactly one owner appends to it.
    pub fn add(&mut self, path_hash: u32, content_hash: u32) {
        self.tokens.push(Token::new(path_hash, content_hash));
    }

    /// Tokens in the order they were added
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn sorted_by_path(&self) -> Vec<Token> {
        sorted_unique_by_path(&self.tokens)
    }

    pub fn sorted_by_content(&self) -> Vec<Token> {
        sorted_unique_by_content(&self.tokens)
    }

    pub fn encode(&self, writer: impl Write) -> std::io::Result<()> {
        let tokens = self.sorted_by_path();
        let tokens_count = u32::try_from(tokens.len()).map_err(std::io::Error::other)?;

        let mut writer = Checksum::new(ZlibEncoder::new(writer, Compression::default()));

        let header_bytes = IndexHeader::for_tokens(tokens_count).serialize()?;
        writer.write(&header_bytes)?;

        for token in &tokens {
            let token_bytes = token.serialize()?;
            writer.write(&token_bytes)?;
        }

        writer.write_checksum()?;
        writer.into_inner().finish()?;

        Ok(())
    }

    pub fn decode(reader: impl Read) -> Result<Self, DecodeError> {
        let mut reader = Checksum::new(ZlibDecoder::new(reader));

        let header = IndexHeader::deserialize(reader.read(HEADER_SIZE)?)?;
        header.validate()?;

        let tokens_count = header.tokens_count as usize;
        let mut index = Index::with_capacity(tokens_count.min(MAX_PREALLOCATED_TOKENS));
        for _ in 0..tokens_count {
            let token = Token::deserialize(reader.read(TOKEN_SIZE)?)?;
            index.add(token.path_hash, token.content_hash);
        }

        reader.verify()?;

        let mut trailing = [0u8; 1];
        if reader.into_inner().read(&mut trailing)? != 0 {
            return Err(DecodeError::TrailingData);
        }

        Ok(index)
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens = self
            .tokens
            .iter()
            .map(Token::to_string)
            .collect::<Vec<_>>();

        write!(f, "{}", tokens.join(" "))
    }
}

impl Extend<Token> for Index {
    fn extend<I: IntoIterator<Item = Token>>(&mut self, iter: I) {
        for token in iter {
            self.add(token.path_hash, token.content_hash);
        }
    }
}

impl FromIterator<Token> for Index {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut index = Index::new();
        index.extend(iter);
        index
    }
}
