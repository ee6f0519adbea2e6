//! Inspector listings
//!
//! Disk images can't be walked directly. An external inspector (`virt-ls`) lists
//! their files instead, one comma separated record per entry:
//!
//! ```text
//! type, mode, size, checksum, path[, symlink target]
//! ```
//!
//! Only regular files (`type == "-"`) become tokens. The content checksum is taken
//! as printed by the inspector (a POSIX `cksum` CRC); the path checksum is computed
//! here, on the path made relative to the image root, so an image and a directory
//! holding the same tree fingerprint identically.

use crate::areas::index::Index;
use crate::artifacts::checksum::checksum_path_bytes;
use crate::artifacts::core::error::RecordError;
use crate::artifacts::index::token::Token;
use csv::{ByteRecord, ReaderBuilder};
use std::io::Read;

/// Record type marking a regular file
pub const REGULAR_FILE: &[u8] = b"-";

const CHECKSUM_FIELD: usize = 3;
const PATH_FIELD: usize = 4;

pub struct RecordReader<R: Read> {
    reader: csv::Reader<R>,
    record: ByteRecord,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        RecordReader {
            reader,
            record: ByteRecord::new(),
        }
    }

    /// Next regular-file token, skipping every other record type
    pub fn next_token(&mut self) -> Result<Option<Token>, RecordError> {
        while self.reader.read_byte_record(&mut self.record)? {
            if let Some(token) = token_for(&self.record)? {
                return Ok(Some(token));
            }
        }

        Ok(None)
    }

    /// Consume the whole listing into an index
    pub fn read_all(mut self) -> Result<Index, RecordError> {
        let mut index = Index::with_capacity(1024);
        while let Some(token) = self.next_token()? {
            index.add(token.path_hash, token.content_hash);
        }

        Ok(index)
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Token, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

fn token_for(record: &ByteRecord) -> Result<Option<Token>, RecordError> {
    if record.get(0) != Some(REGULAR_FILE) {
        return Ok(None);
    }

    let line = record.position().map(|p| p.line()).unwrap_or_default();
    let (Some(checksum), Some(path)) = (record.get(CHECKSUM_FIELD), record.get(PATH_FIELD)) else {
        return Err(RecordError::MissingFields {
            line,
            found: record.len(),
        });
    };

    let checksum = String::from_utf8_lossy(checksum);
    let content_hash = checksum
        .trim()
        .parse::<u32>()
        .map_err(|source| RecordError::Checksum {
            line,
            value: checksum.to_string(),
            source,
        })?;

    let relative_path = &path[path.iter().take_while(|&&byte| byte == b'/').count()..];
    let path_hash = checksum_path_bytes(relative_path);

    Ok(Some(Token::new(path_hash, content_hash)))
}
