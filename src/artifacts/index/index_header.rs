use crate::artifacts::core::error::DecodeError;
use crate::artifacts::core::{Packable, Unpackable};
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub(crate) marker: String,
    pub(crate) version: u32,
    pub(crate) tokens_count: u32,
}

impl IndexHeader {
    pub(crate) fn for_tokens(tokens_count: u32) -> Self {
        IndexHeader {
            marker: String::from(SIGNATURE),
            version: VERSION,
            tokens_count,
        }
    }

    /// Reject headers written by something else or by an incompatible format revision
    pub(crate) fn validate(&self) -> Result<(), DecodeError> {
        if self.marker != SIGNATURE {
            return Err(DecodeError::Signature(self.marker.clone()));
        }

        if self.version != VERSION {
            return Err(DecodeError::Version(self.version));
        }

        Ok(())
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> std::io::Result<Bytes> {
        // pack!(self.marker, self.version, self.tokens_count => "a4N2")
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.write_all(self.marker.as_bytes())?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.version)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.tokens_count)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexHeader {
    fn deserialize(bytes: Bytes) -> Result<Self, DecodeError> {
        if bytes.len() < HEADER_SIZE {
            return Err(DecodeError::Truncated);
        }

        let marker = String::from_utf8_lossy(&bytes[0..4]).into_owned();
        let version = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        let tokens_count = byteorder::NetworkEndian::read_u32(&bytes[8..12]);

        Ok(IndexHeader {
            marker,
            version,
            tokens_count,
        })
    }
}
