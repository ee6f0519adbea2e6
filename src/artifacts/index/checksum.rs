use crate::artifacts::core::error::DecodeError;
use crate::artifacts::index::CHECKSUM_SIZE;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::{ErrorKind, Read, Write};

/// Stream wrapper that hashes everything passing through it.
///
/// Writers finish with [`Checksum::write_checksum`], readers with [`Checksum::verify`].
#[derive(Debug)]
pub struct Checksum<S> {
    stream: S,
    digest: Sha1,
}

impl<S> Checksum<S> {
    pub(crate) fn new(stream: S) -> Self {
        Checksum {
            stream,
            digest: Sha1::new(),
        }
    }

    pub(crate) fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read> Checksum<S> {
    pub(crate) fn read(&mut self, size: usize) -> Result<Bytes, DecodeError> {
        let mut buffer = vec![0; size];
        self.read_exact(&mut buffer)?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    pub(crate) fn verify(&mut self) -> Result<(), DecodeError> {
        let mut expected_checksum = [0u8; CHECKSUM_SIZE];
        self.read_exact(&mut expected_checksum)?;

        let actual_checksum = self.digest.clone().finalize();
        if expected_checksum != actual_checksum.as_slice() {
            return Err(DecodeError::ChecksumMismatch);
        }

        Ok(())
    }

    fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), DecodeError> {
        self.stream.read_exact(buffer).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => DecodeError::Truncated,
            _ => DecodeError::Io(e),
        })
    }
}

impl<S: Write> Checksum<S> {
    pub(crate) fn write(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(data)?;
        self.digest.update(data);
        Ok(())
    }

    pub(crate) fn write_checksum(&mut self) -> std::io::Result<()> {
        let checksum = self.digest.clone().finalize();
        self.stream.write_all(checksum.as_slice())
    }
}
