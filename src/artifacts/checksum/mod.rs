//! Checksum engine
//!
//! Fast, non-cryptographic checksums used for fingerprinting:
//!
//! - content and path checksums are POSIX `cksum` CRCs (CRC-32, polynomial
//!   `0x04C11DB7`, message length appended, result complemented), the same value
//!   `cksum(1)` and `virt-ls --checksum=crc` print
//! - cache keys are CRC-64/XZ digests over a file's identity
//!
//! All functions are pure and safe to call from any number of threads.

use byteorder::{ByteOrder, LittleEndian};
use crc::{CRC_32_CKSUM, CRC_64_XZ, Crc, Digest};
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Size of the read buffer used when streaming content
pub const BUFFER_SIZE: usize = 64 * 1024;

const CKSUM: Crc<u32> = Crc::<u32>::new(&CRC_32_CKSUM);
const CACHE_KEY: Crc<u64> = Crc::<u64>::new(&CRC_64_XZ);

/// Checksum a byte stream until exhaustion.
///
/// Memory use is bounded by [`BUFFER_SIZE`] regardless of the stream length.
/// Returns the checksum together with the exact number of bytes consumed.
pub fn checksum_stream(mut reader: impl Read) -> std::io::Result<(u32, u64)> {
    let mut digest = CKSUM.digest();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut length = 0u64;

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        digest.update(&buffer[..read]);
        length += read as u64;
    }

    Ok((finalize(digest, length), length))
}

/// Checksum an in-memory byte slice
pub fn checksum_bytes(data: &[u8]) -> u32 {
    let mut digest = CKSUM.digest();
    digest.update(data);
    finalize(digest, data.len() as u64)
}

/// Checksum a slash separated path after lexical normalization.
///
/// `a//b/./c` and `a/b/x/../c` both hash like `a/b/c`.
pub fn checksum_path(path: &str) -> u32 {
    checksum_path_bytes(path.as_bytes())
}

/// Same as [`checksum_path`] for paths that need not be valid UTF-8
pub fn checksum_path_bytes(path: &[u8]) -> u32 {
    checksum_bytes(&clean_path_bytes(path))
}

// cksum appends the message length, least significant byte first, using as
// few bytes as needed
fn finalize(mut digest: Digest<'_, u32>, length: u64) -> u32 {
    let mut remaining = length;
    while remaining > 0 {
        digest.update(&[(remaining & 0xff) as u8]);
        remaining >>= 8;
    }

    digest.finalize()
}

/// Lexically normalize a slash separated path.
///
/// Repeated separators and `.` segments are dropped, `..` eats the preceding
/// segment. A `..` above a rooted path is discarded, above a relative path it is
/// kept. An empty result becomes `.`.
pub fn clean_path(path: &str) -> String {
    String::from_utf8_lossy(&clean_path_bytes(path.as_bytes())).into_owned()
}

/// [`clean_path`] over raw bytes; only `/` is interpreted
pub fn clean_path_bytes(path: &[u8]) -> Vec<u8> {
    if path.is_empty() {
        return b".".to_vec();
    }

    let rooted = path.starts_with(b"/");
    let mut segments: Vec<&[u8]> = Vec::new();

    for segment in path.split(|&byte| byte == b'/') {
        match segment {
            b"" | b"." => {}
            b".." => {
                if segments.last().is_some_and(|last| *last != b"..") {
                    segments.pop();
                } else if !rooted {
                    segments.push(b"..");
                }
            }
            segment => segments.push(segment),
        }
    }

    let joined = segments.join(&b'/');
    if rooted {
        [b"/".as_slice(), joined.as_slice()].concat()
    } else if joined.is_empty() {
        b".".to_vec()
    } else {
        joined
    }
}

/// Render a path with `/` separators regardless of the host platform.
///
/// Components are kept as raw bytes, so distinct non UTF-8 names stay distinct.
pub fn portable_path(path: &Path) -> Vec<u8> {
    path.components()
        .map(|component| component.as_os_str().as_encoded_bytes())
        .collect::<Vec<_>>()
        .join(&b'/')
}

/// Compute the 64-bit cache key of a file identity.
///
/// The key covers the absolute path, the format identifier, the size and the
/// modification time (nanosecond resolution). Changing any of them yields a
/// different key.
pub fn cache_key(
    path: &Path,
    size: u64,
    modified: SystemTime,
    format_id: &str,
) -> std::io::Result<u64> {
    let absolute_path = std::path::absolute(path)?;
    let absolute_path = clean_path_bytes(&portable_path(&absolute_path));

    let mut digest = CACHE_KEY.digest();
    digest.update(&absolute_path);
    digest.update(format_id.as_bytes());

    let mut field = [0u8; 8];
    LittleEndian::write_u64(&mut field, size);
    digest.update(&field);
    LittleEndian::write_i64(&mut field, unix_nanos(modified));
    digest.update(&field);

    Ok(digest.finalize())
}

fn unix_nanos(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_nanos() as i64,
        Err(before) => -(before.duration().as_nanos() as i64),
    }
}
