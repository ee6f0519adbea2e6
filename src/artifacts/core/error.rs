use crate::areas::index::Index;
use std::path::PathBuf;
use thiserror::Error;

/// Recoverable failure affecting a single file or directory.
///
/// Reported through the indexer's error callback; the offending entry is left out of
/// the index and the walk goes on.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("unable to traverse directory: {0}")]
    Walk(#[source] walkdir::Error),
    #[error("unable to stat file: {0}")]
    Metadata(#[source] std::io::Error),
    #[error("unable to read file: {0}")]
    Read(#[source] std::io::Error),
    #[error("size mismatch while calculating checksum: expected {expected} bytes, read {actual}")]
    SizeMismatch { expected: u64, actual: u64 },
    #[error("unable to read symlink target: {0}")]
    Symlink(#[source] std::io::Error),
}

/// Outcome of a directory build that did not produce a complete index
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unable to stat index root {}: {source}", .path.display())]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    /// The build was interrupted; `partial` holds every token aggregated so far.
    #[error("indexing cancelled after {} files", .partial.len())]
    Cancelled { partial: Index },
    #[error("indexing task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid index signature {0:?}")]
    Signature(String),
    #[error("unsupported index format version: {0}")]
    Version(u32),
    #[error("unexpected end of index data")]
    Truncated,
    #[error("index checksum does not match stored value")]
    ChecksumMismatch,
    #[error("unexpected data after index checksum")]
    TrailingData,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Malformed record in an inspector listing
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("record on line {line}: expected at least 5 fields, found {found}")]
    MissingFields { line: u64, found: usize },
    #[error("record on line {line}: invalid checksum {value:?}")]
    Checksum {
        line: u64,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}
