//! Directory indexer
//!
//! Builds the [`Index`] of a directory tree. One blocking task walks the tree in
//! lexicographic order and feeds a bounded queue; a pool of hashing workers drains
//! it and sends finished tokens back to the calling task, which is the only one
//! appending to the index.
//!
//! ```text
//! walker --(bounded queue)--> worker 1..N --(tokens)--> aggregator (build)
//! ```
//!
//! Workers finish in any order, so the index order is not the walk order. Nothing
//! downstream depends on it: comparisons treat an index as a set.

use crate::areas::index::Index;
use crate::artifacts::checksum::{
    checksum_bytes, checksum_path_bytes, checksum_stream, portable_path,
};
use crate::artifacts::core::error::{BuildError, FileError};
use crate::artifacts::core::settings::DEFAULT_QUEUE_CAPACITY;
use crate::artifacts::index::token::Token;
use crossbeam::channel::{Receiver, Sender};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Receives every per-file failure; invoked concurrently from all workers
pub type ErrorCallback = Arc<dyn Fn(&Path, &FileError) + Send + Sync>;

pub struct Indexer {
    root: Box<Path>,
    workers: usize,
    queue_capacity: usize,
    on_error: ErrorCallback,
}

impl Indexer {
    pub fn new(root: Box<Path>) -> Self {
        Indexer {
            root,
            workers: num_cpus::get(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            on_error: Arc::new(|_, _| {}),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity.max(1);
        self
    }

    pub fn with_error_callback(
        mut self,
        on_error: impl Fn(&Path, &FileError) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Arc::new(on_error);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and fingerprint every regular file and symbolic link.
    ///
    /// Per-file failures go to the error callback and never stop the walk. Fails only
    /// if the root can't be stat'ed or isn't a directory. If `cancel` fires, the
    /// tokens aggregated so far come back in [`BuildError::Cancelled`].
    pub async fn build(&self, cancel: &CancellationToken) -> Result<Index, BuildError> {
        let metadata =
            std::fs::metadata(&self.root).map_err(|source| BuildError::RootUnavailable {
                path: self.root.to_path_buf(),
                source,
            })?;

        if !metadata.is_dir() {
            return Err(BuildError::NotADirectory(self.root.to_path_buf()));
        }

        debug!(
            root = %self.root.display(),
            workers = self.workers,
            "indexing directory"
        );

        let (queue_tx, queue_rx) = crossbeam::channel::bounded(self.queue_capacity);
        let (tokens_tx, mut tokens_rx) = mpsc::channel(self.queue_capacity);

        let walker = {
            let root = self.root.to_path_buf();
            let cancel = cancel.clone();
            let on_error = self.on_error.clone();
            tokio::task::spawn_blocking(move || walk(&root, queue_tx, &cancel, &on_error))
        };

        let workers = (0..self.workers)
            .map(|_| {
                let root = self.root.to_path_buf();
                let queue_rx = queue_rx.clone();
                let tokens_tx = tokens_tx.clone();
                let cancel = cancel.clone();
                let on_error = self.on_error.clone();
                tokio::task::spawn_blocking(move || {
                    hash_entries(&root, queue_rx, tokens_tx, &cancel, &on_error)
                })
            })
            .collect::<Vec<_>>();

        // the channels close once the walker and every worker are done
        drop(queue_rx);
        drop(tokens_tx);

        let mut index = Index::with_capacity(self.queue_capacity);
        while let Some(token) = tokens_rx.recv().await {
            index.add(token.path_hash, token.content_hash);
        }

        let discovered = walker.await?;
        for worker in workers {
            worker.await?;
        }

        if cancel.is_cancelled() {
            warn!(
                root = %self.root.display(),
                indexed = index.len(),
                "indexing cancelled"
            );
            return Err(BuildError::Cancelled { partial: index });
        }

        info!(
            root = %self.root.display(),
            discovered,
            indexed = index.len(),
            "indexed directory"
        );

        Ok(index)
    }
}

/// File or symlink found by the walker, with the size it had at that moment
#[derive(Debug)]
pub(crate) struct Discovered {
    entry: DirEntry,
    size: u64,
}

impl Discovered {
    pub(crate) fn path(&self) -> &Path {
        self.entry.path()
    }
}

impl TryFrom<DirEntry> for Discovered {
    type Error = FileError;

    fn try_from(entry: DirEntry) -> Result<Self, Self::Error> {
        let metadata = entry
            .metadata()
            .map_err(|err| FileError::Metadata(err.into()))?;

        Ok(Discovered {
            size: metadata.len(),
            entry,
        })
    }
}

/// Enumerate the tree in file name order and queue every file and symlink.
///
/// Blocks while the queue is full. Returns the number of queued entries.
fn walk(
    root: &Path,
    queue: Sender<Discovered>,
    cancel: &CancellationToken,
    on_error: &ErrorCallback,
) -> usize {
    let mut discovered = 0;

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        if cancel.is_cancelled() {
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                debug!(path = %path.display(), "skipping unreadable entry: {err}");
                on_error(&path, &FileError::Walk(err));
                continue;
            }
        };

        let file_type = entry.file_type();
        if !file_type.is_file() && !file_type.is_symlink() {
            continue;
        }

        let path = entry.path().to_path_buf();
        let entry = match Discovered::try_from(entry) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(path = %path.display(), "skipping file: {err}");
                on_error(&path, &err);
                continue;
            }
        };

        discovered += 1;
        // every worker is gone, nothing left to feed
        if queue.send(entry).is_err() {
            break;
        }
    }

    discovered
}

fn hash_entries(
    root: &Path,
    queue: Receiver<Discovered>,
    tokens: mpsc::Sender<Token>,
    cancel: &CancellationToken,
    on_error: &ErrorCallback,
) {
    for entry in queue.iter() {
        if cancel.is_cancelled() {
            break;
        }

        match fingerprint(root, &entry) {
            Ok(token) => {
                if tokens.blocking_send(token).is_err() {
                    break;
                }
            }
            Err(err) => {
                debug!(path = %entry.path().display(), "skipping file: {err}");
                on_error(entry.path(), &err);
            }
        }
    }
}

/// Token of a single entry.
///
/// The path hash covers the path relative to `root`. Symbolic links are not followed:
/// their content hash is the checksum of the target path itself. A regular file must
/// still have the size seen by the walker once read to the end.
pub(crate) fn fingerprint(root: &Path, discovered: &Discovered) -> Result<Token, FileError> {
    let entry = &discovered.entry;
    let relative_path = entry.path().strip_prefix(root).unwrap_or(entry.path());
    let path_hash = checksum_path_bytes(&portable_path(relative_path));

    if entry.file_type().is_symlink() {
        let target = std::fs::read_link(entry.path()).map_err(FileError::Symlink)?;
        let content_hash = checksum_bytes(target.as_os_str().as_encoded_bytes());
        return Ok(Token::new(path_hash, content_hash));
    }

    let file = File::open(entry.path()).map_err(FileError::Read)?;
    let (content_hash, read) = checksum_stream(file).map_err(FileError::Read)?;

    // the file changed since it was discovered
    if read != discovered.size {
        return Err(FileError::SizeMismatch {
            expected: discovered.size,
            actual: read,
        });
    }

    Ok(Token::new(path_hash, content_hash))
}
