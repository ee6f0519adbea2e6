//! Persistent index cache
//!
//! Indexing a disk image means listing and checksumming every file inside it, which
//! is slow. The cache keeps the resulting index on disk, keyed by the image identity:
//! absolute path, size, modification time and format identifier. When any of them
//! changes the key changes too, so the old entry is simply never read again.

use crate::areas::index::Index;
use crate::artifacts::checksum::cache_key;
use crate::artifacts::core::settings::format_id;
use anyhow::Context;
use derive_new::new;
use fake::rand;
use std::fs::Metadata;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// Identity of a cached input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct FileIdentity {
    pub size: u64,
    pub modified: SystemTime,
}

impl TryFrom<&Metadata> for FileIdentity {
    type Error = anyhow::Error;

    fn try_from(metadata: &Metadata) -> Result<Self, Self::Error> {
        let modified = metadata
            .modified()
            .context("File modification time is not available")?;

        Ok(FileIdentity::new(metadata.len(), modified))
    }
}

#[derive(Debug)]
pub struct Cache {
    path: Box<Path>,
    format_id: String,
}

impl Cache {
    pub fn new(path: Box<Path>) -> Self {
        Cache {
            path,
            format_id: format_id(),
        }
    }

    pub fn with_format_id(path: Box<Path>, format_id: impl Into<String>) -> Self {
        Cache {
            path,
            format_id: format_id.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the cache directory unless it already exists
    pub fn ensure(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.path).context(format!(
            "Failed to create cache directory {}",
            self.path.display()
        ))
    }

    /// Location of the entry for `path` with the given identity.
    ///
    /// Named `<key>-<basename>.index.bin`, the key being the 64-bit cache key in hex.
    pub fn entry_path(&self, path: &Path, identity: &FileIdentity) -> anyhow::Result<PathBuf> {
        let key = cache_key(path, identity.size, identity.modified, &self.format_id)
            .context(format!("Unable to compute cache key for {}", path.display()))?;
        let basename = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();

        Ok(self.path.join(format!("{key:016x}-{basename}.index.bin")))
    }

    /// Cached index for `path`, or `None` on a miss.
    ///
    /// An entry that exists but can't be decoded is an error, not a miss.
    pub fn get(&self, path: &Path, identity: &FileIdentity) -> anyhow::Result<Option<Index>> {
        let entry_path = self.entry_path(path, identity)?;

        let file = match std::fs::File::open(&entry_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(entry = %entry_path.display(), "cache miss");
                return Ok(None);
            }
            Err(e) => {
                return Err(e).context(format!(
                    "Unable to open cache entry {}",
                    entry_path.display()
                ));
            }
        };

        let index = Index::decode(BufReader::new(file)).context(format!(
            "Error decoding cache entry {}",
            entry_path.display()
        ))?;

        info!(
            path = %path.display(),
            tokens = index.len(),
            "using cached index"
        );

        Ok(Some(index))
    }

    /// Store `index` for `path`, replacing any entry under the same key
    pub fn put(&self, path: &Path, identity: &FileIdentity, index: &Index) -> anyhow::Result<()> {
        let entry_path = self.entry_path(path, identity)?;
        let temp_entry_path = self.path.join(Self::generate_temp_name());

        let file = std::fs::File::create(&temp_entry_path).context(format!(
            "Unable to create cache entry {}",
            temp_entry_path.display()
        ))?;

        let mut writer = BufWriter::new(file);
        let written = index
            .encode(&mut writer)
            .and_then(|_| writer.flush())
            .context(format!(
                "Error encoding cache entry {}",
                temp_entry_path.display()
            ));

        if let Err(e) = written {
            let _ = std::fs::remove_file(&temp_entry_path);
            return Err(e);
        }

        // rename the temp file to the entry file to make it atomic
        std::fs::rename(&temp_entry_path, &entry_path).context(format!(
            "Unable to rename cache entry to {}",
            entry_path.display()
        ))?;

        info!(
            path = %path.display(),
            tokens = index.len(),
            entry = %entry_path.display(),
            "cached index"
        );

        Ok(())
    }

    fn generate_temp_name() -> String {
        format!("tmp-index-{}", rand::random::<u32>())
    }
}
