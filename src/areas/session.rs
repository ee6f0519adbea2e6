use crate::areas::cache::{Cache, FileIdentity};
use crate::areas::index::Index;
use crate::areas::indexer::Indexer;
use crate::artifacts::core::settings::Settings;
use crate::artifacts::records::RecordReader;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::Path;
use std::process::Stdio;
use tokio_util::io::SyncIoBridge;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Everything a command needs: settings, the optional cache, the output writer and
/// the cancellation signal shared by every build it starts.
pub struct Session {
    settings: Settings,
    cache: Option<Cache>,
    writer: RefCell<Box<dyn std::io::Write>>,
    cancel: CancellationToken,
}

impl Session {
    /// Create a session.
    ///
    /// The cache directory is only created once an image index has to be stored, so
    /// commands that never touch the cache work without it.
    pub fn new(settings: Settings, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let cache = settings
            .use_cache
            .then(|| Cache::new(settings.cache_dir.clone().into_boxed_path()));

        Ok(Session {
            settings,
            cache,
            writer: RefCell::new(writer),
            cancel: CancellationToken::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cache(&self) -> Option<&Cache> {
        self.cache.as_ref()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Build or fetch the index of `path`.
    ///
    /// Directories are walked on every run. Anything else is treated as a disk image:
    /// looked up in the cache first, otherwise listed by the inspector and cached.
    pub async fn index(&self, path: &Path) -> anyhow::Result<Index> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Unable to stat {}", path.display()))?;

        if metadata.is_dir() {
            return self.index_directory(path).await;
        }

        let identity = FileIdentity::try_from(&metadata)?;
        if let Some(cache) = self.cache()
            && let Some(index) = cache.get(path, &identity)?
        {
            return Ok(index);
        }

        let index = self.inspect_image(path).await?;
        info!(path = %path.display(), tokens = index.len(), "built image index");

        if let Some(cache) = self.cache() {
            cache.ensure()?;
            cache.put(path, &identity, &index)?;
        }

        Ok(index)
    }

    async fn index_directory(&self, path: &Path) -> anyhow::Result<Index> {
        let indexer = Indexer::new(path.to_path_buf().into_boxed_path())
            .with_workers(self.settings.workers)
            .with_queue_capacity(self.settings.queue_capacity)
            .with_error_callback(|path, err| {
                warn!(path = %path.display(), "{err}");
            });

        Ok(indexer.build(&self.cancel).await?)
    }

    /// List the files of a disk image with the inspector and index its output.
    ///
    /// Cancellation kills the inspector.
    async fn inspect_image(&self, path: &Path) -> anyhow::Result<Index> {
        let inspector = &self.settings.inspector;
        debug!(inspector = %inspector, image = %path.display(), "running inspector");

        let mut child = tokio::process::Command::new(inspector)
            .args([
                "--csv",
                "--checksum=crc",
                "--long",
                "--recursive",
                "--add",
            ])
            .arg(path)
            .arg("/")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Unable to run '{inspector}'"))?;

        let stdout = child
            .stdout
            .take()
            .context("Inspector output is not available")?;
        let reader = tokio::task::spawn_blocking(move || {
            RecordReader::new(SyncIoBridge::new(stdout)).read_all()
        });

        tokio::select! {
            index = reader => {
                let index = index?.with_context(|| {
                    format!("Unable to parse '{inspector}' output for {}", path.display())
                })?;

                let status = child.wait().await?;
                if !status.success() {
                    anyhow::bail!("'{inspector}' failed for {}: {status}", path.display());
                }

                Ok(index)
            }
            _ = self.cancel.cancelled() => {
                child.kill().await?;
                anyhow::bail!("Indexing of {} was cancelled", path.display())
            }
        }
    }
}
