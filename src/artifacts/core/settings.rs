use crate::artifacts::index::VERSION;
use std::path::PathBuf;

/// Default capacity of the queue between the directory walker and the hashing workers
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Digits printed after the decimal point of a similarity
pub const DEFAULT_PRECISION: usize = 13;

/// Default program used to list the contents of disk images
pub const DEFAULT_INSPECTOR: &str = "virt-ls";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding cached image indexes
    pub cache_dir: PathBuf,
    /// Whether image indexes are looked up in and stored to the cache
    pub use_cache: bool,
    /// Number of hashing workers
    pub workers: usize,
    pub queue_capacity: usize,
    /// Program invoked to list files inside a disk image
    pub inspector: String,
    pub precision: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            cache_dir: default_cache_dir(),
            use_cache: true,
            workers: num_cpus::get(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            inspector: String::from(DEFAULT_INSPECTOR),
            precision: DEFAULT_PRECISION,
        }
    }
}

/// `$XDG_CACHE_HOME/walkalike` or the platform equivalent
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("walkalike")
}

/// Identifier mixed into cache keys.
///
/// Changes with every release and with every on-disk format revision, so stale
/// entries are never read back by an incompatible build.
pub fn format_id() -> String {
    format!("{}/v{}", env!("CARGO_PKG_VERSION"), VERSION)
}
