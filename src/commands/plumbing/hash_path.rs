use crate::areas::session::Session;
use crate::artifacts::checksum::{checksum_path, clean_path};

impl Session {
    /// Print the checksum of every path next to its normalized form
    pub fn hash_path(&self, paths: &[String]) -> anyhow::Result<()> {
        for path in paths {
            writeln!(
                self.writer(),
                "{:08x} {}",
                checksum_path(path),
                clean_path(path)
            )?;
        }

        Ok(())
    }
}
