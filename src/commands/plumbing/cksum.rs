use crate::areas::session::Session;
use crate::artifacts::checksum::checksum_stream;
use anyhow::Context;
use std::io::BufReader;
use std::path::PathBuf;

impl Session {
    /// Print `<checksum> <bytes> <file>` for every file, like `cksum(1)`
    pub fn cksum(&self, files: &[PathBuf]) -> anyhow::Result<()> {
        for file in files {
            let reader = std::fs::File::open(file)
                .map(BufReader::new)
                .with_context(|| format!("Unable to open {}", file.display()))?;
            let (checksum, length) = checksum_stream(reader)
                .with_context(|| format!("Unable to read {}", file.display()))?;

            writeln!(self.writer(), "{} {} {}", checksum, length, file.display())?;
        }

        Ok(())
    }
}
