use crate::areas::session::Session;
use std::path::Path;

impl Session {
    /// Print the tokens of `root` as `<path hash> <content hash>`, sorted by path hash.
    ///
    /// The order is derived by sorting; walk order depends on worker scheduling.
    pub async fn ls_index(&self, root: &Path) -> anyhow::Result<()> {
        let index = self.index(root).await?;

        for token in index.sorted_by_path() {
            writeln!(
                self.writer(),
                "{:08x} {:08x}",
                token.path_hash,
                token.content_hash
            )?;
        }

        Ok(())
    }
}
