use crate::areas::session::Session;
use crate::artifacts::similarity::jaccard::JaccardSimilarity;
use colored::Colorize;
use std::path::{Path, PathBuf};

impl Session {
    /// Compare the first root against every other root.
    ///
    /// Prints one line per pair, `<similarity> <first> <other>`, or with `detailed`
    /// `<similarity> <content> <path> <first> <other>`.
    pub async fn compare(
        &self,
        roots: &[PathBuf],
        detailed: bool,
    ) -> anyhow::Result<Vec<JaccardSimilarity>> {
        let [first, others @ ..] = roots else {
            anyhow::bail!("At least two paths are required");
        };
        if others.is_empty() {
            anyhow::bail!("At least two paths are required");
        }

        let first_index = self.index(first).await?;
        let mut similarities = Vec::with_capacity(others.len());

        for other in others {
            let other_index = self.index(other).await?;
            let similarity = JaccardSimilarity::between(&first_index, &other_index);
            self.print_similarity(&similarity, first, other, detailed)?;

            similarities.push(similarity);
        }

        Ok(similarities)
    }

    fn print_similarity(
        &self,
        similarity: &JaccardSimilarity,
        first: &Path,
        other: &Path,
        detailed: bool,
    ) -> anyhow::Result<()> {
        let precision = self.settings().precision;
        let value = if detailed {
            format!("{similarity:.precision$}")
        } else {
            format!("{:.precision$}", similarity.similarity)
        };

        writeln!(
            self.writer(),
            "{} {} {}",
            value.bold(),
            first.display(),
            other.display()
        )?;

        Ok(())
    }
}
