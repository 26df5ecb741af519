//! Writes provider output images to disk.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::imaging;

/// Lays files out as `<root>/<batch_id>/<job_id>.<ext>`.
#[derive(Debug, Clone)]
pub struct AssetWriter {
    root: PathBuf,
}

impl AssetWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store `bytes` and return the path used as the job's output reference.
    pub async fn save(&self, batch_id: &str, job_id: &str, bytes: &[u8]) -> Result<String> {
        let dir = self.root.join(batch_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create asset directory {}", dir.display()))?;

        let path = dir.join(format!("{}.{}", job_id, imaging::extension_for(bytes)));
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write asset {}", path.display()))?;

        tracing::debug!(job_id, path = %path.display(), bytes = bytes.len(), "Saved staging output");
        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_lays_out_by_batch() {
        let dir = tempdir().unwrap();
        let writer = AssetWriter::new(dir.path());

        let url = writer.save("batch-7", "job-3", b"raw bytes").await.unwrap();
        let expected = dir.path().join("batch-7").join("job-3.bin");
        assert_eq!(PathBuf::from(&url), expected);
        assert_eq!(std::fs::read(expected).unwrap(), b"raw bytes");
    }
}
