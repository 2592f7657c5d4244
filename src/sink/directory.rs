//! Directory sink: one numbered text file per message.
//!
//! ```text
//! {dir}/
//! ├── 001.txt
//! ├── 002.txt
//! └── 003.txt
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::SinkError;
use crate::sink::ChunkSink;

/// Writes each chunk to `{dir}/{n:03}.txt`, numbering from 1.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    next: AtomicUsize,
}

impl DirectorySink {
    /// Create the directory if needed.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            next: AtomicUsize::new(1),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{:03}.txt", index))
    }
}

#[async_trait]
impl ChunkSink for DirectorySink {
    async fn emit(&self, chunk: &str) -> Result<(), SinkError> {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        let path = self.path_for(index);

        // Write to temp, then rename
        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(chunk.as_bytes()).await?;
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&tmp, &path).await?;

        log::debug!("Wrote chunk to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn chunks_are_numbered_in_emission_order() {
        let temp = TempDir::new().unwrap();
        let sink = DirectorySink::create(temp.path().join("out")).await.unwrap();

        sink.emit("開始").await.unwrap();
        sink.emit("**午餐**\n白飯").await.unwrap();

        let first = tokio::fs::read_to_string(sink.dir().join("001.txt"))
            .await
            .unwrap();
        let second = tokio::fs::read_to_string(sink.dir().join("002.txt"))
            .await
            .unwrap();
        assert_eq!(first, "開始");
        assert_eq!(second, "**午餐**\n白飯");
        assert!(!sink.dir().join("002.tmp").exists());
    }

    #[tokio::test]
    async fn create_makes_nested_directories() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");
        DirectorySink::create(&nested).await.unwrap();
        assert!(nested.is_dir());
    }
}
