//! Standard output sink.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::SinkError;
use crate::sink::ChunkSink;

const SEPARATOR: &str = "────────────────────────────────";

/// Writes each chunk to stdout followed by a separator line.
pub struct ConsoleSink {
    stdout: Mutex<tokio::io::Stdout>,
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            stdout: Mutex::new(tokio::io::stdout()),
        }
    }
}

#[async_trait]
impl ChunkSink for ConsoleSink {
    async fn emit(&self, chunk: &str) -> Result<(), SinkError> {
        let mut out = self.stdout.lock().await;
        out.write_all(chunk.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.write_all(SEPARATOR.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emits_to_stdout() {
        let sink = ConsoleSink::new();
        sink.emit("**午餐**\n白飯").await.unwrap();
        sink.emit("✅").await.unwrap();
    }
}
