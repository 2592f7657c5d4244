//! In-memory sink for tests and previews.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::sink::ChunkSink;

/// Collects emitted chunks in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    chunks: Mutex<Vec<String>>,
    accept_limit: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that accepts `limit` chunks and rejects every one after.
    pub fn rejecting_after(limit: usize) -> Self {
        Self {
            chunks: Mutex::new(Vec::new()),
            accept_limit: Some(limit),
        }
    }

    /// Snapshot of everything emitted so far.
    pub fn chunks(&self) -> Vec<String> {
        match self.chunks.lock() {
            Ok(chunks) => chunks.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ChunkSink for MemorySink {
    async fn emit(&self, chunk: &str) -> Result<(), SinkError> {
        let mut chunks = self
            .chunks
            .lock()
            .map_err(|_| SinkError::Rejected("memory sink lock poisoned".to_string()))?;

        if self.accept_limit.is_some_and(|limit| chunks.len() >= limit) {
            return Err(SinkError::Rejected(format!(
                "memory sink full after {} chunk(s)",
                chunks.len()
            )));
        }
        chunks.push(chunk.to_string());
        Ok(())
    }
}
