//! Output destinations for message chunks.
//!
//! A run hands every message (announcements, header, content chunks) to a
//! [`ChunkSink`] one at a time, in order.

mod console;
mod directory;
mod memory;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::SinkError;

pub use console::ConsoleSink;
pub use directory::DirectorySink;
pub use memory::MemorySink;

/// Trait for chunk output backends.
#[async_trait]
pub trait ChunkSink: Send + Sync {
    /// Deliver one message. Chunks must be delivered in call order.
    async fn emit(&self, chunk: &str) -> Result<(), SinkError>;
}

/// Emit `chunks` in order, sleeping `delay` between consecutive chunks.
///
/// There is no sleep after the last chunk. Returns the number emitted.
pub async fn emit_paced<S: AsRef<str>>(
    sink: &dyn ChunkSink,
    chunks: &[S],
    delay: Duration,
) -> Result<usize, SinkError> {
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        sink.emit(chunk.as_ref()).await?;
        log::debug!("Emitted chunk {}/{}", i + 1, chunks.len());
    }
    Ok(chunks.len())
}
