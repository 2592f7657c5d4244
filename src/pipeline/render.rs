//! Turning extracted text into the messages of one menu post.

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{Config, ExtractedText, InferredDate, MessageChunk};
use crate::services::{Chunker, DateInferencer, format_date_label, format_text};

/// Formatted, dated and chunked menu content.
#[derive(Debug, Clone)]
pub struct RenderedMenu {
    /// Date found in the document, if any
    pub inferred: Option<InferredDate>,
    /// Label for the effective date (inferred, or today)
    pub date_label: String,
    pub chunks: Vec<MessageChunk>,
}

impl RenderedMenu {
    /// Chunk texts as they go to the sink, fenced when `code_block` is set.
    pub fn content_messages(&self, code_block: bool) -> Vec<String> {
        self.chunks
            .iter()
            .map(|chunk| {
                if code_block {
                    format!("```\n{}\n```", chunk)
                } else {
                    chunk.to_string()
                }
            })
            .collect()
    }
}

/// Date, format and split extracted text.
///
/// Fails with [`AppError::EmptyContent`] when formatting leaves nothing.
pub fn render_menu(config: &Config, text: &ExtractedText, today: NaiveDate) -> Result<RenderedMenu> {
    let formatted = format_text(&text.to_text());
    if formatted.is_blank() {
        return Err(AppError::EmptyContent);
    }

    let inferred = DateInferencer::with_window(today, config.dates.window_days)
        .infer(text.head(config.dates.scan_lines));
    let date_label = match &inferred {
        Some(found) => format_date_label(found.date, found.weekday.as_deref()),
        None => format_date_label(today, None),
    };

    let chunks = Chunker::new(config.output.max_chunk_chars)
        .with_placeholder(config.messages.placeholder.clone())
        .split(formatted.as_str());
    log::info!(
        "Rendered menu for {} into {} chunk(s)",
        date_label,
        chunks.len()
    );

    Ok(RenderedMenu {
        inferred,
        date_label,
        chunks,
    })
}
