// src/services/chunk.rs

//! Splitting formatted text into size-bounded message chunks.

use crate::models::MessageChunk;

/// Default per-chunk character budget, leaving headroom under a 2000
/// character message limit for code fences.
pub const DEFAULT_MAX_CHARS: usize = 1900;

/// Emitted when the input has no non-blank content.
pub const EMPTY_PLACEHOLDER: &str = "（無內容）";

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Packs lines into chunks of at most `max_chars` characters.
#[derive(Debug, Clone)]
pub struct Chunker {
    max_chars: usize,
    placeholder: String,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

impl Chunker {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
            placeholder: EMPTY_PLACEHOLDER.to_string(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Split `text` into ordered chunks. Never returns an empty vector.
    pub fn split(&self, text: &str) -> Vec<MessageChunk> {
        let mut pack = Packer::new(self.max_chars);

        for line in text.split('\n') {
            if char_len(line) > self.max_chars {
                pack.flush();
                for piece in split_words(line, self.max_chars) {
                    pack.push_line(&piece);
                }
            } else {
                pack.push_line(line);
            }
        }

        let mut chunks = pack.finish();
        if chunks.is_empty() {
            chunks.push(MessageChunk::new(self.placeholder.clone()));
        }
        log::debug!("Split text into {} chunk(s)", chunks.len());
        chunks
    }
}

/// Accumulates lines into the pending chunk.
struct Packer {
    max_chars: usize,
    pending: String,
    pending_len: usize,
    chunks: Vec<MessageChunk>,
}

impl Packer {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            pending: String::new(),
            pending_len: 0,
            chunks: Vec::new(),
        }
    }

    /// Append a line no longer than the budget, flushing first if needed.
    fn push_line(&mut self, line: &str) {
        let line_len = char_len(line);
        if self.pending.is_empty() {
            self.pending.push_str(line);
            self.pending_len = line_len;
        } else if self.pending_len + 1 + line_len > self.max_chars {
            self.flush();
            self.pending.push_str(line);
            self.pending_len = line_len;
        } else {
            self.pending.push('\n');
            self.pending.push_str(line);
            self.pending_len += 1 + line_len;
        }
    }

    fn flush(&mut self) {
        let trimmed = self.pending.trim();
        if !trimmed.is_empty() {
            self.chunks.push(MessageChunk::new(trimmed));
        }
        self.pending.clear();
        self.pending_len = 0;
    }

    fn finish(mut self) -> Vec<MessageChunk> {
        self.flush();
        self.chunks
    }
}

/// Greedily pack space-separated tokens into pieces of at most `max_chars`.
///
/// A single token longer than the budget is cut at character boundaries.
pub fn split_words(line: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for token in line.split(' ') {
        let token_len = char_len(token);

        if token_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = token.chars().collect();
            let mut windows = chars.chunks(max_chars).peekable();
            while let Some(window) = windows.next() {
                let window: String = window.iter().collect();
                if windows.peek().is_some() {
                    pieces.push(window);
                } else {
                    current_len = char_len(&window);
                    current = window;
                }
            }
            continue;
        }

        if current.is_empty() {
            current.push_str(token);
            current_len = token_len;
        } else if current_len + 1 + token_len <= max_chars {
            current.push(' ');
            current.push_str(token);
            current_len += 1 + token_len;
        } else {
            pieces.push(std::mem::replace(&mut current, token.to_string()));
            current_len = token_len;
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Split with the default placeholder.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<MessageChunk> {
    Chunker::new(max_chars).split(text)
}
