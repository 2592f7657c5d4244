// src/models/document.rs

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use sha2::{Digest, Sha256};
use url::Url;

/// HTML of the source page plus the URL used to resolve relative links.
#[derive(Debug, Clone)]
pub struct SourcePage {
    pub url: Url,
    pub html: String,
}

/// Which link heuristic produced a candidate. Lower tier wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LinkTier {
    /// `href` carries the document suffix
    Suffix = 1,
    /// Visible link text carries a document or menu keyword
    Keyword = 2,
    /// `href` looks like some kind of file download
    Download = 3,
}

impl LinkTier {
    pub fn number(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for LinkTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier {}", self.number())
    }
}

/// An absolute document URL found on the source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub url: Url,
    pub tier: LinkTier,
}

/// Bytes of a downloaded document. Owned by a single run.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub url: Url,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    /// Hex-encoded SHA-256 of the document bytes.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

/// Text lines in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    lines: Vec<String>,
}

impl ExtractedText {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Split raw extractor output into lines, accepting any line ending.
    pub fn from_raw(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        Self::new(normalized.split('\n').map(str::to_string).collect())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The first `n` lines, used for date inference.
    pub fn head(&self, n: usize) -> &[String] {
        &self.lines[..self.lines.len().min(n)]
    }

    /// Join the lines back into a single newline-separated string.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count()).sum()
    }
}

/// A date found near the top of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredDate {
    pub date: NaiveDate,
    /// Substring of the line the date was parsed from
    pub matched: String,
    /// Weekday label as written in the source, e.g. `星期二`
    pub weekday: Option<String>,
}

/// Formatter output: titles emphasized, table spacing normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedText(String);

impl FormattedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the text has no non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for FormattedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One bounded unit of output text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageChunk(String);

impl MessageChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, the unit chunk limits are expressed in.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for MessageChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
