// src/models/mod.rs

//! Domain models for the menu relay.
//!
//! The document types follow one run through the pipeline, from the fetched
//! source page to the chunks handed to a sink.

mod config;
mod document;

// Re-export all public types
pub use config::{
    Config, DateConfig, FetcherConfig, LinkConfig, MessagesConfig, OutputConfig, SourceConfig,
};
pub use document::{
    CandidateLink, ExtractedText, FormattedText, InferredDate, LinkTier, MessageChunk,
    RawDocument, SourcePage,
};
