//! Service layer for the menu relay.
//!
//! This module contains the stages of one relay run:
//! - Link discovery (`LinkResolver`)
//! - Document download (`DocumentFetcher`)
//! - Text extraction (`TextExtractor`)
//! - Date inference (`DateInferencer`)
//! - Formatting (`format_text`) and chunking (`Chunker`)

pub mod chunk;
pub mod dates;
pub mod extract;
mod fetch;
pub mod format;
pub mod links;

pub use chunk::{Chunker, split_chunks};
pub use dates::{DateInferencer, format_date_label, infer_date};
pub use extract::{PdfExtractor, PlainTextExtractor, TextExtractor, extract_blocking};
pub use fetch::{DocumentFetcher, Fetch, HttpFetcher};
pub use format::format_text;
pub use links::LinkResolver;
