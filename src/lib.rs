// src/lib.rs

//! Kitchen menu relay library
//!
//! Finds the current menu document on a publishing page, extracts its text,
//! and emits it as dated, formatted, size-bounded messages.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sink;
pub mod utils;
