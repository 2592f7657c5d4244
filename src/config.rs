// src/config.rs

//! Configuration loading utilities.
//!
//! A missing file means "run with defaults"; a file that exists but does not
//! parse or validate is an error.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Load configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        log::info!("No config at {}; using defaults", path.display());
        return Ok(Config::default());
    }
    Config::load(path).map_err(|e| AppError::config(format!("{}: {}", path.display(), e)))
}

/// Load, apply a source page override, and validate.
pub fn load_effective(path: &Path, page_url: Option<String>) -> Result<Config> {
    let mut config = load_config(path)?;

    if let Some(url) = page_url.filter(|u| !u.trim().is_empty()) {
        log::info!("Using source page override: {}", url);
        config.source.page_url = url;
    }

    config.validate()?;
    Ok(config)
}
