// src/services/fetch.rs

//! Byte fetching over HTTP.
//!
//! [`Fetch`] is the narrow input boundary of the pipeline: one GET, one
//! attempt, bounded by a timeout. [`DocumentFetcher`] downloads the menu
//! document itself on top of it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::{FetchError, Result};
use crate::models::{FetcherConfig, RawDocument};
use crate::utils::http::create_async_client;

/// Fetch the body at a URL as raw bytes.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch_bytes(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> std::result::Result<Vec<u8>, FetchError>;
}

/// [`Fetch`] backed by a shared reqwest client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the configured browser User-Agent.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch_bytes(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> std::result::Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;
        Ok(bytes.to_vec())
    }
}

/// Downloads the binary menu document.
pub struct DocumentFetcher<'a> {
    fetcher: &'a dyn Fetch,
    timeout: Duration,
}

impl<'a> DocumentFetcher<'a> {
    pub fn new(fetcher: &'a dyn Fetch, config: &FetcherConfig) -> Self {
        Self {
            fetcher,
            timeout: Duration::from_secs(config.document_timeout_secs),
        }
    }

    /// Download the document at `url`. Single attempt, no retry.
    pub async fn fetch(&self, url: &Url) -> std::result::Result<RawDocument, FetchError> {
        log::info!("Downloading document: {}", url);
        let bytes = self.fetcher.fetch_bytes(url, self.timeout).await?;
        let document = RawDocument {
            url: url.clone(),
            bytes,
        };
        log::info!(
            "Downloaded {} bytes (sha256 {})",
            document.len(),
            document.digest()
        );
        Ok(document)
    }
}
