use async_trait::async_trait;
use std::time::Duration;

use cv_types::{Chain, CvResult, DataError};

use crate::loaders::decode_chain;
use crate::sources::ChainSource;

/// Trait for chain providers (local files, HTTP endpoints, ...)
#[async_trait]
pub trait ChainProvider: Send + Sync + std::fmt::Debug {
    /// Check if this provider can fetch from the given source
    fn supports(&self, source: &ChainSource) -> bool;

    /// Fetch and decode one chain document
    async fn fetch_chain(&self, source: &ChainSource) -> CvResult<Chain>;

    /// Get provider name
    fn name(&self) -> &str;
}

/// Reads chain JSON from the local filesystem.
#[derive(Debug, Default)]
pub struct FileChainProvider;

impl FileChainProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChainProvider for FileChainProvider {
    fn supports(&self, source: &ChainSource) -> bool {
        matches!(source, ChainSource::File(_))
    }

    async fn fetch_chain(&self, source: &ChainSource) -> CvResult<Chain> {
        let ChainSource::File(path) = source else {
            return Err(DataError::InvalidSource {
                message: format!("{} is not a file source", source),
            }
            .into());
        };

        if !path.exists() {
            return Err(DataError::SourceNotFound(path.to_string_lossy().to_string()).into());
        }

        let text = tokio::fs::read_to_string(path).await.map_err(|e| DataError::LoadingFailed {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        decode_chain(&text)
    }

    fn name(&self) -> &str {
        "File Provider"
    }
}

/// Fetches chain JSON over HTTP(S).
#[derive(Debug)]
pub struct HttpChainProvider {
    client: reqwest::Client,
}

impl HttpChainProvider {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }
}

impl Default for HttpChainProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainProvider for HttpChainProvider {
    fn supports(&self, source: &ChainSource) -> bool {
        source.is_remote()
    }

    async fn fetch_chain(&self, source: &ChainSource) -> CvResult<Chain> {
        let ChainSource::Http(url) = source else {
            return Err(DataError::InvalidSource {
                message: format!("{} is not an HTTP source", source),
            }
            .into());
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataError::LoadingFailed {
                message: format!("Request to {} failed: {}", url, e),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SourceNotFound(url.clone()).into());
        }
        if !status.is_success() {
            return Err(DataError::LoadingFailed {
                message: format!("{} returned HTTP {}", url, status),
            }
            .into());
        }

        let text = response.text().await.map_err(|e| DataError::LoadingFailed {
            message: format!("Failed to read body from {}: {}", url, e),
        })?;
        decode_chain(&text)
    }

    fn name(&self) -> &str {
        "HTTP Provider"
    }
}
