use tracing::{debug, info, warn};

use cv_types::{Chain, CvResult, DataError};

use crate::providers::{ChainProvider, FileChainProvider, HttpChainProvider};
use crate::sources::ChainSource;

/// Decode a chain JSON document.
pub fn decode_chain(text: &str) -> CvResult<Chain> {
    let chain: Chain = serde_json::from_str(text).map_err(|e| DataError::ParseError {
        message: format!("Invalid chain document: {}", e),
    })?;
    if !chain.last_price.is_finite() || chain.last_price <= 0.0 {
        warn!("Chain last price is {}, nothing will fall in the strike band", chain.last_price);
    }
    Ok(chain)
}

/// Routes a [`ChainSource`] to the first provider that supports it.
#[derive(Debug)]
pub struct ChainLoader {
    providers: Vec<Box<dyn ChainProvider>>,
}

impl ChainLoader {
    /// Loader with the file and HTTP providers registered.
    pub fn new() -> Self {
        Self {
            providers: vec![
                Box::new(FileChainProvider::new()),
                Box::new(HttpChainProvider::new()),
            ],
        }
    }

    /// Loader with no providers; add them with [`ChainLoader::add_provider`].
    pub fn empty() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn add_provider(&mut self, provider: Box<dyn ChainProvider>) {
        self.providers.push(provider);
    }

    pub async fn load(&self, source: &ChainSource) -> CvResult<Chain> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.supports(source))
            .ok_or_else(|| DataError::InvalidSource {
                message: format!("no provider for {}", source),
            })?;

        debug!("Fetching chain from {} via {}", source, provider.name());
        let chain = provider.fetch_chain(source).await?;
        info!(
            "Loaded chain from {}: last price {}, {} calls, {} puts",
            source,
            chain.last_price,
            chain.calls.len(),
            chain.puts.len()
        );
        Ok(chain)
    }
}

impl Default for ChainLoader {
    fn default() -> Self {
        Self::new()
    }
}
