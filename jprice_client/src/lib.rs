// Jupiter Price Client - current USD prices with an in-memory TTL cache

pub mod price_cache;

pub use price_cache::PriceCache;

use async_trait::async_trait;
use config_manager::JupiterConfig;
use pnl_core::{PriceFetcher, TokenRegistry};
use reqwest::Client;
use retry_utils::{retry_with_backoff, RetryConfig, RetryableError};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum JupiterClientError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Jupiter API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Rate limit exceeded")]
    RateLimit,
}

impl JupiterClientError {
    fn retry_class(&self) -> RetryableError {
        match self {
            JupiterClientError::RateLimit => RetryableError::RateLimit,
            JupiterClientError::Api { status, .. } => RetryableError::from_status(*status),
            JupiterClientError::Http(e) if e.is_timeout() => RetryableError::Timeout,
            JupiterClientError::Http(e) if e.is_connect() => RetryableError::ServerError,
            _ => RetryableError::Other,
        }
    }
}

/// One entry of the price v3 response, keyed by mint.
#[derive(Debug, Deserialize)]
pub struct JupiterTokenPrice {
    #[serde(rename = "usdPrice", default)]
    pub usd_price: Option<f64>,
    #[serde(rename = "blockId", default)]
    pub block_id: Option<u64>,
    #[serde(default)]
    pub decimals: Option<u32>,
}

/// Parse a price v3 body into positive USD prices. Entries that are
/// missing, null, zero or not representable are left out.
pub fn parse_price_response(body: &str) -> Result<HashMap<String, Decimal>, JupiterClientError> {
    let raw: HashMap<String, Option<JupiterTokenPrice>> = serde_json::from_str(body)?;

    let mut output = HashMap::new();
    for (mint, info) in raw {
        let price = info
            .and_then(|info| info.usd_price)
            .filter(|p| p.is_finite() && *p > 0.0)
            .and_then(Decimal::from_f64);
        match price {
            Some(price) => {
                output.insert(mint, price);
            }
            None => debug!("No usable Jupiter price for {}", mint),
        }
    }

    Ok(output)
}

/// Main Jupiter Price Client
#[derive(Clone)]
pub struct JupiterPriceClient {
    config: JupiterConfig,
    http_client: Client,
    registry: TokenRegistry,
    cache: PriceCache,
    retry: RetryConfig,
}

impl JupiterPriceClient {
    pub fn new(config: JupiterConfig, registry: TokenRegistry) -> Result<Self, JupiterClientError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        let cache = PriceCache::new(Duration::from_secs(config.price_cache_ttl_seconds));

        Ok(Self {
            config,
            http_client,
            registry,
            cache,
            retry: RetryConfig::with_max_attempts(2),
        })
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    fn fallback_price(&self, mint: &str) -> Decimal {
        self.registry.fallback_price(mint).unwrap_or(Decimal::ZERO)
    }

    async fn request_prices(&self, url: &str, ids: &str) -> Result<HashMap<String, Decimal>, JupiterClientError> {
        let response = self
            .http_client
            .get(url)
            .query(&[("ids", ids)])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(JupiterClientError::RateLimit);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(JupiterClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        parse_price_response(&body)
    }

    /// Fetch one chunk of mints from the price API, with retries
    async fn fetch_chunk(&self, mints: &[String]) -> Result<HashMap<String, Decimal>, JupiterClientError> {
        let url = format!("{}/price/v3", self.config.api_url.trim_end_matches('/'));
        let ids = mints.join(",");
        debug!("Fetching Jupiter prices for {} mints", mints.len());

        retry_with_backoff(
            || self.request_prices(&url, &ids),
            &self.retry,
            JupiterClientError::retry_class,
        )
        .await
    }

    /// USD price for every mint in `token_mints`.
    ///
    /// Fresh cache entries are served as-is. Misses are fetched in chunks;
    /// a missing quote or a failed chunk resolves to the registry fallback
    /// price, or zero. Every resolved value is written back to the cache.
    pub async fn resolve(&self, token_mints: &[String]) -> HashMap<String, Decimal> {
        let mut unique: Vec<String> = Vec::with_capacity(token_mints.len());
        for mint in token_mints {
            if !unique.contains(mint) {
                unique.push(mint.clone());
            }
        }

        let (mut prices, misses) = self.cache.partition(&unique).await;
        if misses.is_empty() {
            return prices;
        }

        let chunk_size = self.config.max_ids_per_request.max(1);
        let mut resolved = HashMap::with_capacity(misses.len());
        let mut fallbacks = 0usize;

        for chunk in misses.chunks(chunk_size) {
            let quoted = match self.fetch_chunk(chunk).await {
                Ok(quoted) => quoted,
                Err(e) => {
                    warn!(
                        "Jupiter price fetch failed for {} mints, using fallback prices: {}",
                        chunk.len(),
                        e
                    );
                    HashMap::new()
                }
            };

            for mint in chunk {
                let price = match quoted.get(mint) {
                    Some(price) => *price,
                    None => {
                        fallbacks += 1;
                        self.fallback_price(mint)
                    }
                };
                resolved.insert(mint.clone(), price);
            }
        }

        if fallbacks > 0 {
            warn!("{} of {} prices resolved from the fallback table", fallbacks, misses.len());
        }
        info!(
            "Resolved {} prices ({} cached, {} fetched)",
            unique.len(),
            prices.len(),
            resolved.len()
        );

        self.cache.insert_many(&resolved).await;
        prices.extend(resolved);
        prices
    }
}

#[async_trait]
impl PriceFetcher for JupiterPriceClient {
    async fn fetch_prices(&self, token_mints: &[String]) -> HashMap<String, Decimal> {
        self.resolve(token_mints).await
    }
}
