use crate::swap_normalizer::parse_swap_transaction;
use crate::types::{HeliusErrorBody, HeliusTransaction};
use config_manager::HeliusConfig;
use pnl_core::SwapEvent;
use regex::Regex;
use reqwest::Client;
use retry_utils::{retry_with_backoff, RetryConfig, RetryableError};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum HeliusError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Rate limit exceeded, retry after: {retry_after_ms}ms")]
    RateLimitExceeded { retry_after_ms: u64 },
    #[error("Invalid wallet address: {0}")]
    InvalidWalletAddress(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Timeout error: {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, HeliusError>;

impl HeliusError {
    fn retry_class(&self) -> RetryableError {
        match self {
            HeliusError::RateLimitExceeded { retry_after_ms: 0 } => RetryableError::RateLimit,
            HeliusError::RateLimitExceeded { retry_after_ms } => {
                RetryableError::RetryAfter(Duration::from_millis(*retry_after_ms))
            }
            HeliusError::ApiError { status, .. } => RetryableError::from_status(*status),
            HeliusError::Timeout(_) => RetryableError::Timeout,
            HeliusError::RequestFailed(e) if e.is_timeout() => RetryableError::Timeout,
            HeliusError::RequestFailed(e) if e.is_connect() => RetryableError::ServerError,
            _ => RetryableError::Other,
        }
    }
}

/// Page limits and pacing for one history walk.
#[derive(Debug, Clone)]
pub struct PaginationLimits {
    pub max_pages: u32,
    pub max_swaps: usize,
    pub page_delay: Duration,
    pub hint_delay: Duration,
}

impl From<&HeliusConfig> for PaginationLimits {
    fn from(config: &HeliusConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            max_swaps: config.max_swaps,
            page_delay: Duration::from_millis(config.page_delay_ms),
            hint_delay: Duration::from_millis(config.pagination_hint_delay_ms),
        }
    }
}

/// Cursor suggested by Helius when a filtered search window came back empty.
pub fn pagination_hint(error: &HeliusError) -> Option<String> {
    let HeliusError::ApiError { message, .. } = error else {
        return None;
    };
    if !message.contains("before-signature") {
        return None;
    }

    let re = match Regex::new(r"set to ([A-Za-z0-9]+)\.") {
        Ok(re) => re,
        Err(e) => {
            error!("Invalid pagination hint pattern: {}", e);
            return None;
        }
    };

    re.captures(message)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decode a page record by record. A record that does not match the wire
/// shape is skipped; if it still carries a signature it is kept as an empty
/// transaction so the page cursor does not move backwards.
pub fn decode_transaction_page(records: Vec<Value>) -> Vec<HeliusTransaction> {
    let mut transactions = Vec::with_capacity(records.len());

    for record in records {
        let signature = record
            .get("signature")
            .and_then(Value::as_str)
            .map(str::to_string);

        match serde_json::from_value::<HeliusTransaction>(record) {
            Ok(tx) => transactions.push(tx),
            Err(e) => {
                warn!(
                    "Skipping undecodable Helius transaction {}: {}",
                    signature.as_deref().unwrap_or("<no signature>"),
                    e
                );
                if let Some(signature) = signature {
                    transactions.push(HeliusTransaction {
                        signature,
                        ..Default::default()
                    });
                }
            }
        }
    }

    transactions
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        time::sleep(delay).await;
    }
}

/// Walk history pages backwards with `before` cursors, normalizing swaps as
/// they arrive.
///
/// A failure after some swaps were collected ends the walk with what was
/// collected; a failure before that is returned.
pub async fn paginate_swaps<F, Fut>(
    wallet_address: &str,
    limits: &PaginationLimits,
    mut fetch_page: F,
) -> Result<Vec<SwapEvent>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Vec<HeliusTransaction>>>,
{
    let mut swaps: Vec<SwapEvent> = Vec::new();
    let mut before: Option<String> = None;
    let mut pages = 0u32;
    let mut raw_seen = 0usize;

    while pages < limits.max_pages {
        match fetch_page(before.clone()).await {
            Ok(batch) => {
                let Some(last) = batch.last() else {
                    debug!("Empty page, history exhausted after {} pages", pages);
                    break;
                };
                before = Some(last.signature.clone());
                raw_seen += batch.len();

                swaps.extend(
                    batch
                        .iter()
                        .filter_map(|tx| parse_swap_transaction(tx, wallet_address)),
                );
                pages += 1;

                debug!(
                    "Page {}: {} raw transactions, {} swaps so far",
                    pages,
                    batch.len(),
                    swaps.len()
                );

                if swaps.len() >= limits.max_swaps {
                    break;
                }

                pause(limits.page_delay).await;
            }
            Err(e) => {
                if let Some(signature) = pagination_hint(&e) {
                    debug!(
                        "Pagination hint received, continuing before {}",
                        &signature[..signature.len().min(20)]
                    );
                    before = Some(signature);
                    pages += 1;
                    pause(limits.hint_delay).await;
                    continue;
                }

                if !swaps.is_empty() {
                    warn!(
                        "Helius error after {} swaps, returning partial history: {}",
                        swaps.len(),
                        e
                    );
                    break;
                }

                return Err(e);
            }
        }
    }

    swaps.truncate(limits.max_swaps);
    info!(
        "Fetched {} swaps from {} raw transactions for {}",
        swaps.len(),
        raw_seen,
        wallet_address
    );

    Ok(swaps)
}

/// Helius enhanced-transactions client
#[derive(Debug, Clone)]
pub struct HeliusClient {
    /// HTTP client for making requests
    http_client: Client,

    /// Helius API configuration
    config: HeliusConfig,

    retry: RetryConfig,
}

impl HeliusClient {
    /// Create a new Helius client with the given configuration
    pub fn new(config: HeliusConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(HeliusError::ConfigError(
                "Helius API key is not configured".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("wallet-roaster/0.1")
            .build()
            .map_err(|e| HeliusError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        let retry = RetryConfig::with_max_attempts(config.max_retry_attempts);

        Ok(Self {
            http_client,
            config,
            retry,
        })
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn validate_wallet_address(&self, wallet_address: &str) -> Result<()> {
        if wallet_address.is_empty() {
            return Err(HeliusError::InvalidWalletAddress(
                "Wallet address cannot be empty".to_string(),
            ));
        }

        if wallet_address.len() < 32 || wallet_address.len() > 44 {
            return Err(HeliusError::InvalidWalletAddress(format!(
                "Invalid wallet address length: {}",
                wallet_address.len()
            )));
        }

        Ok(())
    }

    /// Build the Helius API URL for one page of wallet history
    pub fn build_transactions_url(&self, wallet_address: &str, before: Option<&str>) -> String {
        let mut url = format!(
            "{}/addresses/{}/transactions?api-key={}",
            self.config.api_base_url.trim_end_matches('/'),
            wallet_address,
            self.config.api_key
        );

        if self.config.swap_type_filter {
            url.push_str("&type=SWAP");
        }
        url.push_str(&format!("&limit={}", self.config.page_size));

        if let Some(before_signature) = before {
            url.push_str(&format!("&before={}", before_signature));
        }

        url
    }

    async fn request_page(&self, url: &str) -> Result<Vec<HeliusTransaction>> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                HeliusError::Timeout(format!(
                    "no response within {}s",
                    self.config.request_timeout_seconds
                ))
            } else {
                HeliusError::RequestFailed(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            let records = response.json::<Vec<Value>>().await?;
            return Ok(decode_transaction_page(records));
        }

        if status.as_u16() == 429 {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000))
                .unwrap_or(0);
            return Err(HeliusError::RateLimitExceeded { retry_after_ms });
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<HeliusErrorBody>(&body)
            .map(|parsed| parsed.error)
            .unwrap_or(body);

        Err(HeliusError::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    /// Fetch one page of raw transactions, retrying transient failures
    pub async fn fetch_transaction_page(
        &self,
        wallet_address: &str,
        before: Option<&str>,
    ) -> Result<Vec<HeliusTransaction>> {
        let url = self.build_transactions_url(wallet_address, before);
        debug!(
            "Requesting Helius page for {} (before: {:?})",
            wallet_address, before
        );

        retry_with_backoff(
            || self.request_page(&url),
            &self.retry,
            HeliusError::retry_class,
        )
        .await
    }

    /// Fetch and normalize the wallet's recent swaps
    pub async fn fetch_swap_history(&self, wallet_address: &str) -> Result<Vec<SwapEvent>> {
        self.validate_wallet_address(wallet_address)?;

        let limits = PaginationLimits::from(&self.config);
        paginate_swaps(wallet_address, &limits, |before| async move {
            self.fetch_transaction_page(wallet_address, before.as_deref())
                .await
        })
        .await
    }
}
