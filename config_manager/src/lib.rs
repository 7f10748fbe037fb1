use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] ConfigError),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Wrapped SOL mint, the chain's base asset.
pub const WRAPPED_SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Environment variable accepted as a fallback for `helius.api_key`.
pub const HELIUS_API_KEY_ENV: &str = "HELIUS_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// General system settings
    pub system: SystemSettings,

    /// Helius enhanced-transactions API (swap history)
    pub helius: HeliusConfig,

    /// Jupiter price API
    pub jupiter: JupiterConfig,

    /// Analysis pipeline settings
    pub analysis: AnalysisConfig,

    /// Base / stable / known token tables
    pub tokens: TokenRegistryConfig,

    /// Degen score weights
    pub scoring: ScoringConfig,

    /// API server configuration
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    /// Enable debug mode
    pub debug_mode: bool,

    /// Fixed seed for roast selection. `None` draws from OS entropy.
    pub roast_seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeliusConfig {
    /// Helius API key
    pub api_key: String,

    /// Helius API base URL
    pub api_base_url: String,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Raw transactions requested per page (Helius caps this at 100)
    pub page_size: u32,

    /// Maximum pages walked per wallet
    pub max_pages: u32,

    /// Stop paginating once this many swaps were normalized
    pub max_swaps: usize,

    /// Pause between pages in milliseconds
    pub page_delay_ms: u64,

    /// Pause after following a pagination hint in milliseconds
    pub pagination_hint_delay_ms: u64,

    /// Retries for rate-limited / 5xx / timed out requests
    pub max_retry_attempts: u32,

    /// Ask Helius for `type=SWAP` records only. When off, every record type
    /// is fetched and swaps are recognized from their `events.swap` payload,
    /// which also covers swaps Helius labels with another type.
    pub swap_type_filter: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JupiterConfig {
    /// Jupiter API base URL
    pub api_url: String,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,

    /// Price cache TTL in seconds
    pub price_cache_ttl_seconds: u64,

    /// Maximum mints per price request
    pub max_ids_per_request: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Deadline for one full analysis (history + prices) in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRegistryConfig {
    /// The chain's wrapped native asset
    pub base_mint: String,

    /// Mints treated like cash when classifying swaps
    pub stable_mints: Vec<String>,

    /// Known token metadata and fallback prices
    pub known_tokens: Vec<KnownTokenConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnownTokenConfig {
    pub mint: String,
    pub symbol: String,
    pub name: String,
    /// One of "memecoin", "defi", "other"
    pub category: String,
    /// Used when the price API has no quote
    pub fallback_price_usd: Option<f64>,
}

/// Weights of the seven degen sub-scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    pub win_rate: f64,
    pub rug_count: f64,
    pub memecoin_percent: f64,
    pub trading_frequency: f64,
    pub volatility: f64,
    pub night_owl: f64,
    pub weekend_trader: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API server host
    pub host: String,

    /// API server port
    pub port: u16,
}

pub const TOKEN_CATEGORIES: [&str; 3] = ["memecoin", "defi", "other"];

fn known(mint: &str, symbol: &str, name: &str, category: &str, price: Option<f64>) -> KnownTokenConfig {
    KnownTokenConfig {
        mint: mint.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        fallback_price_usd: price,
    }
}

impl Default for TokenRegistryConfig {
    fn default() -> Self {
        Self {
            base_mint: WRAPPED_SOL_MINT.to_string(),
            stable_mints: vec![
                "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(), // USDC
                "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB".to_string(), // USDT
                "USDH1SM1ojwWUga67PGrgFWUHibbjqMvuMaDkRJTgkX".to_string(),  // USDH
                "7dHbWXmci3dT8UFYWYZweBLXgycu7Y3iL6trKn1Y7ARj".to_string(), // stSOL
            ],
            known_tokens: vec![
                known(WRAPPED_SOL_MINT, "SOL", "Wrapped SOL", "defi", Some(180.0)),
                known("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "USDC", "USD Coin", "defi", Some(1.0)),
                known("Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB", "USDT", "Tether USD", "defi", Some(1.0)),
                known("mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So", "mSOL", "Marinade SOL", "defi", Some(200.0)),
                known("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", "BONK", "Bonk", "memecoin", Some(0.00003)),
                known("EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm", "WIF", "dogwifhat", "memecoin", Some(2.5)),
                known("7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr", "POPCAT", "Popcat", "memecoin", None),
                known("JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN", "JUP", "Jupiter", "defi", Some(1.2)),
                known("HZ1JovNiVvGrGNiiYvEozEVgZ58xaU3RKwX8eACQBCt3", "PYTH", "Pyth Network", "defi", None),
                known("RLBxxFkseAZ4RgJH3Sqn8jXxhmGoz9jWxDNJMh8pL7a", "RNDR", "Render Token", "defi", None),
                known("4k3Dyjzvzp8eMZWUXbBCjEvwSkkk59S5iCNLY3QrkX6R", "RAY", "Raydium", "defi", Some(5.0)),
                known("orcaEKTdK7LKz57vaAYr9QeNsVEPfiu6QeMU1kektZE", "ORCA", "Orca", "defi", Some(4.0)),
            ],
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            win_rate: 0.15,
            rug_count: 0.2,
            memecoin_percent: 0.25,
            trading_frequency: 0.15,
            volatility: 0.15,
            night_owl: 0.05,
            weekend_trader: 0.05,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            system: SystemSettings {
                debug_mode: false,
                roast_seed: None,
            },
            helius: HeliusConfig {
                api_key: "".to_string(), // Must be set in config.toml or the environment
                api_base_url: "https://api.helius.xyz/v0".to_string(),
                request_timeout_seconds: 15,
                page_size: 100,
                max_pages: 5,
                max_swaps: 100,
                page_delay_ms: 200,
                pagination_hint_delay_ms: 300,
                max_retry_attempts: 3,
                swap_type_filter: true,
            },
            jupiter: JupiterConfig {
                api_url: "https://lite-api.jup.ag".to_string(),
                request_timeout_seconds: 10,
                price_cache_ttl_seconds: 300,
                max_ids_per_request: 50,
            },
            analysis: AnalysisConfig {
                timeout_seconds: 45,
            },
            tokens: TokenRegistryConfig::default(),
            scoring: ScoringConfig::default(),
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
        }
    }
}

impl HeliusConfig {
    /// Validate Helius configuration. The API key is checked by the client itself.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Helius request timeout must be greater than 0".to_string(),
            ));
        }

        if self.page_size == 0 || self.page_size > 100 {
            return Err(ConfigurationError::InvalidValue(format!(
                "Helius page size must be between 1 and 100, got {}",
                self.page_size
            )));
        }

        if self.max_pages == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Helius max_pages must be greater than 0".to_string(),
            ));
        }

        if self.max_swaps == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Helius max_swaps must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl JupiterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Jupiter request timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_ids_per_request == 0 {
            return Err(ConfigurationError::InvalidValue(
                "Jupiter max_ids_per_request must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl TokenRegistryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_mint.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "tokens.base_mint cannot be empty".to_string(),
            ));
        }

        for token in &self.known_tokens {
            if !TOKEN_CATEGORIES.contains(&token.category.as_str()) {
                return Err(ConfigurationError::InvalidValue(format!(
                    "Unknown category '{}' for token {} (expected one of {:?})",
                    token.category, token.symbol, TOKEN_CATEGORIES
                )));
            }

            if let Some(price) = token.fallback_price_usd {
                if !price.is_finite() || price < 0.0 {
                    return Err(ConfigurationError::InvalidValue(format!(
                        "Fallback price for {} must be a non-negative number",
                        token.symbol
                    )));
                }
            }
        }

        Ok(())
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("win_rate", self.win_rate),
            ("rug_count", self.rug_count),
            ("memecoin_percent", self.memecoin_percent),
            ("trading_frequency", self.trading_frequency),
            ("volatility", self.volatility),
            ("night_owl", self.night_owl),
            ("weekend_trader", self.weekend_trader),
        ];

        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigurationError::InvalidValue(format!(
                    "scoring.{} must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }

        Ok(())
    }
}

impl SystemConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config_builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&SystemConfig::default())?);

        if config_path.as_ref().exists() {
            info!(
                "Loading configuration from: {}",
                config_path.as_ref().display()
            );
            config_builder = config_builder.add_source(File::from(config_path.as_ref()));
        } else {
            debug!("Config file not found, using defaults and environment variables");
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("ROAST")
                .try_parsing(true)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("tokens.stable_mints"),
        );

        let mut system_config: SystemConfig = config_builder.build()?.try_deserialize()?;

        if system_config.helius.api_key.is_empty() {
            if let Ok(key) = std::env::var(HELIUS_API_KEY_ENV) {
                debug!("Using {} from the environment", HELIUS_API_KEY_ENV);
                system_config.helius.api_key = key.trim().to_string();
            }
        }

        system_config.validate()?;

        Ok(system_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.helius.validate()?;
        self.jupiter.validate()?;
        self.tokens.validate()?;
        self.scoring.validate()?;

        if self.analysis.timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue(
                "analysis.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.api.port == 0 {
            return Err(ConfigurationError::InvalidValue(
                "API port cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Configuration as JSON with credentials masked, for API responses
    pub fn to_redacted_json(&self) -> serde_json::Value {
        let mut redacted = self.clone();
        if !redacted.helius.api_key.is_empty() {
            redacted.helius.api_key = "***".to_string();
        }
        serde_json::to_value(&redacted).unwrap_or(serde_json::Value::Null)
    }
}
