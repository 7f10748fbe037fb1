use config_manager::SystemConfig;
use dex_client::HeliusClient;
use jprice_client::JupiterPriceClient;
use pnl_core::{
    collect_mints, validate_address, PersonalityGenerator, PnLEngine, PnLError, PriceFetcher,
    SwapHistorySource, TokenRegistry, WalletAnalysisReport,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrchestratorError {
    #[error("{0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Failed to fetch wallet history: {0}")]
    Provider(String),
    #[error("Analysis timed out after {0}s")]
    Timeout(u64),
}

impl From<PnLError> for OrchestratorError {
    fn from(err: PnLError) -> Self {
        match err {
            PnLError::InvalidAddress(msg) => OrchestratorError::Validation(msg),
            PnLError::Configuration(msg) => OrchestratorError::Configuration(msg),
            PnLError::Provider(msg) => OrchestratorError::Provider(msg),
        }
    }
}

impl From<config_manager::ConfigurationError> for OrchestratorError {
    fn from(err: config_manager::ConfigurationError) -> Self {
        OrchestratorError::Configuration(err.to_string())
    }
}

impl From<dex_client::HeliusError> for OrchestratorError {
    fn from(err: dex_client::HeliusError) -> Self {
        PnLError::from(err).into()
    }
}

impl From<jprice_client::JupiterClientError> for OrchestratorError {
    fn from(err: jprice_client::JupiterClientError) -> Self {
        OrchestratorError::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Runs one wallet analysis end to end: validation, history and price
/// fetches under a deadline, then the pure P&L pipeline.
#[derive(Clone)]
pub struct WalletAnalyzer {
    history: Arc<dyn SwapHistorySource>,
    prices: Arc<dyn PriceFetcher>,
    engine: Arc<PnLEngine>,
    timeout: Duration,
    roast_seed: Option<u64>,
}

impl WalletAnalyzer {
    pub fn new(
        history: Arc<dyn SwapHistorySource>,
        prices: Arc<dyn PriceFetcher>,
        engine: PnLEngine,
        timeout: Duration,
    ) -> Self {
        Self {
            history,
            prices,
            engine: Arc::new(engine),
            timeout,
            roast_seed: None,
        }
    }

    /// Fix the roast selection seed so repeated analyses pick the same line.
    pub fn with_roast_seed(mut self, seed: Option<u64>) -> Self {
        self.roast_seed = seed;
        self
    }

    /// Build the Helius and Jupiter backed analyzer. Fails when a required
    /// credential is missing.
    pub fn from_config(config: &SystemConfig) -> Result<Self> {
        let registry = TokenRegistry::from_config(&config.tokens);
        let history = HeliusClient::new(config.helius.clone())?;
        let prices = JupiterPriceClient::new(config.jupiter.clone(), registry.clone())?;
        let engine = PnLEngine::new(registry, PersonalityGenerator::new(config.scoring.clone()));

        info!(
            "Wallet analyzer ready (deadline {}s, up to {} swaps)",
            config.analysis.timeout_seconds, config.helius.max_swaps
        );

        Ok(Self::new(
            Arc::new(history),
            Arc::new(prices),
            engine,
            Duration::from_secs(config.analysis.timeout_seconds),
        )
        .with_roast_seed(config.system.roast_seed))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn rng(&self) -> StdRng {
        match self.roast_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Analyze the wallet at `address`.
    ///
    /// A wallet without swaps yields the ghost report, not an error.
    pub async fn analyze(&self, address: &str) -> Result<WalletAnalysisReport> {
        let address = validate_address(address)?;
        let started = Instant::now();
        info!("Starting analysis for {}", address);

        let fetched = tokio::time::timeout(self.timeout, async {
            let swaps = self.history.fetch_swaps(&address).await?;
            if swaps.is_empty() {
                return Ok((swaps, Default::default()));
            }

            let mints = collect_mints(&swaps);
            debug!("Resolving prices for {} distinct mints", mints.len());
            let prices = self.prices.fetch_prices(&mints).await;
            Ok::<_, PnLError>((swaps, prices))
        })
        .await;

        let (swaps, prices) = match fetched {
            Ok(Ok(data)) => data,
            Ok(Err(e)) => {
                error!("Analysis of {} failed: {}", address, e);
                return Err(e.into());
            }
            Err(_) => {
                warn!(
                    "Analysis of {} exceeded the {}s deadline",
                    address,
                    self.timeout.as_secs()
                );
                return Err(OrchestratorError::Timeout(self.timeout.as_secs()));
            }
        };

        let report = self
            .engine
            .analyze_swaps(&address, &swaps, &prices, &mut self.rng());

        info!(
            "Finished analysis for {} in {:?}: {} swaps, \"{}\"",
            address,
            started.elapsed(),
            report.swaps_analyzed,
            report.personality.main_title
        );

        Ok(report)
    }
}
