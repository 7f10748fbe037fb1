use crate::helius_client::{HeliusClient, HeliusError};
use async_trait::async_trait;
use pnl_core::{PnLError, SwapEvent, SwapHistorySource};

impl From<HeliusError> for PnLError {
    fn from(err: HeliusError) -> Self {
        match err {
            HeliusError::InvalidWalletAddress(msg) => PnLError::InvalidAddress(msg),
            HeliusError::ConfigError(msg) => PnLError::Configuration(msg),
            other => PnLError::Provider(other.to_string()),
        }
    }
}

/// Lets the analysis pipeline pull swap history from Helius
#[async_trait]
impl SwapHistorySource for HeliusClient {
    async fn fetch_swaps(&self, address: &str) -> pnl_core::Result<Vec<SwapEvent>> {
        Ok(self.fetch_swap_history(address).await?)
    }
}
