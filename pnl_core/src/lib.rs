pub mod address;
pub mod behavior;
pub mod format;
pub mod personality;
pub mod position_matcher;
pub mod stats;
pub mod token_registry;
pub mod trade_reconstructor;
pub mod types;

pub use address::{is_valid_address, validate_address};
pub use behavior::{calculate_preferences, calculate_timing};
pub use personality::PersonalityGenerator;
pub use position_matcher::{build_positions, classify_swap, SwapSide};
pub use stats::calculate_stats;
pub use token_registry::{TokenCategory, TokenInfo, TokenRegistry};
pub use trade_reconstructor::TradeReconstructor;
pub use types::*;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PnLError {
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, PnLError>;

/// Source of a wallet's normalized swap history.
#[async_trait]
pub trait SwapHistorySource: Send + Sync {
    /// Swaps for `address`. Partial history is returned when at least one
    /// page was fetched; an error means nothing could be fetched.
    async fn fetch_swaps(&self, address: &str) -> Result<Vec<SwapEvent>>;
}

/// USD unit prices for a set of mints.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Never fails: every requested mint is present in the result, unknown
    /// ones at their fallback price or zero.
    async fn fetch_prices(&self, token_mints: &[String]) -> HashMap<String, Decimal>;
}

/// Distinct mints touched by `swaps`, in first-seen order.
pub fn collect_mints(swaps: &[SwapEvent]) -> Vec<String> {
    let mut mints: Vec<String> = Vec::new();
    for swap in swaps {
        for mint in [&swap.token_in, &swap.token_out] {
            if !mints.iter().any(|m| m == mint) {
                mints.push(mint.clone());
            }
        }
    }
    mints
}

/// The pure analysis pipeline, from normalized swaps and resolved prices to a report.
pub struct PnLEngine {
    registry: TokenRegistry,
    generator: PersonalityGenerator,
}

impl PnLEngine {
    pub fn new(registry: TokenRegistry, generator: PersonalityGenerator) -> Self {
        Self {
            registry,
            generator,
        }
    }

    pub fn registry(&self) -> &TokenRegistry {
        &self.registry
    }

    /// Report for a wallet with no swaps.
    pub fn empty_report(&self, address: &str) -> WalletAnalysisReport {
        WalletAnalysisReport {
            analysis_id: Uuid::new_v4(),
            address: address.to_string(),
            stats: TradeStats::default(),
            preferences: Preferences::default(),
            timing: Timing::default(),
            personality: PersonalityGenerator::ghost(),
            analyzed_at: Utc::now(),
            swaps_analyzed: 0,
        }
    }

    pub fn analyze_swaps<R: Rng + ?Sized>(
        &self,
        address: &str,
        swaps: &[SwapEvent],
        prices: &HashMap<String, Decimal>,
        rng: &mut R,
    ) -> WalletAnalysisReport {
        if swaps.is_empty() {
            debug!("No swaps for {}, returning ghost report", address);
            return self.empty_report(address);
        }

        let positions = build_positions(swaps, &self.registry);
        let trades = TradeReconstructor::new(&self.registry).reconstruct(swaps, &positions, prices);

        let stats = calculate_stats(&trades);
        let preferences = calculate_preferences(swaps, &self.registry);
        let timing = calculate_timing(swaps);
        let personality = self.generator.generate(&stats, &preferences, &timing, rng);

        info!(
            "Analyzed {} swaps for {}: {} trades, win rate {:.2}, P&L ${}, degen score {}",
            swaps.len(),
            address,
            stats.total_trades,
            stats.win_rate,
            stats.total_pnl_usd.round_dp(2),
            personality.degen_score
        );

        WalletAnalysisReport {
            analysis_id: Uuid::new_v4(),
            address: address.to_string(),
            stats,
            preferences,
            timing,
            personality,
            analyzed_at: Utc::now(),
            swaps_analyzed: swaps.len(),
        }
    }
}
