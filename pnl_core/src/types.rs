use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One on-chain token-for-token exchange, already decimal-scaled.
///
/// Only constructed by the normalizer when both amounts are positive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SwapEvent {
    /// Transaction signature
    pub signature: String,

    /// UTC epoch milliseconds
    pub timestamp_ms: i64,

    /// Mint spent by the wallet
    pub token_in: String,

    /// Mint received by the wallet
    pub token_out: String,

    pub amount_in: Decimal,
    pub amount_out: Decimal,

    /// Program that executed the swap
    pub program_id: String,
}

/// All acquisitions and disposals of one non-cash token, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPosition {
    pub token: String,
    pub acquisitions: Vec<SwapEvent>,
    pub disposals: Vec<SwapEvent>,
    pub total_acquired: Decimal,
    pub total_disposed: Decimal,
}

impl TokenPosition {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            acquisitions: Vec::new(),
            disposals: Vec::new(),
            total_acquired: Decimal::ZERO,
            total_disposed: Decimal::ZERO,
        }
    }

    /// Earliest acquisition; the first one in input order wins a tie.
    pub fn earliest_acquisition(&self) -> Option<&SwapEvent> {
        self.acquisitions.iter().min_by_key(|swap| swap.timestamp_ms)
    }
}

/// P&L view of a single swap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub swap: SwapEvent,
    pub pnl_usd: Decimal,
    pub holding_time_minutes: Decimal,
    pub is_win: bool,
    pub is_rug: bool,
    pub token_in_usd: Decimal,
    pub token_out_usd: Decimal,
    /// Disposal was timestamped before its reference acquisition
    pub holding_time_anomaly: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeStats {
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    /// In [0, 1]
    pub win_rate: f64,
    pub avg_holding_time_minutes: Decimal,
    pub biggest_win_usd: Decimal,
    /// Non-negative magnitude
    pub biggest_loss_usd: Decimal,
    pub total_pnl_usd: Decimal,
    pub rug_count: u32,
    pub total_volume_usd: Decimal,
}

impl Default for TradeStats {
    fn default() -> Self {
        Self {
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate: 0.0,
            avg_holding_time_minutes: Decimal::ZERO,
            biggest_win_usd: Decimal::ZERO,
            biggest_loss_usd: Decimal::ZERO,
            total_pnl_usd: Decimal::ZERO,
            rug_count: 0,
            total_volume_usd: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub memecoin_percent: f64,
    pub defi_percent: f64,
    /// Always 0, NFT trades never show up as swaps
    pub nft_percent: f64,
    pub other_percent: f64,
    /// Symbol of the most-received non-cash token, empty when none
    pub favorite_token: String,
    pub favorite_token_mint: Option<String>,
    pub favorite_token_trades: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    /// UTC hour, 0-23
    pub most_active_hour: u32,
    pub most_active_day: String,
    pub weekend_trader_percent: f64,
    pub night_owl_percent: f64,
    pub avg_trades_per_day: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            most_active_hour: 12,
            most_active_day: "Monday".to_string(),
            weekend_trader_percent: 0.0,
            night_owl_percent: 0.0,
            avg_trades_per_day: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Badge {
    pub emoji: String,
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Personality {
    /// 0-100
    pub degen_score: u8,
    pub main_title: String,
    /// At most six, in ladder order
    pub badges: Vec<Badge>,
    pub roast: String,
}

/// Everything produced by one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAnalysisReport {
    pub analysis_id: Uuid,
    pub address: String,
    pub stats: TradeStats,
    pub preferences: Preferences,
    pub timing: Timing,
    pub personality: Personality,
    pub analyzed_at: DateTime<Utc>,
    pub swaps_analyzed: usize,
}
