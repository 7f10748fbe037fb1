use crate::types::{TradeRecord, TradeStats};
use rust_decimal::Decimal;

fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Reduce trade records to summary statistics. Empty input gives all zeros.
pub fn calculate_stats(trades: &[TradeRecord]) -> TradeStats {
    if trades.is_empty() {
        return TradeStats::default();
    }

    let total_trades = trades.len() as u32;
    let winning_trades = trades.iter().filter(|t| t.is_win).count() as u32;
    let losing_trades = total_trades - winning_trades;

    let held: Vec<Decimal> = trades
        .iter()
        .map(|t| t.holding_time_minutes)
        .filter(|minutes| *minutes > Decimal::ZERO)
        .collect();
    let avg_holding_time_minutes = if held.is_empty() {
        Decimal::ZERO
    } else {
        saturating_sum(held.iter().copied()) / Decimal::from(held.len())
    };

    let biggest_win_usd = trades
        .iter()
        .map(|t| t.pnl_usd)
        .fold(Decimal::ZERO, Decimal::max);
    let biggest_loss_usd = trades
        .iter()
        .map(|t| t.pnl_usd)
        .fold(Decimal::ZERO, Decimal::min)
        .abs();

    TradeStats {
        total_trades,
        winning_trades,
        losing_trades,
        win_rate: winning_trades as f64 / total_trades as f64,
        avg_holding_time_minutes,
        biggest_win_usd,
        biggest_loss_usd,
        total_pnl_usd: saturating_sum(trades.iter().map(|t| t.pnl_usd)),
        rug_count: trades.iter().filter(|t| t.is_rug).count() as u32,
        total_volume_usd: saturating_sum(trades.iter().map(|t| t.token_in_usd)),
    }
}
