use crate::position_matcher::{classify_swap, SwapSide};
use crate::token_registry::TokenRegistry;
use crate::types::{SwapEvent, TokenPosition, TradeRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A leg worth at most this share of the other leg is treated as rugged.
pub const RUG_THRESHOLD: Decimal = dec!(0.01);

const MS_PER_MINUTE: i64 = 60_000;

fn price_of(prices: &HashMap<String, Decimal>, mint: &str) -> Decimal {
    prices.get(mint).copied().unwrap_or(Decimal::ZERO)
}

fn usd_value(amount: Decimal, price: Decimal) -> Decimal {
    amount.checked_mul(price).unwrap_or(Decimal::ZERO)
}

/// Turns swaps into per-trade P&L records against current prices.
///
/// Stateless: the same swaps, positions and prices always give the same records.
pub struct TradeReconstructor<'a> {
    registry: &'a TokenRegistry,
}

impl<'a> TradeReconstructor<'a> {
    pub fn new(registry: &'a TokenRegistry) -> Self {
        Self { registry }
    }

    /// One record per swap, in input order.
    pub fn reconstruct(
        &self,
        swaps: &[SwapEvent],
        positions: &HashMap<String, TokenPosition>,
        prices: &HashMap<String, Decimal>,
    ) -> Vec<TradeRecord> {
        let records: Vec<TradeRecord> = swaps
            .iter()
            .map(|swap| self.reconstruct_one(swap, positions, prices))
            .collect();

        debug!(
            "Reconstructed {} trade records ({} rugs)",
            records.len(),
            records.iter().filter(|r| r.is_rug).count()
        );

        records
    }

    fn reconstruct_one(
        &self,
        swap: &SwapEvent,
        positions: &HashMap<String, TokenPosition>,
        prices: &HashMap<String, Decimal>,
    ) -> TradeRecord {
        let price_in = price_of(prices, &swap.token_in);
        let price_out = price_of(prices, &swap.token_out);
        let token_in_usd = usd_value(swap.amount_in, price_in);
        let token_out_usd = usd_value(swap.amount_out, price_out);

        let mut pnl_usd = Decimal::ZERO;
        let mut holding_time_minutes = Decimal::ZERO;
        let mut is_rug = false;
        let mut holding_time_anomaly = false;

        match classify_swap(&swap.token_in, &swap.token_out, self.registry) {
            SwapSide::Disposal(token) => {
                let reference = positions
                    .get(&token)
                    .and_then(|position| position.earliest_acquisition());

                if let Some(entry) = reference {
                    let elapsed_ms = swap.timestamp_ms.saturating_sub(entry.timestamp_ms);
                    if elapsed_ms < 0 {
                        warn!(
                            "Disposal {} of {} is {}ms before its first acquisition {}, clamping hold time to 0",
                            swap.signature, token, elapsed_ms.unsigned_abs(), entry.signature
                        );
                        holding_time_anomaly = true;
                    } else {
                        holding_time_minutes =
                            Decimal::from(elapsed_ms) / Decimal::from(MS_PER_MINUTE);
                    }

                    let entry_value = usd_value(entry.amount_in, price_of(prices, &entry.token_in));
                    pnl_usd = token_in_usd.saturating_sub(entry_value);

                    // Compares this swap's own legs, not the entry's.
                    if price_out > Decimal::ZERO {
                        if let Some(ratio) = price_in.checked_div(price_out) {
                            is_rug = ratio < RUG_THRESHOLD;
                        }
                    }
                }
            }
            SwapSide::Acquisition(_) => {
                let buy_value = token_in_usd;
                let current_value = token_out_usd;

                if price_out.is_zero() || current_value < usd_value(buy_value, RUG_THRESHOLD) {
                    is_rug = true;
                    pnl_usd = -buy_value;
                } else {
                    pnl_usd = current_value.saturating_sub(buy_value);
                }
            }
        }

        TradeRecord {
            swap: swap.clone(),
            pnl_usd,
            holding_time_minutes,
            is_win: pnl_usd > Decimal::ZERO,
            is_rug,
            token_in_usd,
            token_out_usd,
            holding_time_anomaly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position_matcher::build_positions;
    use config_manager::WRAPPED_SOL_MINT;

    const X: &str = "TokenX1111111111111111111111111111111111111";
    const Y: &str = "TokenY1111111111111111111111111111111111111";

    fn swap(sig: &str, ts: i64, token_in: &str, amount_in: Decimal, token_out: &str, amount_out: Decimal) -> SwapEvent {
        SwapEvent {
            signature: sig.to_string(),
            timestamp_ms: ts,
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            amount_in,
            amount_out,
            program_id: "test".to_string(),
        }
    }

    fn run(swaps: &[SwapEvent], prices: &HashMap<String, Decimal>) -> Vec<TradeRecord> {
        let registry = TokenRegistry::default();
        let positions = build_positions(swaps, &registry);
        TradeReconstructor::new(&registry).reconstruct(swaps, &positions, prices)
    }

    #[test]
    fn test_round_trip_profit() {
        let swaps = vec![
            swap("buy", 0, WRAPPED_SOL_MINT, dec!(10), X, dec!(100)),
            swap("sell", 3_600_000, X, dec!(100), WRAPPED_SOL_MINT, dec!(25)),
        ];
        let prices = HashMap::from([
            (WRAPPED_SOL_MINT.to_string(), dec!(2)),
            (X.to_string(), dec!(0.5)),
        ]);

        let records = run(&swaps, &prices);
        assert_eq!(records.len(), 2);

        // buy: spent $20, holding $50 now
        assert_eq!(records[0].pnl_usd, dec!(30));
        assert!(records[0].is_win);
        assert!(!records[0].is_rug);

        // sell: $50 out of X vs $20 in at entry
        let sell = &records[1];
        assert_eq!(sell.token_in_usd, dec!(50));
        assert_eq!(sell.token_out_usd, dec!(50));
        assert_eq!(sell.pnl_usd, dec!(30));
        assert_eq!(sell.holding_time_minutes, dec!(60));
        assert!(sell.is_win);
        assert!(!sell.is_rug);
    }

    #[test]
    fn test_worthless_acquisition_is_full_loss_rug() {
        let swaps = vec![swap("buy", 0, WRAPPED_SOL_MINT, dec!(1), Y, dec!(1000))];
        let prices = HashMap::from([(WRAPPED_SOL_MINT.to_string(), dec!(100))]);

        let records = run(&swaps, &prices);
        assert!(records[0].is_rug);
        assert_eq!(records[0].pnl_usd, dec!(-100));
        assert!(!records[0].is_win);
    }

    #[test]
    fn test_disposal_of_collapsed_token_is_rug() {
        let swaps = vec![
            swap("buy", 0, WRAPPED_SOL_MINT, dec!(1), Y, dec!(1000)),
            swap("sell", 60_000, Y, dec!(1000), WRAPPED_SOL_MINT, dec!(0.001)),
        ];
        let prices = HashMap::from([(WRAPPED_SOL_MINT.to_string(), dec!(100))]);

        let records = run(&swaps, &prices);
        assert!(records[1].is_rug);
        assert_eq!(records[1].pnl_usd, dec!(-100));
    }

    #[test]
    fn test_disposal_rug_uses_current_swap_legs() {
        // Entry price is irrelevant to the disposal-side check
        let swaps = vec![
            swap("buy", 0, WRAPPED_SOL_MINT, dec!(1), X, dec!(10)),
            swap("sell", 60_000, X, dec!(10), WRAPPED_SOL_MINT, dec!(1)),
        ];
        let prices = HashMap::from([
            (WRAPPED_SOL_MINT.to_string(), dec!(200)),
            (X.to_string(), dec!(1)),
        ]);

        let records = run(&swaps, &prices);
        // 1 / 200 = 0.005 < 0.01
        assert!(records[1].is_rug);
    }

    #[test]
    fn test_disposal_without_acquisition_is_neutral() {
        let swaps = vec![swap("sell", 0, X, dec!(5), WRAPPED_SOL_MINT, dec!(1))];
        let prices = HashMap::from([
            (WRAPPED_SOL_MINT.to_string(), dec!(100)),
            (X.to_string(), dec!(20)),
        ]);

        let records = run(&swaps, &prices);
        assert_eq!(records[0].pnl_usd, Decimal::ZERO);
        assert_eq!(records[0].holding_time_minutes, Decimal::ZERO);
        assert!(!records[0].is_rug);
        assert!(!records[0].is_win);
        assert_eq!(records[0].token_in_usd, dec!(100));
    }

    #[test]
    fn test_earliest_acquisition_is_reference() {
        let swaps = vec![
            swap("buy-late", 120_000, WRAPPED_SOL_MINT, dec!(5), X, dec!(10)),
            swap("buy-early", 60_000, WRAPPED_SOL_MINT, dec!(1), X, dec!(10)),
            swap("sell", 180_000, X, dec!(20), WRAPPED_SOL_MINT, dec!(8)),
        ];
        let prices = HashMap::from([
            (WRAPPED_SOL_MINT.to_string(), dec!(10)),
            (X.to_string(), dec!(1)),
        ]);

        let records = run(&swaps, &prices);
        let sell = &records[2];
        assert_eq!(sell.holding_time_minutes, dec!(2));
        // $20 of X out minus $10 spent at the early entry
        assert_eq!(sell.pnl_usd, dec!(10));
    }

    #[test]
    fn test_same_timestamp_acquisitions_use_first_seen() {
        let swaps = vec![
            swap("buy-first", 60_000, WRAPPED_SOL_MINT, dec!(1), X, dec!(10)),
            swap("buy-second", 60_000, WRAPPED_SOL_MINT, dec!(3), X, dec!(10)),
            swap("sell", 120_000, X, dec!(20), WRAPPED_SOL_MINT, dec!(8)),
        ];
        let prices = HashMap::from([
            (WRAPPED_SOL_MINT.to_string(), dec!(10)),
            (X.to_string(), dec!(1)),
        ]);

        let records = run(&swaps, &prices);
        // $20 of X out minus the first entry's $10, not the second's $30
        assert_eq!(records[2].pnl_usd, dec!(10));
        assert_eq!(records[2].holding_time_minutes, dec!(1));
    }

    #[test]
    fn test_extreme_timestamps_and_amounts_saturate() {
        let swaps = vec![
            swap("buy", i64::MIN, WRAPPED_SOL_MINT, dec!(1), X, dec!(1)),
            swap("sell", i64::MAX, X, dec!(1), WRAPPED_SOL_MINT, dec!(1)),
            swap("sell-first", i64::MIN, X, dec!(1), WRAPPED_SOL_MINT, dec!(1)),
        ];
        let prices = HashMap::from([
            (WRAPPED_SOL_MINT.to_string(), dec!(1)),
            (X.to_string(), dec!(1)),
        ]);

        let records = run(&swaps, &prices);
        assert_eq!(
            records[1].holding_time_minutes,
            Decimal::from(i64::MAX) / Decimal::from(MS_PER_MINUTE)
        );
        assert!(!records[2].holding_time_anomaly);

        let huge = Decimal::MAX / dec!(2) + Decimal::ONE;
        let swaps = vec![
            swap("buy-a", 0, WRAPPED_SOL_MINT, huge, X, huge),
            swap("buy-b", 1, WRAPPED_SOL_MINT, huge, X, huge),
        ];
        let registry = TokenRegistry::default();
        let positions = build_positions(&swaps, &registry);
        assert_eq!(positions[X].total_acquired, Decimal::MAX);

        let records = TradeReconstructor::new(&registry).reconstruct(&swaps, &positions, &prices);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_disposal_before_acquisition_is_clamped_and_flagged() {
        let swaps = vec![
            swap("sell", 0, X, dec!(1), WRAPPED_SOL_MINT, dec!(1)),
            swap("buy", 600_000, WRAPPED_SOL_MINT, dec!(1), X, dec!(1)),
        ];
        let prices = HashMap::from([
            (WRAPPED_SOL_MINT.to_string(), dec!(1)),
            (X.to_string(), dec!(1)),
        ]);

        let records = run(&swaps, &prices);
        assert_eq!(records[0].holding_time_minutes, Decimal::ZERO);
        assert!(records[0].holding_time_anomaly);
        assert!(!records[1].holding_time_anomaly);
    }

    #[test]
    fn test_reconstruction_is_idempotent() {
        let swaps = vec![
            swap("buy", 0, WRAPPED_SOL_MINT, dec!(3), X, dec!(7)),
            swap("swap", 1_000, X, dec!(7), Y, dec!(2)),
            swap("sell", 2_000, Y, dec!(2), WRAPPED_SOL_MINT, dec!(1)),
        ];
        let prices = HashMap::from([
            (WRAPPED_SOL_MINT.to_string(), dec!(150)),
            (X.to_string(), dec!(0.3)),
        ]);

        assert_eq!(run(&swaps, &prices), run(&swaps, &prices));
    }
}
