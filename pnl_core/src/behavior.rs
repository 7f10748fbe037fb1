use crate::token_registry::{TokenCategory, TokenRegistry};
use crate::types::{Preferences, SwapEvent, Timing};
use chrono::{DateTime, Datelike, Timelike};
use tracing::warn;

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const MS_PER_DAY: f64 = 86_400_000.0;

/// Category shares and favourite token, from the received side of each swap.
pub fn calculate_preferences(swaps: &[SwapEvent], registry: &TokenRegistry) -> Preferences {
    let mut memecoin = 0u32;
    let mut defi = 0u32;
    let mut other = 0u32;

    // first-seen order decides ties
    let mut counts: Vec<(&str, u32)> = Vec::new();

    for swap in swaps {
        let token = swap.token_out.as_str();
        match counts.iter_mut().find(|(mint, _)| *mint == token) {
            Some((_, count)) => *count += 1,
            None => counts.push((token, 1)),
        }

        if registry.is_cash(token) {
            continue;
        }

        match registry.category(token) {
            TokenCategory::Memecoin => memecoin += 1,
            TokenCategory::Defi => defi += 1,
            TokenCategory::Other => other += 1,
        }
    }

    let categorized = match memecoin + defi + other {
        0 => 1.0,
        n => n as f64,
    };

    let mut favorite: Option<(&str, u32)> = None;
    for &(mint, count) in &counts {
        if registry.is_cash(mint) {
            continue;
        }
        if favorite.map_or(true, |(_, best)| count > best) {
            favorite = Some((mint, count));
        }
    }

    Preferences {
        memecoin_percent: memecoin as f64 / categorized,
        defi_percent: defi as f64 / categorized,
        nft_percent: 0.0,
        other_percent: other as f64 / categorized,
        favorite_token: favorite
            .map(|(mint, _)| registry.symbol(mint))
            .unwrap_or_default(),
        favorite_token_mint: favorite.map(|(mint, _)| mint.to_string()),
        favorite_token_trades: favorite.map(|(_, count)| count).unwrap_or(0),
    }
}

fn argmax(buckets: &[u32]) -> usize {
    let mut best = 0;
    for (index, &count) in buckets.iter().enumerate() {
        if count > buckets[best] {
            best = index;
        }
    }
    best
}

/// UTC hour/day histograms and trade velocity.
pub fn calculate_timing(swaps: &[SwapEvent]) -> Timing {
    if swaps.is_empty() {
        return Timing::default();
    }

    let mut hours = [0u32; 24];
    let mut days = [0u32; 7];
    let mut weekend = 0u32;
    let mut night = 0u32;

    for swap in swaps {
        let Some(at) = DateTime::from_timestamp_millis(swap.timestamp_ms) else {
            warn!(
                "Swap {} has out-of-range timestamp {}, skipping for timing",
                swap.signature, swap.timestamp_ms
            );
            continue;
        };

        let hour = at.hour() as usize;
        let day = at.weekday().num_days_from_sunday() as usize;
        hours[hour] += 1;
        days[day] += 1;

        if day == 0 || day == 6 {
            weekend += 1;
        }
        if hour >= 22 || hour < 6 {
            night += 1;
        }
    }

    let total = swaps.len() as f64;
    let (min_ts, max_ts) = swaps.iter().fold((i64::MAX, i64::MIN), |(lo, hi), s| {
        (lo.min(s.timestamp_ms), hi.max(s.timestamp_ms))
    });
    let day_range = (max_ts.saturating_sub(min_ts) as f64 / MS_PER_DAY).max(1.0);

    Timing {
        most_active_hour: argmax(&hours) as u32,
        most_active_day: DAY_NAMES[argmax(&days)].to_string(),
        weekend_trader_percent: weekend as f64 / total,
        night_owl_percent: night as f64 / total,
        avg_trades_per_day: total / day_range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use config_manager::WRAPPED_SOL_MINT;
    use rust_decimal_macros::dec;

    const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
    const JUP: &str = "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN";
    const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn swap_at(ts: i64, token_in: &str, token_out: &str) -> SwapEvent {
        SwapEvent {
            signature: format!("sig-{}", ts),
            timestamp_ms: ts,
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            amount_in: dec!(1),
            amount_out: dec!(1),
            program_id: "p".to_string(),
        }
    }

    fn ms(y: i32, mo: u32, d: u32, h: u32) -> i64 {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap().timestamp_millis()
    }

    #[test]
    fn test_empty_preferences() {
        let prefs = calculate_preferences(&[], &TokenRegistry::default());
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_category_shares_skip_cash_destinations() {
        let registry = TokenRegistry::default();
        let swaps = vec![
            swap_at(0, WRAPPED_SOL_MINT, BONK),
            swap_at(1, WRAPPED_SOL_MINT, "UnknownMint"),
            swap_at(2, USDC, JUP),
            swap_at(3, BONK, WRAPPED_SOL_MINT),
            swap_at(4, JUP, USDC),
        ];

        let prefs = calculate_preferences(&swaps, &registry);
        assert!((prefs.memecoin_percent - 2.0 / 3.0).abs() < 1e-9);
        assert!((prefs.defi_percent - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(prefs.nft_percent, 0.0);
        let sum = prefs.memecoin_percent + prefs.defi_percent + prefs.other_percent;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_favorite_token_tie_goes_to_first_seen() {
        let registry = TokenRegistry::default();
        let swaps = vec![
            swap_at(0, BONK, WRAPPED_SOL_MINT),
            swap_at(1, WRAPPED_SOL_MINT, JUP),
            swap_at(2, WRAPPED_SOL_MINT, BONK),
            swap_at(3, BONK, WRAPPED_SOL_MINT),
            swap_at(4, WRAPPED_SOL_MINT, BONK),
            swap_at(5, WRAPPED_SOL_MINT, JUP),
        ];

        let prefs = calculate_preferences(&swaps, &registry);
        // SOL is received as often, but cash is never a favourite
        assert_eq!(prefs.favorite_token, "JUP");
        assert_eq!(prefs.favorite_token_mint.as_deref(), Some(JUP));
        assert_eq!(prefs.favorite_token_trades, 2);
    }

    #[test]
    fn test_empty_timing_defaults() {
        let timing = calculate_timing(&[]);
        assert_eq!(timing.most_active_hour, 12);
        assert_eq!(timing.most_active_day, "Monday");
        assert_eq!(timing.avg_trades_per_day, 0.0);
    }

    #[test]
    fn test_single_swap_is_one_trade_per_day() {
        let timing = calculate_timing(&[swap_at(ms(2024, 3, 6, 15), WRAPPED_SOL_MINT, BONK)]);
        assert_eq!(timing.avg_trades_per_day, 1.0);
        assert_eq!(timing.most_active_hour, 15);
        assert_eq!(timing.most_active_day, "Wednesday");
    }

    #[test]
    fn test_night_and_weekend_buckets() {
        // 2024-03-09 is a Saturday, 2024-03-11 a Monday
        let swaps = vec![
            swap_at(ms(2024, 3, 9, 23), WRAPPED_SOL_MINT, BONK),
            swap_at(ms(2024, 3, 9, 2), WRAPPED_SOL_MINT, BONK),
            swap_at(ms(2024, 3, 11, 14), WRAPPED_SOL_MINT, BONK),
            swap_at(ms(2024, 3, 11, 5), WRAPPED_SOL_MINT, BONK),
        ];

        let timing = calculate_timing(&swaps);
        assert_eq!(timing.weekend_trader_percent, 0.5);
        assert_eq!(timing.night_owl_percent, 0.75);
        // Monday and Saturday tie, lowest index wins
        assert_eq!(timing.most_active_day, "Monday");
        // every hour bucket has one swap, lowest index wins
        assert_eq!(timing.most_active_hour, 2);
        // Sat 02:00 to Mon 14:00 is 2.5 days
        assert!((timing.avg_trades_per_day - 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let swaps = vec![
            swap_at(i64::MIN, WRAPPED_SOL_MINT, BONK),
            swap_at(i64::MAX, BONK, WRAPPED_SOL_MINT),
        ];

        let timing = calculate_timing(&swaps);
        assert!(timing.avg_trades_per_day > 0.0 && timing.avg_trades_per_day < 1.0);
        assert_eq!(timing.night_owl_percent, 0.0);
    }
}
