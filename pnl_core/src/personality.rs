use crate::format::format_thousands;
use crate::types::{Badge, Personality, Preferences, Timing, TradeStats};
use config_manager::ScoringConfig;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

pub const GHOST_TITLE: &str = "Ghost Wallet";
pub const GHOST_ROAST: &str = "No trading history found. Are you even trying?";
const BORING_ROAST: &str =
    "Somehow, you've managed to be too boring to roast. That's almost an achievement.";

pub const MAX_BADGES: usize = 6;

fn usd(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn badge(emoji: &str, label: impl Into<String>, description: impl Into<String>) -> Badge {
    Badge {
        emoji: emoji.to_string(),
        label: label.into(),
        description: description.into(),
    }
}

/// Maps aggregates to a degen score, title, badges and roast.
#[derive(Debug, Clone)]
pub struct PersonalityGenerator {
    weights: ScoringConfig,
}

impl Default for PersonalityGenerator {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl PersonalityGenerator {
    pub fn new(weights: ScoringConfig) -> Self {
        Self { weights }
    }

    /// Sentinel for wallets with no swaps.
    pub fn ghost() -> Personality {
        Personality {
            degen_score: 0,
            main_title: GHOST_TITLE.to_string(),
            badges: Vec::new(),
            roast: GHOST_ROAST.to_string(),
        }
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        stats: &TradeStats,
        preferences: &Preferences,
        timing: &Timing,
        rng: &mut R,
    ) -> Personality {
        let degen_score = self.degen_score(stats, preferences, timing);
        let personality = Personality {
            degen_score,
            main_title: Self::main_title(degen_score, stats, preferences).to_string(),
            badges: Self::badges(stats, preferences, timing),
            roast: Self::roast(degen_score, stats, preferences, timing, rng),
        };

        debug!(
            "Personality: score={} title='{}' badges={}",
            personality.degen_score,
            personality.main_title,
            personality.badges.len()
        );

        personality
    }

    /// Weighted sum of seven 0-100 sub-scores, clamped and rounded.
    pub fn degen_score(&self, stats: &TradeStats, preferences: &Preferences, timing: &Timing) -> u8 {
        let w = &self.weights;

        let win_rate_score = (1.0 - stats.win_rate) * 100.0;
        let rug_score = (stats.rug_count as f64 * 15.0).min(100.0);
        let memecoin_score = preferences.memecoin_percent * 100.0;
        let frequency_score = (timing.avg_trades_per_day * 10.0).min(100.0);

        let biggest_win = usd(stats.biggest_win_usd);
        let biggest_loss = usd(stats.biggest_loss_usd);
        let volatility_score = if biggest_win > 0.0 && biggest_loss > 0.0 {
            ((biggest_win + biggest_loss) / 1000.0).min(100.0)
        } else {
            50.0
        };

        let night_score = timing.night_owl_percent * 100.0;
        let weekend_score = timing.weekend_trader_percent * 100.0;

        let raw = win_rate_score * w.win_rate
            + rug_score * w.rug_count
            + memecoin_score * w.memecoin_percent
            + frequency_score * w.trading_frequency
            + volatility_score * w.volatility
            + night_score * w.night_owl
            + weekend_score * w.weekend_trader;

        if raw.is_nan() {
            return 0;
        }
        raw.clamp(0.0, 100.0).round() as u8
    }

    pub fn main_title(degen_score: u8, stats: &TradeStats, preferences: &Preferences) -> &'static str {
        let total_pnl = usd(stats.total_pnl_usd);

        if stats.rug_count >= 5 {
            return "Rug Collector";
        }
        if stats.win_rate >= 0.8 && stats.total_trades >= 10 {
            return "Lucky Bastard";
        }
        if stats.win_rate <= 0.2 && stats.total_trades >= 10 {
            return "Professional Bag Holder";
        }
        if preferences.memecoin_percent >= 0.9 {
            return "Full Degen";
        }
        if total_pnl > 10_000.0 {
            return "Whale Watcher";
        }
        if total_pnl < -5_000.0 {
            return "Generous Donor";
        }

        match degen_score {
            90..=u8::MAX => "Certified Degenerate",
            80..=89 => "High Risk Enjoyer",
            70..=79 => "Memecoin Maximalist",
            60..=69 => "Aspiring Degen",
            50..=59 => "Casual Trader",
            40..=49 => "Cautious Cat",
            30..=39 => "DeFi Dad",
            20..=29 => "Index Hugger",
            10..=19 => "Paper Hands",
            _ => "Tourist",
        }
    }

    /// Ordered badge ladder, truncated to [`MAX_BADGES`].
    pub fn badges(stats: &TradeStats, preferences: &Preferences, timing: &Timing) -> Vec<Badge> {
        let mut badges = Vec::new();
        let total_pnl = usd(stats.total_pnl_usd);
        let volume = usd(stats.total_volume_usd);

        if stats.rug_count >= 10 {
            badges.push(badge("🪦", "Graveyard Keeper", "10+ rugged tokens in portfolio"));
        } else if stats.rug_count >= 5 {
            badges.push(badge("💀", "Rug Survivor", "5+ rugged tokens in portfolio"));
        } else if stats.rug_count >= 1 {
            badges.push(badge("🪤", "Got Rugged", "At least one rugged token"));
        }

        if stats.win_rate >= 0.8 && stats.total_trades >= 5 {
            badges.push(badge("🎯", "Sharp Shooter", "80%+ win rate"));
        } else if stats.win_rate <= 0.2 && stats.total_trades >= 5 {
            badges.push(badge("🎰", "Gambling Addict", "Less than 20% win rate"));
        }

        if preferences.memecoin_percent >= 0.9 {
            badges.push(badge("🐸", "Memecoin Maxi", "90%+ memecoin trades"));
        } else if preferences.memecoin_percent >= 0.7 {
            badges.push(badge("🦊", "Meme Lover", "70%+ memecoin trades"));
        }

        if timing.avg_trades_per_day >= 10.0 {
            badges.push(badge("⚡", "Speed Demon", "10+ trades per day average"));
        } else if timing.avg_trades_per_day >= 5.0 {
            badges.push(badge("🔥", "Active Trader", "5+ trades per day average"));
        }

        if timing.night_owl_percent >= 0.5 {
            badges.push(badge("🦉", "Night Owl", "50%+ trades between 10PM-6AM"));
        }

        if timing.weekend_trader_percent >= 0.4 {
            badges.push(badge("📅", "Weekend Warrior", "40%+ trades on weekends"));
        }

        if total_pnl >= 10_000.0 {
            badges.push(badge("💎", "Diamond Hands", "$10K+ total profit"));
        } else if total_pnl <= -5_000.0 {
            badges.push(badge("🗑️", "Money Burner", "$5K+ total losses"));
        }

        if volume >= 100_000.0 {
            badges.push(badge("🐋", "Whale", "$100K+ trading volume"));
        } else if volume >= 10_000.0 {
            badges.push(badge("🐬", "Dolphin", "$10K+ trading volume"));
        }

        if stats.avg_holding_time_minutes <= Decimal::from(30) && stats.total_trades >= 5 {
            badges.push(badge("🏃", "Quick Flipper", "Average hold time under 30 minutes"));
        }

        if preferences.favorite_token_trades >= 10 {
            badges.push(badge(
                "❤️",
                format!("{} Lover", preferences.favorite_token),
                format!("10+ trades with {}", preferences.favorite_token),
            ));
        }

        badges.truncate(MAX_BADGES);
        badges
    }

    /// First matching category wins; the line within it is drawn from `rng`.
    pub fn roast<R: Rng + ?Sized>(
        degen_score: u8,
        stats: &TradeStats,
        preferences: &Preferences,
        timing: &Timing,
        rng: &mut R,
    ) -> String {
        let total_pnl = usd(stats.total_pnl_usd);
        let quick_flipper =
            stats.avg_holding_time_minutes <= Decimal::from(30) && stats.total_trades >= 5;

        let categories: Vec<(bool, Vec<String>)> = vec![
            (
                degen_score >= 90,
                vec![
                    "Your portfolio looks like a museum of failed projects. Impressive dedication to losing money.".into(),
                    "You don't buy dips, you ARE the dip. Consistent commitment to catching falling knives.".into(),
                    "Your trading strategy appears to be 'buy high, sell never, hold until zero'.".into(),
                ],
            ),
            (
                stats.rug_count >= 5,
                vec![
                    format!(
                        "{} rugs? At this point, you could furnish an entire house with your losses.",
                        stats.rug_count
                    ),
                    "You've been rugged so many times, the scammers send you Christmas cards.".into(),
                    "Your rug collection is more diverse than most NFT collections. Truly a connoisseur.".into(),
                ],
            ),
            (
                stats.win_rate <= 0.3 && stats.total_trades >= 5,
                vec![
                    format!(
                        "{}% win rate? A coin flip would outperform you.",
                        (stats.win_rate * 100.0).round() as i64
                    ),
                    "Have you considered doing the opposite of what you think is a good trade?".into(),
                    "Your trading history reads like a tutorial on how NOT to invest.".into(),
                ],
            ),
            (
                preferences.memecoin_percent >= 0.8,
                vec![
                    "Your portfolio is basically a zoo of animal-themed tokens. Dr. Doolittle of crypto.".into(),
                    "90% memecoins? At least you're consistent in your questionable life choices.".into(),
                    "You put more research into meme formats than token fundamentals.".into(),
                ],
            ),
            (
                timing.night_owl_percent >= 0.5,
                vec![
                    "Most of your trades are at 3 AM. Sleep deprivation explains a lot about your decisions.".into(),
                    "Night trading while half-asleep - that's commitment to bad decision-making.".into(),
                    "Your circadian rhythm is as broken as your portfolio.".into(),
                ],
            ),
            (
                total_pnl < -1_000.0,
                vec![
                    format!(
                        "Down {}? That's not a loss, that's a donation to liquidity providers.",
                        format_thousands(total_pnl.round().abs() as u64)
                    ),
                    "You've contributed more to Solana liquidity than most VCs. Thank you for your service.".into(),
                    "Think of your losses as expensive tuition for a degree you'll never use.".into(),
                ],
            ),
            (
                quick_flipper,
                vec![
                    "Average hold time under 30 minutes? Your attention span rivals a goldfish.".into(),
                    "You call it day trading, I call it expensive fidget spinning.".into(),
                    "You swap tokens faster than you swipe on dating apps.".into(),
                ],
            ),
            (
                true,
                vec![
                    "Your portfolio diversification strategy: buy everything that has a dog in the logo.".into(),
                    "Trading isn't for everyone. You're proving that theory daily.".into(),
                    "At least you're having fun. You ARE having fun, right?".into(),
                    "Some people invest. You collect lottery tickets with extra steps.".into(),
                    "Your 'research' consists of checking how many rocket emojis are in the Telegram.".into(),
                ],
            ),
        ];

        categories
            .into_iter()
            .find(|(matches, _)| *matches)
            .and_then(|(_, lines)| lines.choose(rng).cloned())
            .unwrap_or_else(|| BORING_ROAST.to_string())
    }
}
