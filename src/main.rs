use anyhow::{Context, Result};
use clap::Parser;
use config_manager::SystemConfig;
use job_orchestrator::WalletAnalyzer;
use pnl_core::format::{
    format_duration, format_percent, format_thousands, format_usd, hour_label, shorten_address,
};
use pnl_core::WalletAnalysisReport;
use std::fmt::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "wallet_roaster")]
#[command(about = "Analyze a Solana wallet's swaps and roast its trading habits", long_about = None)]
struct Args {
    /// Wallet address to analyze
    address: String,

    /// Print the full report as JSON instead of the summary
    #[arg(long)]
    json: bool,

    /// Configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

fn write_summary(out: &mut impl Write, report: &WalletAnalysisReport) -> fmt::Result {
    let stats = &report.stats;
    let prefs = &report.preferences;
    let timing = &report.timing;
    let personality = &report.personality;

    let rule = "=".repeat(60);

    writeln!(out, "{}", rule)?;
    writeln!(
        out,
        "{}  |  {}",
        shorten_address(&report.address, 4),
        personality.main_title
    )?;
    writeln!(out, "Degen score: {}/100", personality.degen_score)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "\"{}\"", personality.roast)?;

    if !personality.badges.is_empty() {
        writeln!(out)?;
        for badge in &personality.badges {
            writeln!(out, "{} {} - {}", badge.emoji, badge.label, badge.description)?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Trades: {} ({} won, {} lost)  Win rate: {}",
        format_thousands(u64::from(stats.total_trades)),
        stats.winning_trades,
        stats.losing_trades,
        format_percent(stats.win_rate)
    )?;
    writeln!(
        out,
        "Total P&L: {}  Volume: {}",
        format_usd(stats.total_pnl_usd),
        format_usd(stats.total_volume_usd)
    )?;
    writeln!(
        out,
        "Biggest win: {}  Biggest loss: {}  Rugs: {}",
        format_usd(stats.biggest_win_usd),
        format_usd(stats.biggest_loss_usd),
        stats.rug_count
    )?;
    writeln!(
        out,
        "Avg hold: {}",
        format_duration(stats.avg_holding_time_minutes)
    )?;

    if !prefs.favorite_token.is_empty() {
        writeln!(
            out,
            "Favorite token: {} ({} trades)",
            prefs.favorite_token, prefs.favorite_token_trades
        )?;
    }
    writeln!(
        out,
        "Memecoins {}  DeFi {}  Other {}",
        format_percent(prefs.memecoin_percent),
        format_percent(prefs.defi_percent),
        format_percent(prefs.other_percent)
    )?;
    writeln!(
        out,
        "Most active: {}s around {}  Night owl {}  Weekend {}  {:.1} trades/day",
        timing.most_active_day,
        hour_label(timing.most_active_hour),
        format_percent(timing.night_owl_percent),
        format_percent(timing.weekend_trader_percent),
        timing.avg_trades_per_day
    )?;

    Ok(())
}

fn render_summary(report: &WalletAnalysisReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_summary(&mut out, report)?;
    Ok(out)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wallet_roaster=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = SystemConfig::load_from_path(&args.config).context("Failed to load configuration")?;
    let analyzer = WalletAnalyzer::from_config(&config).context("Failed to initialize analyzer")?;

    info!("Analyzing {}", args.address);
    let report = analyzer
        .analyze(&args.address)
        .await
        .with_context(|| format!("Analysis of {} failed", args.address.trim()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_summary(&report)?);
    }

    Ok(())
}
