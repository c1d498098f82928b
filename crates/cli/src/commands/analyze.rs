//! Single-analytic commands.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use journal_analytics::{
    compute_session_metrics, correlation_matrix, pair_correlation, session_insights,
    MarketScorer, SessionBreakdown, SessionInsight, TiltDetector,
};
use journal_core::AnalyticsConfig;
use serde::Serialize;

use super::{load_context, load_trades, print_json};

/// Arguments shared by commands that only need a trade export.
#[derive(Args, Debug, Clone)]
pub struct TradesArgs {
    /// Trade export (JSON array)
    #[arg(short, long)]
    pub trades: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct CorrelationArgs {
    /// Trade export (JSON array)
    #[arg(short, long)]
    pub trades: PathBuf,

    /// Two instruments to correlate (e.g. BTCUSDT,ETHUSDT). Prints the full
    /// matrix when omitted.
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// Market context snapshot (JSON)
    #[arg(long)]
    pub context: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionsOutput {
    breakdown: SessionBreakdown,
    insights: Vec<SessionInsight>,
}

/// # Errors
/// Returns an error if the trade export cannot be loaded.
pub fn run_tilt(args: &TradesArgs, config: &AnalyticsConfig) -> Result<()> {
    let trades = load_trades(&args.trades)?;
    let analysis = TiltDetector::with_config(config.tilt.clone()).detect(&trades);
    tracing::info!(
        score = analysis.tilt_score,
        risk = ?analysis.current_risk,
        "{}",
        analysis.current_risk.recommendation()
    );
    print_json(&analysis)
}

/// # Errors
/// Returns an error if the trade export cannot be loaded.
pub fn run_sessions(args: &TradesArgs, config: &AnalyticsConfig) -> Result<()> {
    let trades = load_trades(&args.trades)?;
    let breakdown = compute_session_metrics(&trades);
    let insights = session_insights(&breakdown, &config.session);
    print_json(&SessionsOutput {
        breakdown,
        insights,
    })
}

/// # Errors
/// Returns an error if the trade export cannot be loaded or `--symbols` does
/// not name exactly two instruments.
pub fn run_correlation(args: &CorrelationArgs, config: &AnalyticsConfig) -> Result<()> {
    let trades = load_trades(&args.trades)?;

    match args.symbols.as_slice() {
        [] => print_json(&correlation_matrix(&trades, &config.correlation)),
        [a, b] => print_json(&pair_correlation(&trades, a, b, &config.correlation)),
        other => bail!("--symbols takes exactly two instruments, got {}", other.len()),
    }
}

/// # Errors
/// Returns an error if the snapshot cannot be loaded.
pub fn run_score(args: &ScoreArgs, config: &AnalyticsConfig) -> Result<()> {
    let context = load_context(&args.context)?;
    let assessment = MarketScorer::with_config(config.market_score.clone()).assess(&context);
    print_json(&assessment)
}
