//! CLI commands for the journal analytics.

pub mod analyze;
pub mod report;

pub use analyze::{
    run_correlation, run_score, run_sessions, run_tilt, CorrelationArgs, ScoreArgs, TradesArgs,
};
pub use report::{run_report, ReportArgs};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use journal_core::{AnalyticsConfig, ConfigLoader, TradeRecord, UnifiedMarketContext};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Loads the analytics config, falling back to validated defaults.
///
/// # Errors
/// Returns an error if an explicit path does not exist, or if the file
/// cannot be parsed or fails validation.
pub fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    match path {
        Some(path) => {
            anyhow::ensure!(path.is_file(), "Config file {} does not exist", path.display());
            ConfigLoader::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => ConfigLoader::load_default().context("Failed to load default config"),
    }
}

/// Reads a JSON array of trade records.
///
/// # Errors
/// Returns an error if the file is unreadable or not a valid trade export.
pub fn load_trades(path: &Path) -> Result<Vec<TradeRecord>> {
    let trades: Vec<TradeRecord> = read_json(path)?;
    tracing::info!(path = %path.display(), trades = trades.len(), "Loaded trades");
    Ok(trades)
}

/// Reads a single market context snapshot.
///
/// # Errors
/// Returns an error if the file is unreadable or not a valid snapshot.
pub fn load_context(path: &Path) -> Result<UnifiedMarketContext> {
    read_json(path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
