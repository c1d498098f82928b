use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod report_formatter;

use commands::{CorrelationArgs, ReportArgs, ScoreArgs, TradesArgs};

#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "Behavioral analytics for trade journal exports", long_about = None)]
struct Cli {
    /// Analytics config file (TOML). Defaults are used when omitted.
    #[arg(short, long, global = true, env = "JOURNAL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every analytic and print the combined report
    Report(ReportArgs),
    /// Detect revenge-trading patterns
    Tilt(TradesArgs),
    /// Break performance down by trading session
    Sessions(TradesArgs),
    /// Correlate daily P&L between instruments
    Correlation(CorrelationArgs),
    /// Score a market context snapshot
    Score(ScoreArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Report(args) => commands::run_report(&args, &config),
        Commands::Tilt(args) => commands::run_tilt(&args, &config),
        Commands::Sessions(args) => commands::run_sessions(&args, &config),
        Commands::Correlation(args) => commands::run_correlation(&args, &config),
        Commands::Score(args) => commands::run_score(&args, &config),
    }
}
