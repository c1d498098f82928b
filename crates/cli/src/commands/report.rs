//! Full journal report command.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use journal_analytics::JournalReport;
use journal_core::{AnalyticsConfig, Currency, Locale};

use super::{load_context, load_trades, print_json};
use crate::report_formatter::ReportFormatter;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Arguments for the report command.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Trade export (JSON array)
    #[arg(short, long)]
    pub trades: PathBuf,

    /// Live market context snapshot (JSON)
    #[arg(long)]
    pub context: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Display locale for text output (e.g. en-US, de-DE)
    #[arg(long, default_value = "en-US")]
    pub locale: String,

    /// Display currency for text output
    #[arg(long, default_value = "USD")]
    pub currency: String,
}

/// Runs the report command.
///
/// # Errors
/// Returns an error if an input file cannot be loaded or the locale/currency
/// is not supported.
pub fn run_report(args: &ReportArgs, config: &AnalyticsConfig) -> Result<()> {
    let locale: Locale = args.locale.parse()?;
    let currency: Currency = args.currency.parse()?;

    let trades = load_trades(&args.trades)?;
    let context = args.context.as_deref().map(load_context).transpose()?;

    let report = JournalReport::build(&trades, context.as_ref(), config);

    match args.format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            print!("{}", ReportFormatter::new(currency, locale).format(&report));
            Ok(())
        }
    }
}
