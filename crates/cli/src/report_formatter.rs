#![allow(clippy::format_push_string)]

use journal_analytics::{ContextBucket, JournalReport};
use journal_core::{format_percent, format_pnl, Currency, Locale, TradingSession};

const RULE: &str = "═══════════════════════════════════════════════════════════════\n";
const SECTION_RULE: &str = "───────────────────────────────────────────────────────────────\n";

/// Renders a `JournalReport` as a plain-text summary.
pub struct ReportFormatter {
    currency: Currency,
    locale: Locale,
}

impl ReportFormatter {
    #[must_use]
    pub fn new(currency: Currency, locale: Locale) -> Self {
        Self { currency, locale }
    }

    #[must_use]
    pub fn format(&self, report: &JournalReport) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str(RULE);
        output.push_str("                      JOURNAL REPORT                           \n");
        output.push_str(RULE);
        output.push('\n');

        self.overview(report, &mut output);
        self.tilt(report, &mut output);
        self.sessions(report, &mut output);
        self.correlation(report, &mut output);
        self.context(report, &mut output);
        self.market(report, &mut output);

        output.push_str(RULE);

        if report.closed_trades == 0 {
            output.push_str("\nNo closed trades yet. Analytics will fill in as you journal.\n\n");
        }

        output
    }

    fn pct(&self, value: f64) -> String {
        format_percent(value, 1, self.locale)
    }

    fn overview(&self, report: &JournalReport, output: &mut String) {
        output.push_str("Overview\n");
        output.push_str(SECTION_RULE);
        output.push_str(&format!("Closed Trades:         {}\n", report.closed_trades));
        output.push_str(&format!("Open Trades:           {}\n", report.open_trades));
        output.push_str(&format!(
            "Net P&L:               {}\n",
            format_pnl(report.net_pnl, self.currency, self.locale)
        ));
        if report.closed_trades > 0 {
            output.push_str(&format!("Win Rate:              {}\n", self.pct(report.win_rate)));
        } else {
            output.push_str("Win Rate:              N/A (no trades)\n");
        }
        output.push('\n');
    }

    fn tilt(&self, report: &JournalReport, output: &mut String) {
        let tilt = &report.tilt;
        output.push_str("Tilt\n");
        output.push_str(SECTION_RULE);

        if !tilt.sufficient_data {
            output.push_str(&format!(
                "Not enough closed trades ({}) to assess tilt.\n\n",
                tilt.trades_analyzed
            ));
            return;
        }

        output.push_str(&format!("Tilt Score:            {:.1} / 100\n", tilt.tilt_score));
        output.push_str(&format!("Risk:                  {:?}\n", tilt.current_risk));
        output.push_str(&format!("Episodes:              {}\n", tilt.episodes.len()));
        for episode in &tilt.episodes {
            output.push_str(&format!(
                "  {} -> {}  {:?}  {} trades  {}\n",
                episode.start_date.format("%Y-%m-%d %H:%M"),
                episode.end_date.format("%Y-%m-%d %H:%M"),
                episode.severity,
                episode.trade_count,
                format_pnl(episode.total_pnl, self.currency, self.locale)
            ));
        }
        output.push_str(&format!("{}\n", tilt.current_risk.recommendation()));
        output.push('\n');
    }

    fn sessions(&self, report: &JournalReport, output: &mut String) {
        output.push_str("Sessions\n");
        output.push_str(SECTION_RULE);
        for session in TradingSession::ALL {
            let perf = report.sessions.get(session);
            if perf.trades == 0 {
                continue;
            }
            output.push_str(&format!(
                "{:<12} {:>4} trades  {:>8}  {}\n",
                session.label(),
                perf.trades,
                self.pct(perf.win_rate),
                format_pnl(perf.total_pnl, self.currency, self.locale)
            ));
        }
        for insight in &report.session_insights {
            output.push_str(&format!("* {}\n", insight.message()));
        }
        output.push('\n');
    }

    fn correlation(&self, report: &JournalReport, output: &mut String) {
        if report.correlation.symbols.len() < 2 {
            return;
        }
        output.push_str("Correlation\n");
        output.push_str(SECTION_RULE);
        if report.concentrated_pairs.is_empty() {
            output.push_str("No highly correlated instruments.\n");
        }
        for cell in &report.concentrated_pairs {
            output.push_str(&format!(
                "{} / {}: {:.2} ({:?})\n",
                cell.row_symbol, cell.col_symbol, cell.value, cell.source
            ));
        }
        output.push('\n');
    }

    fn context(&self, report: &JournalReport, output: &mut String) {
        if report.context.classified == 0 {
            return;
        }
        output.push_str("Market Conditions\n");
        output.push_str(SECTION_RULE);
        for bucket in ContextBucket::ALL {
            let Some(perf) = report.context.buckets.get(&bucket).filter(|p| p.trades > 0) else {
                continue;
            };
            output.push_str(&format!(
                "{:<12} {:>4} trades  {:>8}  {}\n",
                bucket.label(),
                perf.trades,
                self.pct(perf.win_rate),
                format_pnl(perf.total_pnl, self.currency, self.locale)
            ));
        }
        if let Some(best) = report.context.best_zone {
            output.push_str(&format!("Best Zone:             {}\n", best.label()));
        }
        output.push('\n');
    }

    fn market(&self, report: &JournalReport, output: &mut String) {
        let Some(market) = &report.market else {
            return;
        };
        output.push_str("Market Now\n");
        output.push_str(SECTION_RULE);
        output.push_str(&format!("Score:                 {} / 100\n", market.score));
        output.push_str(&format!("Bias:                  {}\n", market.bias.label()));
        output.push_str(&format!("Data Quality:          {}%\n", market.data_quality));
        output.push('\n');
    }
}
