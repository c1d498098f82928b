//! Combined journal report.

use journal_core::{AnalyticsConfig, TradeRecord, UnifiedMarketContext};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::context::{analyze_by_context, ContextPerformance};
use crate::correlation::{correlation_matrix, CorrelationCell, CorrelationMatrix};
use crate::market_score::{MarketAssessment, MarketScorer};
use crate::session::{compute_session_metrics, session_insights, SessionBreakdown, SessionInsight};
use crate::tilt::{TiltAnalysis, TiltDetector};

/// Every analytic run once over the same trade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalReport {
    pub closed_trades: usize,
    pub open_trades: usize,
    pub net_pnl: Decimal,
    /// Win rate over closed trades, in percent.
    pub win_rate: f64,
    pub correlation: CorrelationMatrix,
    /// Pairs in the matrix at or above the concentration threshold.
    pub concentrated_pairs: Vec<CorrelationCell>,
    pub tilt: TiltAnalysis,
    pub sessions: SessionBreakdown,
    pub session_insights: Vec<SessionInsight>,
    pub context: ContextPerformance,
    /// Present when a live market snapshot was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<MarketAssessment>,
}

impl JournalReport {
    pub fn build(
        trades: &[TradeRecord],
        live_context: Option<&UnifiedMarketContext>,
        config: &AnalyticsConfig,
    ) -> Self {
        let closed: Vec<&TradeRecord> = trades.iter().filter(|t| t.is_closed()).collect();
        let wins = closed.iter().filter(|t| t.is_win()).count();
        let win_rate = if closed.is_empty() {
            0.0
        } else {
            wins as f64 / closed.len() as f64 * 100.0
        };

        let correlation = correlation_matrix(trades, &config.correlation);
        let concentrated_pairs: Vec<CorrelationCell> = correlation
            .concentrated_pairs(config.correlation.high_correlation_threshold)
            .into_iter()
            .cloned()
            .collect();
        let sessions = compute_session_metrics(trades);
        let insights = session_insights(&sessions, &config.session);

        let report = Self {
            closed_trades: closed.len(),
            open_trades: trades.len() - closed.len(),
            net_pnl: closed.iter().map(|t| t.net_pnl()).sum(),
            win_rate,
            concentrated_pairs,
            correlation,
            tilt: TiltDetector::with_config(config.tilt.clone()).detect(trades),
            sessions,
            session_insights: insights,
            context: analyze_by_context(trades, &config.context),
            market: live_context
                .map(|ctx| MarketScorer::with_config(config.market_score.clone()).assess(ctx)),
        };

        tracing::info!(
            closed = report.closed_trades,
            open = report.open_trades,
            tilt_score = report.tilt.tilt_score,
            episodes = report.tilt.episodes.len(),
            symbols = report.correlation.symbols.len(),
            "journal report built"
        );

        report
    }
}
