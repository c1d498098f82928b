//! Session-based performance attribution.

use journal_core::{SessionConfig, TradeRecord, TradingSession};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed-trade performance within one session (or group of sessions).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPerformance {
    pub trades: usize,
    pub wins: usize,
    /// Win rate in percent, 0 when there are no trades.
    pub win_rate: f64,
    pub total_pnl: Decimal,
}

impl SessionPerformance {
    fn record(&mut self, trade: &TradeRecord) {
        self.trades += 1;
        self.wins += usize::from(trade.is_win());
        self.total_pnl += trade.net_pnl();
        self.refresh_win_rate();
    }

    fn merge(&self, other: &Self) -> Self {
        let mut merged = Self {
            trades: self.trades + other.trades,
            wins: self.wins + other.wins,
            win_rate: 0.0,
            total_pnl: self.total_pnl + other.total_pnl,
        };
        merged.refresh_win_rate();
        merged
    }

    fn refresh_win_rate(&mut self) {
        self.win_rate = if self.trades == 0 {
            0.0
        } else {
            self.wins as f64 / self.trades as f64 * 100.0
        };
    }

    fn is_eligible(&self, config: &SessionConfig) -> bool {
        self.trades >= config.min_trades_per_session
    }
}

const NO_TRADES: SessionPerformance = SessionPerformance {
    trades: 0,
    wins: 0,
    win_rate: 0.0,
    total_pnl: Decimal::ZERO,
};

/// Per-session performance. Every session is present when computed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBreakdown {
    pub sessions: BTreeMap<TradingSession, SessionPerformance>,
}

impl Default for SessionBreakdown {
    fn default() -> Self {
        Self {
            sessions: TradingSession::ALL
                .iter()
                .map(|s| (*s, SessionPerformance::default()))
                .collect(),
        }
    }
}

impl SessionBreakdown {
    /// Performance for `session`; a session missing from a deserialized
    /// breakdown reads as empty.
    #[must_use]
    pub fn get(&self, session: TradingSession) -> &SessionPerformance {
        self.sessions.get(&session).unwrap_or(&NO_TRADES)
    }

    /// Session with the highest net P&L among sessions that saw trades.
    /// Ties go to the earlier session.
    #[must_use]
    pub fn best_session(&self) -> Option<TradingSession> {
        self.sessions
            .iter()
            .filter(|(_, perf)| perf.trades > 0)
            .rev()
            .max_by_key(|(_, perf)| perf.total_pnl)
            .map(|(session, _)| *session)
    }

    #[must_use]
    pub fn total_trades(&self) -> usize {
        self.sessions.values().map(|p| p.trades).sum()
    }

    fn aggregate(&self, include: impl Fn(TradingSession) -> bool) -> SessionPerformance {
        self.sessions
            .iter()
            .filter(|(session, _)| include(**session))
            .fold(SessionPerformance::default(), |acc, (_, perf)| acc.merge(perf))
    }
}

/// Groups closed trades by session.
#[must_use]
pub fn compute_session_metrics(trades: &[TradeRecord]) -> SessionBreakdown {
    let mut breakdown = SessionBreakdown::default();
    for trade in trades.iter().filter(|t| t.is_closed()) {
        breakdown
            .sessions
            .entry(trade.trading_session())
            .or_default()
            .record(trade);
    }
    breakdown
}

/// An observation worth surfacing on the sessions page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SessionInsight {
    #[serde(rename_all = "camelCase")]
    BestWorst {
        best: TradingSession,
        best_win_rate: f64,
        worst: TradingSession,
        worst_win_rate: f64,
        gap: f64,
    },
    #[serde(rename_all = "camelCase")]
    OffHours {
        off_hours_win_rate: f64,
        regular_win_rate: f64,
        gap: f64,
    },
    #[serde(rename_all = "camelCase")]
    CrossRegion {
        asia_pacific_win_rate: f64,
        western_win_rate: f64,
        gap: f64,
    },
}

impl SessionInsight {
    /// One-line summary for display.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::BestWorst {
                best,
                best_win_rate,
                worst,
                worst_win_rate,
                ..
            } => format!(
                "{} is your strongest session ({best_win_rate:.1}% win rate) and {} your weakest ({worst_win_rate:.1}%).",
                best.label(),
                worst.label()
            ),
            Self::OffHours {
                off_hours_win_rate,
                regular_win_rate,
                ..
            } => {
                let verdict = if off_hours_win_rate > regular_win_rate {
                    "better"
                } else {
                    "worse"
                };
                format!(
                    "You trade {verdict} off-hours ({off_hours_win_rate:.1}%) than during regular sessions ({regular_win_rate:.1}%)."
                )
            }
            Self::CrossRegion {
                asia_pacific_win_rate,
                western_win_rate,
                ..
            } => {
                let stronger = if asia_pacific_win_rate > western_win_rate {
                    "Asia-Pacific"
                } else {
                    "Europe/Americas"
                };
                format!(
                    "{stronger} sessions suit you better (Asia-Pacific {asia_pacific_win_rate:.1}% vs Europe/Americas {western_win_rate:.1}%)."
                )
            }
        }
    }

    #[must_use]
    pub fn gap(&self) -> f64 {
        match self {
            Self::BestWorst { gap, .. } | Self::OffHours { gap, .. } | Self::CrossRegion { gap, .. } => {
                *gap
            }
        }
    }
}

/// Derives insights from a breakdown. Only sessions (or session groups)
/// meeting `min_trades_per_session` take part in a comparison.
#[must_use]
pub fn session_insights(breakdown: &SessionBreakdown, config: &SessionConfig) -> Vec<SessionInsight> {
    let mut insights = Vec::new();

    let eligible: Vec<(TradingSession, &SessionPerformance)> = breakdown
        .sessions
        .iter()
        .filter(|(_, perf)| perf.is_eligible(config))
        .map(|(session, perf)| (*session, perf))
        .collect();

    if eligible.len() >= 2 {
        let best = eligible
            .iter()
            .rev()
            .max_by(|a, b| a.1.win_rate.total_cmp(&b.1.win_rate));
        let worst = eligible
            .iter()
            .min_by(|a, b| a.1.win_rate.total_cmp(&b.1.win_rate));

        if let (Some((best, best_perf)), Some((worst, worst_perf))) = (best, worst) {
            let gap = best_perf.win_rate - worst_perf.win_rate;
            if best != worst && gap >= config.significant_gap_pct {
                insights.push(SessionInsight::BestWorst {
                    best: *best,
                    best_win_rate: best_perf.win_rate,
                    worst: *worst,
                    worst_win_rate: worst_perf.win_rate,
                    gap,
                });
            }
        }
    } else {
        tracing::debug!(
            eligible = eligible.len(),
            "too few sessions with enough trades for a best/worst comparison"
        );
    }

    let off_hours = breakdown.get(TradingSession::Other);
    let regular = breakdown.aggregate(|s| s != TradingSession::Other);
    if off_hours.is_eligible(config) && regular.is_eligible(config) {
        let gap = (off_hours.win_rate - regular.win_rate).abs();
        if gap >= config.comparison_gap_pct {
            insights.push(SessionInsight::OffHours {
                off_hours_win_rate: off_hours.win_rate,
                regular_win_rate: regular.win_rate,
                gap,
            });
        }
    }

    let asia_pacific = breakdown.aggregate(TradingSession::is_asia_pacific);
    let western = breakdown.aggregate(TradingSession::is_western);
    if asia_pacific.is_eligible(config) && western.is_eligible(config) {
        let gap = (asia_pacific.win_rate - western.win_rate).abs();
        if gap >= config.comparison_gap_pct {
            insights.push(SessionInsight::CrossRegion {
                asia_pacific_win_rate: asia_pacific.win_rate,
                western_win_rate: western.win_rate,
                gap,
            });
        }
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use journal_core::TradeDirection;
    use rust_decimal_macros::dec;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        // January 2025: 6-10 and 13-17 are weekdays, 11/12 a weekend
        Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
    }

    fn trades_at(hour: u32, day: u32, wins: usize, losses: usize) -> Vec<TradeRecord> {
        let win = (0..wins).map(|_| dec!(10));
        let loss = (0..losses).map(|_| dec!(-5));
        win.chain(loss)
            .map(|pnl| TradeRecord::closed("BTCUSDT", TradeDirection::Long, at(day, hour), dec!(1), pnl))
            .collect()
    }

    #[test]
    fn breakdown_contains_every_session() {
        let breakdown = compute_session_metrics(&[]);

        assert_eq!(breakdown.sessions.len(), 5);
        for session in TradingSession::ALL {
            assert_eq!(breakdown.get(session).trades, 0);
            assert_eq!(breakdown.get(session).win_rate, 0.0);
        }
        assert_eq!(breakdown.best_session(), None);
    }

    #[test]
    fn trades_land_in_derived_or_stored_session() {
        let mut trades = trades_at(9, 6, 2, 1); // London
        trades.extend(trades_at(15, 6, 1, 1)); // New York
        trades.push(
            TradeRecord::closed("ETHUSDT", TradeDirection::Short, at(6, 9), dec!(1), dec!(4))
                .with_session(TradingSession::Tokyo),
        );
        trades.push(TradeRecord::new("ETHUSDT", TradeDirection::Long, at(6, 9), dec!(1)));

        let breakdown = compute_session_metrics(&trades);

        let london = breakdown.get(TradingSession::London);
        assert_eq!((london.trades, london.wins), (3, 2));
        assert_eq!(london.total_pnl, dec!(15));
        assert!((london.win_rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(breakdown.get(TradingSession::NewYork).trades, 2);
        assert_eq!(breakdown.get(TradingSession::Tokyo).trades, 1);
        assert_eq!(breakdown.total_trades(), 6);
        assert_eq!(breakdown.best_session(), Some(TradingSession::London));
    }

    #[test]
    fn best_worst_requires_significant_gap() {
        let mut trades = trades_at(9, 6, 8, 2); // London 80%
        trades.extend(trades_at(15, 7, 3, 3)); // New York 50%

        let insights = session_insights(&compute_session_metrics(&trades), &SessionConfig::default());

        assert!(insights.iter().any(|i| matches!(
            i,
            SessionInsight::BestWorst {
                best: TradingSession::London,
                worst: TradingSession::NewYork,
                ..
            }
        )));
    }

    #[test]
    fn small_gap_produces_no_best_worst() {
        let mut trades = trades_at(9, 6, 6, 4); // 60%
        trades.extend(trades_at(15, 7, 5, 5)); // 50%

        let insights = session_insights(&compute_session_metrics(&trades), &SessionConfig::default());

        assert!(insights.is_empty(), "{insights:?}");
    }

    #[test]
    fn under_sampled_sessions_are_ignored() {
        let mut trades = trades_at(9, 6, 10, 0); // London 100%
        trades.extend(trades_at(15, 7, 0, 4)); // New York 0%, only 4 trades

        let insights = session_insights(&compute_session_metrics(&trades), &SessionConfig::default());

        assert!(!insights
            .iter()
            .any(|i| matches!(i, SessionInsight::BestWorst { .. })));
    }

    #[test]
    fn off_hours_compared_with_regular_sessions() {
        let mut trades = trades_at(14, 11, 1, 4); // Saturday, 20%
        trades.extend(trades_at(9, 6, 4, 2)); // London 66.7%

        let insights = session_insights(&compute_session_metrics(&trades), &SessionConfig::default());
        let off_hours = insights
            .iter()
            .find(|i| matches!(i, SessionInsight::OffHours { .. }))
            .expect("off-hours insight");

        assert!(off_hours.gap() > 40.0);
        assert!(off_hours.message().contains("worse off-hours"));
    }

    #[test]
    fn cross_region_groups_sessions() {
        let mut trades = trades_at(3, 6, 1, 2); // Tokyo
        trades.extend(trades_at(22, 6, 0, 2)); // Sydney
        trades.extend(trades_at(9, 7, 3, 0)); // London
        trades.extend(trades_at(15, 7, 2, 1)); // New York

        let insights = session_insights(&compute_session_metrics(&trades), &SessionConfig::default());

        let cross = insights
            .iter()
            .find_map(|i| match i {
                SessionInsight::CrossRegion {
                    asia_pacific_win_rate,
                    western_win_rate,
                    ..
                } => Some((*asia_pacific_win_rate, *western_win_rate)),
                _ => None,
            })
            .expect("cross-region insight");

        assert!((cross.0 - 20.0).abs() < 1e-9);
        assert!((cross.1 - 500.0 / 6.0).abs() < 1e-9);
        // no single session reaches five trades
        assert!(!insights
            .iter()
            .any(|i| matches!(i, SessionInsight::BestWorst { .. })));
    }

    #[test]
    fn partial_breakdown_reads_missing_sessions_as_empty() {
        let json = r#"{"sessions":{"london":{"trades":6,"wins":5,"winRate":83.3,"totalPnl":"40"}}}"#;
        let breakdown: SessionBreakdown = serde_json::from_str(json).unwrap();

        assert_eq!(breakdown.get(TradingSession::Tokyo).trades, 0);
        assert_eq!(breakdown.get(TradingSession::London).wins, 5);

        let insights = session_insights(&breakdown, &SessionConfig::default());
        assert!(insights.is_empty(), "{insights:?}");
    }

    #[test]
    fn breakdown_serializes_with_session_keys() {
        let json = serde_json::to_string(&compute_session_metrics(&trades_at(15, 6, 1, 0))).unwrap();

        assert!(json.contains("\"new_york\""));
        assert!(json.contains("\"winRate\""));
    }
}
