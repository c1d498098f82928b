//! Tilt detection.
//!
//! Compares how a trader behaves right after a loss with how they behave
//! after a win: trading faster, sizing up, hopping between instruments or
//! trading outside their usual session once a loss lands are the classic
//! signatures of revenge trading. Runs of consecutive post-loss trades
//! showing those behaviors are reported as episodes.

use chrono::{DateTime, Utc};
use journal_core::{RiskThresholds, TiltConfig, TiltWeights, TradeRecord, TradingSession};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Behavioral signal contributing to the tilt score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TiltSignal {
    /// Trading noticeably faster right after a loss.
    FrequencyEscalation,
    /// Sizing up right after a loss.
    SizingEscalation,
    /// Loss streaks longer than the loss rate would predict.
    LossSequence,
    /// Switching instruments right after a loss.
    PairScattering,
    /// Trading outside the usual sessions right after a loss.
    SessionDeviation,
}

/// Discrete tilt risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiltRisk {
    None,
    Low,
    Medium,
    High,
}

impl TiltRisk {
    /// Maps a tilt score onto a risk level. Monotonic in `score`.
    #[must_use]
    pub fn from_score(score: f64, thresholds: &RiskThresholds) -> Self {
        if score >= thresholds.high {
            Self::High
        } else if score >= thresholds.medium {
            Self::Medium
        } else if score >= thresholds.low {
            Self::Low
        } else {
            Self::None
        }
    }

    /// Advice shown next to the risk badge.
    #[must_use]
    pub const fn recommendation(self) -> &'static str {
        match self {
            Self::None => "No tilt patterns detected. Keep following your plan.",
            Self::Low => "Minor signs of emotional trading. Review your last few entries before the next one.",
            Self::Medium => "Clear revenge-trading signals. Reduce size and wait for your setups.",
            Self::High => "Strong tilt detected. Stop trading for the session and reset.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeSeverity {
    Mild,
    Moderate,
    Severe,
}

/// Per-signal scores, each 0-100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiltSignals {
    pub frequency_escalation: f64,
    pub sizing_escalation: f64,
    pub loss_sequence: f64,
    pub pair_scattering: f64,
    pub session_deviation: f64,
}

impl TiltSignals {
    /// Weighted composite of the signal scores.
    #[must_use]
    pub fn weighted(&self, weights: &TiltWeights) -> f64 {
        self.frequency_escalation * weights.frequency_escalation
            + self.sizing_escalation * weights.sizing_escalation
            + self.loss_sequence * weights.loss_sequence
            + self.pair_scattering * weights.pair_scattering
            + self.session_deviation * weights.session_deviation
    }
}

/// Aggregate behavior over a set of trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowMetrics {
    pub trade_count: usize,
    /// Mean minutes since the preceding trade.
    pub avg_interval_minutes: f64,
    pub avg_size: f64,
    /// Win rate in percent.
    pub win_rate: f64,
    pub total_pnl: Decimal,
}

impl WindowMetrics {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            trade_count: 0,
            avg_interval_minutes: 0.0,
            avg_size: 0.0,
            win_rate: 0.0,
            total_pnl: Decimal::ZERO,
        }
    }
}

/// Behavior inside tilt episodes compared with the rest of the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiltMetrics {
    pub tilt: WindowMetrics,
    pub normal: WindowMetrics,
}

/// A run of consecutive trades taken on tilt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiltEpisode {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub severity: EpisodeSeverity,
    pub total_pnl: Decimal,
    pub trade_count: usize,
    /// Instruments traded during the episode, sorted.
    pub pairs: Vec<String>,
    /// Signals that fired during the episode, sorted.
    pub signals: Vec<TiltSignal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiltAnalysis {
    /// Weighted composite, 0-100.
    pub tilt_score: f64,
    pub current_risk: TiltRisk,
    pub signals: TiltSignals,
    pub metrics: TiltMetrics,
    pub episodes: Vec<TiltEpisode>,
    /// Closed trades considered.
    pub trades_analyzed: usize,
    /// False when there were too few closed trades to analyze.
    pub sufficient_data: bool,
}

impl TiltAnalysis {
    /// The neutral result returned when there is not enough history.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tilt_score: 0.0,
            current_risk: TiltRisk::None,
            signals: TiltSignals::default(),
            metrics: TiltMetrics {
                tilt: WindowMetrics::empty(),
                normal: WindowMetrics::empty(),
            },
            episodes: Vec::new(),
            trades_analyzed: 0,
            sufficient_data: false,
        }
    }
}

/// Behaviors checked on each trade relative to the one before it.
#[derive(Debug, Clone, Copy, Default)]
struct Behaviors {
    rushed: bool,
    escalated: bool,
    switched: bool,
    off_session: bool,
}

impl Behaviors {
    fn as_array(self) -> [bool; 4] {
        [self.rushed, self.escalated, self.switched, self.off_session]
    }
}

const BEHAVIOR_SIGNALS: [TiltSignal; 4] = [
    TiltSignal::FrequencyEscalation,
    TiltSignal::SizingEscalation,
    TiltSignal::PairScattering,
    TiltSignal::SessionDeviation,
];

/// Detects revenge-trading patterns in a trade history.
#[derive(Debug, Clone, Default)]
pub struct TiltDetector {
    config: TiltConfig,
}

impl TiltDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: TiltConfig) -> Self {
        Self { config }
    }

    /// Analyzes closed trades in chronological order.
    ///
    /// Returns `TiltAnalysis::empty()` (with `trades_analyzed` filled in)
    /// when fewer than `min_trades` closed trades are available.
    #[must_use]
    pub fn detect(&self, trades: &[TradeRecord]) -> TiltAnalysis {
        let mut closed: Vec<&TradeRecord> = trades.iter().filter(|t| t.is_closed()).collect();
        closed.sort_by_key(|t| t.trade_date);

        if closed.len() < self.config.min_trades {
            tracing::debug!(
                closed = closed.len(),
                required = self.config.min_trades,
                "not enough closed trades for tilt detection"
            );
            return TiltAnalysis {
                trades_analyzed: closed.len(),
                ..TiltAnalysis::empty()
            };
        }

        let n = closed.len();
        let intervals: Vec<Option<f64>> = std::iter::once(None)
            .chain(closed.windows(2).map(|w| {
                Some((w[1].trade_date - w[0].trade_date).num_seconds() as f64 / 60.0)
            }))
            .collect();
        let sizes: Vec<f64> = closed
            .iter()
            .map(|t| t.quantity.to_f64().unwrap_or(0.0))
            .collect();
        let sessions: Vec<TradingSession> = closed.iter().map(|t| t.trading_session()).collect();

        let median_interval = median(intervals.iter().flatten().copied().collect());
        let mean_size = sizes.iter().sum::<f64>() / n as f64;
        let normal_sessions = self.normal_sessions(&sessions);

        // Behaviors for every trade after the first.
        let behaviors: Vec<Behaviors> = (0..n)
            .map(|i| {
                if i == 0 {
                    return Behaviors::default();
                }
                let interval = intervals[i].unwrap_or(f64::INFINITY);
                let prev_size = sizes[i - 1];
                Behaviors {
                    rushed: interval < median_interval * self.config.frequency_ratio,
                    escalated: sizes[i] > mean_size * self.config.sizing_ratio
                        || (prev_size > 0.0 && sizes[i] > prev_size * self.config.sizing_ratio),
                    switched: closed[i].pair != closed[i - 1].pair,
                    off_session: !normal_sessions.contains(&sessions[i]),
                }
            })
            .collect();

        let signals = TiltSignals {
            loss_sequence: round1(self.loss_sequence_score(&closed)),
            ..self.behavior_scores(&closed, &behaviors)
        };

        let tilt_score = round1(signals.weighted(&self.config.weights).clamp(0.0, 100.0));
        let flags = self.flag_trades(&closed, &behaviors);
        let episodes = self.group_episodes(&closed, &flags);

        let mut in_episode = vec![false; n];
        for (start, end) in episode_ranges(&flags, self.config.min_episode_trades) {
            in_episode[start..=end].iter_mut().for_each(|f| *f = true);
        }

        let metrics = TiltMetrics {
            tilt: window_metrics(&closed, &intervals, &sizes, |i| in_episode[i]),
            normal: window_metrics(&closed, &intervals, &sizes, |i| !in_episode[i]),
        };

        tracing::debug!(
            trades = n,
            tilt_score,
            episodes = episodes.len(),
            "tilt detection complete"
        );

        TiltAnalysis {
            tilt_score,
            current_risk: TiltRisk::from_score(tilt_score, &self.config.risk_thresholds),
            signals,
            metrics,
            episodes,
            trades_analyzed: n,
            sufficient_data: true,
        }
    }

    /// Sessions holding at least `normal_session_share` of trades, plus the
    /// most frequent one.
    fn normal_sessions(&self, sessions: &[TradingSession]) -> BTreeSet<TradingSession> {
        let mut counts: BTreeMap<TradingSession, usize> = BTreeMap::new();
        for session in sessions {
            *counts.entry(*session).or_insert(0) += 1;
        }

        let total = sessions.len() as f64;
        let mut normal: BTreeSet<TradingSession> = counts
            .iter()
            .filter(|(_, count)| **count as f64 / total >= self.config.normal_session_share)
            .map(|(session, _)| *session)
            .collect();

        // max_by_key keeps the last maximum; reverse so the earliest session wins ties.
        if let Some((session, _)) = counts.iter().rev().max_by_key(|(_, count)| **count) {
            normal.insert(*session);
        }
        normal
    }

    /// Excess rate of each behavior after losses over its rate after wins.
    fn behavior_scores(&self, closed: &[&TradeRecord], behaviors: &[Behaviors]) -> TiltSignals {
        let mut after_loss = (0usize, [0usize; 4]);
        let mut after_win = (0usize, [0usize; 4]);

        for i in 1..closed.len() {
            let bucket = if closed[i - 1].is_loss() {
                &mut after_loss
            } else if closed[i - 1].is_win() {
                &mut after_win
            } else {
                continue;
            };
            bucket.0 += 1;
            for (hits, fired) in bucket.1.iter_mut().zip(behaviors[i].as_array()) {
                *hits += usize::from(fired);
            }
        }

        let score = |k: usize| {
            if after_loss.0 == 0 {
                return 0.0;
            }
            let r_loss = after_loss.1[k] as f64 / after_loss.0 as f64;
            let r_win = if after_win.0 == 0 {
                0.0
            } else {
                after_win.1[k] as f64 / after_win.0 as f64
            };
            round1(excess_rate(r_loss, r_win) * 100.0)
        };

        TiltSignals {
            frequency_escalation: score(0),
            sizing_escalation: score(1),
            loss_sequence: 0.0,
            pair_scattering: score(2),
            session_deviation: score(3),
        }
    }

    /// Scores the longest loss streak against the streak length the loss
    /// rate alone would produce over this many trades.
    fn loss_sequence_score(&self, closed: &[&TradeRecord]) -> f64 {
        let n = closed.len();
        let losses = closed.iter().filter(|t| t.is_loss()).count();
        if losses == 0 {
            return 0.0;
        }

        let longest = loss_streaks(closed).into_iter().max().unwrap_or(0);
        let expected = if losses == n {
            n
        } else {
            let p_loss = losses as f64 / n as f64;
            let natural = ((n as f64).ln() / (1.0 / p_loss).ln()).ceil() as usize;
            natural.max(self.config.min_loss_streak)
        };

        if longest < expected {
            0.0
        } else {
            (50.0 + 25.0 * (longest - expected) as f64).min(100.0)
        }
    }

    /// Signals flagged on each trade that follows a loss.
    fn flag_trades(&self, closed: &[&TradeRecord], behaviors: &[Behaviors]) -> Vec<Vec<TiltSignal>> {
        let streaks = loss_streaks(closed);

        (0..closed.len())
            .map(|i| {
                if i == 0 || !closed[i - 1].is_loss() {
                    return Vec::new();
                }
                let mut fired: Vec<TiltSignal> = BEHAVIOR_SIGNALS
                    .iter()
                    .zip(behaviors[i].as_array())
                    .filter(|(_, hit)| *hit)
                    .map(|(signal, _)| *signal)
                    .collect();
                if streaks[i - 1] >= self.config.min_loss_streak {
                    fired.push(TiltSignal::LossSequence);
                }
                fired
            })
            .collect()
    }

    fn group_episodes(&self, closed: &[&TradeRecord], flags: &[Vec<TiltSignal>]) -> Vec<TiltEpisode> {
        let losses: Vec<Decimal> = closed
            .iter()
            .filter(|t| t.is_loss())
            .map(|t| t.net_pnl().abs())
            .collect();
        let avg_loss = if losses.is_empty() {
            Decimal::ZERO
        } else {
            losses.iter().sum::<Decimal>() / Decimal::from(losses.len())
        };
        // Overflow means no episode can reach the limit.
        let severe_loss = Decimal::try_from(self.config.severe_loss_multiple)
            .ok()
            .filter(|multiple| *multiple > Decimal::ZERO)
            .and_then(|multiple| avg_loss.checked_mul(multiple));

        episode_ranges(flags, self.config.min_episode_trades)
            .into_iter()
            .map(|(start, end)| {
                let run = &closed[start..=end];
                let total_pnl: Decimal = run.iter().map(|t| t.net_pnl()).sum();
                let pairs: BTreeSet<&str> = run.iter().map(|t| t.pair.as_str()).collect();
                let signals: BTreeSet<TiltSignal> =
                    flags[start..=end].iter().flatten().copied().collect();

                let heavy_loss = total_pnl < Decimal::ZERO
                    && severe_loss.is_some_and(|limit| total_pnl.abs() > limit);
                let points = signals.len() + usize::from(heavy_loss);
                let severity = match points {
                    0..=1 => EpisodeSeverity::Mild,
                    2 => EpisodeSeverity::Moderate,
                    _ => EpisodeSeverity::Severe,
                };

                TiltEpisode {
                    start_date: run[0].trade_date,
                    end_date: run[run.len() - 1].trade_date,
                    severity,
                    total_pnl,
                    trade_count: run.len(),
                    pairs: pairs.into_iter().map(str::to_string).collect(),
                    signals: signals.into_iter().collect(),
                }
            })
            .collect()
    }
}

/// Convenience wrapper around `TiltDetector::with_config(..).detect(..)`.
#[must_use]
pub fn detect_tilt(trades: &[TradeRecord], config: &TiltConfig) -> TiltAnalysis {
    TiltDetector::with_config(config.clone()).detect(trades)
}

/// Length of the loss streak ending at each trade (0 for non-losses).
fn loss_streaks(closed: &[&TradeRecord]) -> Vec<usize> {
    closed
        .iter()
        .scan(0usize, |run, trade| {
            *run = if trade.is_loss() { *run + 1 } else { 0 };
            Some(*run)
        })
        .collect()
}

/// Inclusive index ranges of consecutive flagged trades, at least `min_len` long.
fn episode_ranges(flags: &[Vec<TiltSignal>], min_len: usize) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start: Option<usize> = None;

    for (i, fired) in flags.iter().enumerate() {
        match (start, fired.is_empty()) {
            (None, false) => start = Some(i),
            (Some(s), true) => {
                if i - s >= min_len {
                    ranges.push((s, i - 1));
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if flags.len() - s >= min_len {
            ranges.push((s, flags.len() - 1));
        }
    }
    ranges
}

fn window_metrics(
    closed: &[&TradeRecord],
    intervals: &[Option<f64>],
    sizes: &[f64],
    include: impl Fn(usize) -> bool,
) -> WindowMetrics {
    let indices: Vec<usize> = (0..closed.len()).filter(|i| include(*i)).collect();
    if indices.is_empty() {
        return WindowMetrics::empty();
    }

    let count = indices.len();
    let gaps: Vec<f64> = indices.iter().filter_map(|i| intervals[*i]).collect();
    let wins = indices.iter().filter(|i| closed[**i].is_win()).count();

    WindowMetrics {
        trade_count: count,
        avg_interval_minutes: if gaps.is_empty() {
            0.0
        } else {
            gaps.iter().sum::<f64>() / gaps.len() as f64
        },
        avg_size: indices.iter().map(|i| sizes[*i]).sum::<f64>() / count as f64,
        win_rate: wins as f64 / count as f64 * 100.0,
        total_pnl: indices.iter().map(|i| closed[*i].net_pnl()).sum(),
    }
}

fn excess_rate(r_loss: f64, r_win: f64) -> f64 {
    if r_win >= 1.0 {
        return 0.0;
    }
    ((r_loss - r_win).max(0.0) / (1.0 - r_win)).clamp(0.0, 1.0)
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
