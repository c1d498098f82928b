//! Tunable weights and thresholds for every analytic.
//!
//! Each analytic reads its own section by reference. Weight tables must sum
//! to 1.0; `AnalyticsConfig::validate` checks that once, centrally.

use serde::{Deserialize, Serialize};

use crate::error::{JournalError, Result};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Maximum points a single factor can earn in the contextual bucket scorer.
pub const MAX_FACTOR_POINTS: u8 = 2;

/// Upper bound for `TiltConfig::severe_loss_multiple`.
pub const MAX_SEVERE_LOSS_MULTIPLE: f64 = 100.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub correlation: CorrelationConfig,
    pub tilt: TiltConfig,
    pub session: SessionConfig,
    pub market_score: MarketScoreConfig,
    pub context: ContextConfig,
}

impl AnalyticsConfig {
    /// Checks weight sums and threshold ordering across all sections.
    ///
    /// # Errors
    ///
    /// Returns `JournalError::InvalidConfig` naming the first offending section.
    pub fn validate(&self) -> Result<()> {
        self.correlation.validate()?;
        self.tilt.validate()?;
        self.session.validate()?;
        self.market_score.validate()?;
        self.context.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Overlapping days needed before an empirical correlation is trusted.
    pub min_overlap_days: usize,
    /// Upper bound on symbols in the correlation matrix.
    pub max_matrix_symbols: usize,
    /// Static correlation for pairs missing from the reference table.
    pub default_static_correlation: f64,
    /// Absolute correlation above which a pair is reported as concentrated.
    pub high_correlation_threshold: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            min_overlap_days: 5,
            max_matrix_symbols: 8,
            default_static_correlation: 0.5,
            high_correlation_threshold: 0.7,
        }
    }
}

impl CorrelationConfig {
    fn validate(&self) -> Result<()> {
        if self.min_overlap_days < 3 {
            return Err(JournalError::invalid(
                "correlation",
                "min_overlap_days must be at least 3",
            ));
        }
        if self.max_matrix_symbols == 0 {
            return Err(JournalError::invalid(
                "correlation",
                "max_matrix_symbols must be positive",
            ));
        }
        if !(-1.0..=1.0).contains(&self.default_static_correlation) {
            return Err(JournalError::invalid(
                "correlation",
                "default_static_correlation must lie in [-1, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.high_correlation_threshold) {
            return Err(JournalError::invalid(
                "correlation",
                "high_correlation_threshold must lie in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// Relative weight of each tilt signal in the composite tilt score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltWeights {
    pub frequency_escalation: f64,
    pub sizing_escalation: f64,
    pub loss_sequence: f64,
    pub pair_scattering: f64,
    pub session_deviation: f64,
}

impl Default for TiltWeights {
    fn default() -> Self {
        Self {
            frequency_escalation: 0.25,
            sizing_escalation: 0.25,
            loss_sequence: 0.20,
            pair_scattering: 0.15,
            session_deviation: 0.15,
        }
    }
}

impl TiltWeights {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.frequency_escalation
            + self.sizing_escalation
            + self.loss_sequence
            + self.pair_scattering
            + self.session_deviation
    }

    fn as_array(&self) -> [f64; 5] {
        [
            self.frequency_escalation,
            self.sizing_escalation,
            self.loss_sequence,
            self.pair_scattering,
            self.session_deviation,
        ]
    }
}

/// Tilt-score boundaries for the low/medium/high risk levels.
/// Scores below `low` carry no risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: 25.0,
            medium: 50.0,
            high: 75.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    /// Closed trades required before tilt detection runs.
    pub min_trades: usize,
    /// An interval shorter than `median * frequency_ratio` counts as rushed.
    pub frequency_ratio: f64,
    /// A size above `mean * sizing_ratio` (or previous size times this) counts as escalated.
    pub sizing_ratio: f64,
    /// Shortest loss streak that flags the following trade.
    pub min_loss_streak: usize,
    /// Share of trades a session needs to count as one of the trader's normal sessions.
    pub normal_session_share: f64,
    /// Shortest run of flagged trades reported as an episode.
    pub min_episode_trades: usize,
    /// Episode loss, in multiples of the average losing trade, that adds a severity point.
    pub severe_loss_multiple: f64,
    pub weights: TiltWeights,
    pub risk_thresholds: RiskThresholds,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            min_trades: 5,
            frequency_ratio: 0.5,
            sizing_ratio: 1.5,
            min_loss_streak: 3,
            normal_session_share: 0.2,
            min_episode_trades: 2,
            severe_loss_multiple: 3.0,
            weights: TiltWeights::default(),
            risk_thresholds: RiskThresholds::default(),
        }
    }
}

impl TiltConfig {
    fn validate(&self) -> Result<()> {
        validate_weights("tilt", &self.weights.as_array(), self.weights.total())?;

        let t = &self.risk_thresholds;
        if !(0.0 < t.low && t.low < t.medium && t.medium < t.high && t.high <= 100.0) {
            return Err(JournalError::invalid(
                "tilt",
                "risk thresholds must satisfy 0 < low < medium < high <= 100",
            ));
        }
        if self.min_trades < 2 {
            return Err(JournalError::invalid("tilt", "min_trades must be at least 2"));
        }
        if !(self.frequency_ratio > 0.0 && self.frequency_ratio <= 1.0) {
            return Err(JournalError::invalid(
                "tilt",
                "frequency_ratio must lie in (0, 1]",
            ));
        }
        if self.sizing_ratio < 1.0 {
            return Err(JournalError::invalid("tilt", "sizing_ratio must be >= 1"));
        }
        if self.min_loss_streak < 2 {
            return Err(JournalError::invalid(
                "tilt",
                "min_loss_streak must be at least 2",
            ));
        }
        if !(0.0..=1.0).contains(&self.normal_session_share) {
            return Err(JournalError::invalid(
                "tilt",
                "normal_session_share must lie in [0, 1]",
            ));
        }
        if self.min_episode_trades == 0 {
            return Err(JournalError::invalid(
                "tilt",
                "min_episode_trades must be positive",
            ));
        }
        let multiple = self.severe_loss_multiple;
        if !(multiple > 0.0 && multiple <= MAX_SEVERE_LOSS_MULTIPLE) {
            return Err(JournalError::invalid(
                "tilt",
                format!("severe_loss_multiple must lie in (0, {MAX_SEVERE_LOSS_MULTIPLE}]"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Trades a session needs before its win rate is compared.
    pub min_trades_per_session: usize,
    /// Win-rate gap (percentage points) between best and worst session.
    pub significant_gap_pct: f64,
    /// Win-rate gap for the off-hours and cross-region comparisons.
    pub comparison_gap_pct: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_trades_per_session: 5,
            significant_gap_pct: 15.0,
            comparison_gap_pct: 10.0,
        }
    }
}

impl SessionConfig {
    fn validate(&self) -> Result<()> {
        if self.min_trades_per_session == 0 {
            return Err(JournalError::invalid(
                "session",
                "min_trades_per_session must be positive",
            ));
        }
        if self.significant_gap_pct < 0.0 || self.comparison_gap_pct < 0.0 {
            return Err(JournalError::invalid(
                "session",
                "win-rate gaps must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Weight of each component in the composite market score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketScoreWeights {
    pub technical: f64,
    pub on_chain: f64,
    pub macro_score: f64,
    pub fear_greed: f64,
    pub events: f64,
    pub momentum: f64,
}

impl Default for MarketScoreWeights {
    fn default() -> Self {
        Self {
            technical: 0.20,
            on_chain: 0.15,
            macro_score: 0.15,
            fear_greed: 0.20,
            events: 0.15,
            momentum: 0.15,
        }
    }
}

impl MarketScoreWeights {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.technical
            + self.on_chain
            + self.macro_score
            + self.fear_greed
            + self.events
            + self.momentum
    }

    fn as_array(&self) -> [f64; 6] {
        [
            self.technical,
            self.on_chain,
            self.macro_score,
            self.fear_greed,
            self.events,
            self.momentum,
        ]
    }
}

/// Score penalty applied for each event-risk level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventPenalties {
    pub low: f64,
    pub moderate: f64,
    pub high: f64,
    pub very_high: f64,
}

impl Default for EventPenalties {
    fn default() -> Self {
        Self {
            low: 0.0,
            moderate: 10.0,
            high: 25.0,
            very_high: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketScoreConfig {
    pub weights: MarketScoreWeights,
    /// Fear & Greed readings inside `[balanced_low, balanced_high]` earn the bonus.
    pub balanced_low: f64,
    pub balanced_high: f64,
    pub balanced_bonus: f64,
    pub event_penalties: EventPenalties,
    /// Extra penalty when a high-impact event is scheduled today.
    pub high_impact_penalty: f64,
    /// 24h change (percent) mapped to the ends of the 0-100 momentum scale.
    pub momentum_range_pct: f64,
    pub long_threshold: f64,
    pub short_threshold: f64,
}

impl Default for MarketScoreConfig {
    fn default() -> Self {
        Self {
            weights: MarketScoreWeights::default(),
            balanced_low: 30.0,
            balanced_high: 70.0,
            balanced_bonus: 10.0,
            event_penalties: EventPenalties::default(),
            high_impact_penalty: 10.0,
            momentum_range_pct: 20.0,
            long_threshold: 65.0,
            short_threshold: 35.0,
        }
    }
}

impl MarketScoreConfig {
    fn validate(&self) -> Result<()> {
        validate_weights("market_score", &self.weights.as_array(), self.weights.total())?;

        if self.balanced_low >= self.balanced_high {
            return Err(JournalError::invalid(
                "market_score",
                "balanced_low must be below balanced_high",
            ));
        }
        if self.short_threshold >= self.long_threshold {
            return Err(JournalError::invalid(
                "market_score",
                "short_threshold must be below long_threshold",
            ));
        }
        if self.momentum_range_pct <= 0.0 {
            return Err(JournalError::invalid(
                "market_score",
                "momentum_range_pct must be positive",
            ));
        }
        let p = &self.event_penalties;
        if [p.low, p.moderate, p.high, p.very_high, self.high_impact_penalty]
            .iter()
            .any(|v| *v < 0.0)
        {
            return Err(JournalError::invalid(
                "market_score",
                "event penalties must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Lower bounds (0-100) of the contextual buckets, checked top-down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketThresholds {
    pub optimal: f64,
    pub favorable: f64,
    pub moderate: f64,
    pub risky: f64,
}

impl Default for BucketThresholds {
    fn default() -> Self {
        Self {
            optimal: 80.0,
            favorable: 60.0,
            moderate: 40.0,
            risky: 20.0,
        }
    }
}

/// Points awarded per volatility level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityPoints {
    pub low: u8,
    pub medium: u8,
    pub high: u8,
}

impl Default for VolatilityPoints {
    fn default() -> Self {
        Self {
            low: 2,
            medium: 1,
            high: 0,
        }
    }
}

/// Points awarded per event-risk level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventPoints {
    pub low: u8,
    pub moderate: u8,
    pub high: u8,
    pub very_high: u8,
}

impl Default for EventPoints {
    fn default() -> Self {
        Self {
            low: 2,
            moderate: 1,
            high: 0,
            very_high: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub thresholds: BucketThresholds,
    /// Fear & Greed band earning full points.
    pub fear_greed_best: (f64, f64),
    /// Fear & Greed band earning one point.
    pub fear_greed_moderate: (f64, f64),
    pub volatility_points: VolatilityPoints,
    pub event_points: EventPoints,
    /// Points removed from the event factor when a high-impact event is scheduled today.
    pub high_impact_deduction: u8,
    /// Trades a bucket needs before it can be the best performing zone.
    pub min_trades_per_bucket: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            thresholds: BucketThresholds::default(),
            fear_greed_best: (40.0, 60.0),
            fear_greed_moderate: (25.0, 75.0),
            volatility_points: VolatilityPoints::default(),
            event_points: EventPoints::default(),
            high_impact_deduction: 1,
            min_trades_per_bucket: 3,
        }
    }
}

impl ContextConfig {
    fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if !(t.optimal > t.favorable
            && t.favorable > t.moderate
            && t.moderate > t.risky
            && t.risky >= 0.0
            && t.optimal <= 100.0)
        {
            return Err(JournalError::invalid(
                "context",
                "bucket thresholds must descend from optimal to risky within [0, 100]",
            ));
        }

        let (best_lo, best_hi) = self.fear_greed_best;
        let (mod_lo, mod_hi) = self.fear_greed_moderate;
        if !(mod_lo <= best_lo && best_lo <= best_hi && best_hi <= mod_hi) {
            return Err(JournalError::invalid(
                "context",
                "fear_greed_best must lie inside fear_greed_moderate",
            ));
        }

        let v = &self.volatility_points;
        let e = &self.event_points;
        if [v.low, v.medium, v.high, e.low, e.moderate, e.high, e.very_high]
            .iter()
            .any(|p| *p > MAX_FACTOR_POINTS)
        {
            return Err(JournalError::invalid(
                "context",
                format!("factor points must not exceed {MAX_FACTOR_POINTS}"),
            ));
        }
        Ok(())
    }
}

fn validate_weights(section: &'static str, weights: &[f64], total: f64) -> Result<()> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(JournalError::invalid(
            section,
            "weights must be finite and non-negative",
        ));
    }
    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(JournalError::invalid(
            section,
            format!("weights must sum to 1.0, got {total:.4}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        AnalyticsConfig::default().validate().unwrap();
    }

    #[test]
    fn default_weight_tables_sum_to_one() {
        assert!((TiltWeights::default().total() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert!((MarketScoreWeights::default().total() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn rejects_tilt_weights_not_summing_to_one() {
        let mut config = AnalyticsConfig::default();
        config.tilt.weights.loss_sequence = 0.5;

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("tilt"), "{err}");
    }

    #[test]
    fn rejects_negative_market_weight() {
        let mut config = AnalyticsConfig::default();
        config.market_score.weights.technical = -0.2;
        config.market_score.weights.momentum = 0.55;

        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_monotonic_risk_thresholds() {
        let mut config = AnalyticsConfig::default();
        config.tilt.risk_thresholds.medium = 80.0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_bias_thresholds() {
        let mut config = AnalyticsConfig::default();
        config.market_score.short_threshold = 70.0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bucket_thresholds_out_of_order() {
        let mut config = AnalyticsConfig::default();
        config.context.thresholds.risky = 50.0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_factor_points_above_max() {
        let mut config = AnalyticsConfig::default();
        config.context.volatility_points.low = 3;

        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_severe_loss_multiple() {
        for multiple in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e25] {
            let mut config = AnalyticsConfig::default();
            config.tilt.severe_loss_multiple = multiple;

            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("severe_loss_multiple"), "{multiple}: {err}");
        }

        let mut config = AnalyticsConfig::default();
        config.tilt.severe_loss_multiple = MAX_SEVERE_LOSS_MULTIPLE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_short_overlap_window() {
        let mut config = AnalyticsConfig::default();
        config.correlation.min_overlap_days = 2;

        assert!(config.validate().is_err());
    }
}
