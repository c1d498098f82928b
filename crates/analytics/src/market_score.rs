//! Composite market favorability score.
//!
//! Blends sentiment, fear/greed, event risk and momentum into a single 0-100
//! score. Each present component contributes a weighted deviation from its
//! neutral midpoint; absent components drop out of the weight normalization
//! so the score does not drift with the number of feeds available.

use journal_core::{
    EventRiskLevel, MarketScoreConfig, UnifiedMarketContext, VolatilityLevel,
    RECOGNIZED_FIELD_COUNT,
};
use serde::{Deserialize, Serialize};

/// Neutral score and midpoint of every component scale.
const NEUTRAL: f64 = 50.0;

/// Discrete trading-bias label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradingBias {
    LongFavorable,
    ShortFavorable,
    Neutral,
    /// Event risk too high to trade regardless of score.
    Avoid,
}

impl TradingBias {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LongFavorable => "Long favorable",
            Self::ShortFavorable => "Short favorable",
            Self::Neutral => "Neutral",
            Self::Avoid => "Avoid trading",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarketComponent {
    Technical,
    OnChain,
    Macro,
    FearGreed,
    Events,
    Momentum,
}

/// One component's share of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScore {
    pub component: MarketComponent,
    pub weight: f64,
    /// Signed deviation from the neutral midpoint, before weighting.
    pub deviation: f64,
}

/// Full scorer output for a single snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAssessment {
    pub score: u8,
    pub bias: TradingBias,
    pub data_quality: u8,
    pub components: Vec<ComponentScore>,
}

/// Scores market snapshots using a `MarketScoreConfig`.
#[derive(Debug, Clone, Default)]
pub struct MarketScorer {
    config: MarketScoreConfig,
}

impl MarketScorer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: MarketScoreConfig) -> Self {
        Self { config }
    }

    /// Weighted deviation of every present component, in a fixed order.
    #[must_use]
    pub fn components(&self, ctx: &UnifiedMarketContext) -> Vec<ComponentScore> {
        let weights = &self.config.weights;
        let mut components = Vec::with_capacity(6);
        let mut push = |component, weight, deviation: Option<f64>| {
            if let Some(deviation) = deviation.filter(|d| d.is_finite()) {
                components.push(ComponentScore {
                    component,
                    weight,
                    deviation,
                });
            }
        };

        let sentiment = ctx.sentiment.unwrap_or_default();
        push(
            MarketComponent::Technical,
            weights.technical,
            sentiment.technical_score.map(|s| s - NEUTRAL),
        );
        push(
            MarketComponent::OnChain,
            weights.on_chain,
            sentiment.on_chain_score.map(|s| s - NEUTRAL),
        );
        push(
            MarketComponent::Macro,
            weights.macro_score,
            sentiment.macro_score.map(|s| s - NEUTRAL),
        );
        push(
            MarketComponent::FearGreed,
            weights.fear_greed,
            ctx.fear_greed.map(|f| self.fear_greed_deviation(f.value)),
        );
        push(
            MarketComponent::Events,
            weights.events,
            ctx.events
                .map(|e| -self.event_penalty(e.risk_level, e.has_high_impact_today)),
        );
        push(
            MarketComponent::Momentum,
            weights.momentum,
            ctx.momentum
                .map(|m| m.price_change_24h)
                .filter(|pct| pct.is_finite())
                .map(|pct| self.momentum_deviation(pct)),
        );

        components
    }

    /// Composite favorability score, 0-100. An empty context scores 50.
    #[must_use]
    pub fn composite_score(&self, ctx: &UnifiedMarketContext) -> u8 {
        Self::blend(&self.components(ctx))
    }

    /// Maps a score to a bias. Event-risk overrides are checked first.
    #[must_use]
    pub fn trading_bias(&self, score: u8, ctx: &UnifiedMarketContext) -> TradingBias {
        if let Some(events) = ctx.events {
            let extreme_event =
                events.has_high_impact_today && events.risk_level == EventRiskLevel::VeryHigh;
            let volatile_event = ctx
                .volatility
                .is_some_and(|v| v.level == VolatilityLevel::High)
                && events.risk_level >= EventRiskLevel::High;

            if extreme_event || volatile_event {
                return TradingBias::Avoid;
            }
        }

        let score = f64::from(score);
        if score >= self.config.long_threshold {
            TradingBias::LongFavorable
        } else if score <= self.config.short_threshold {
            TradingBias::ShortFavorable
        } else {
            TradingBias::Neutral
        }
    }

    /// Share of recognized sub-fields present, 0-100.
    #[must_use]
    pub fn data_quality(&self, ctx: &UnifiedMarketContext) -> u8 {
        let share = ctx.present_field_count() as f64 / RECOGNIZED_FIELD_COUNT as f64;
        (share * 100.0).round().clamp(0.0, 100.0) as u8
    }

    #[must_use]
    pub fn assess(&self, ctx: &UnifiedMarketContext) -> MarketAssessment {
        let components = self.components(ctx);
        let score = Self::blend(&components);

        MarketAssessment {
            score,
            bias: self.trading_bias(score, ctx),
            data_quality: self.data_quality(ctx),
            components,
        }
    }

    fn blend(components: &[ComponentScore]) -> u8 {
        let total_weight: f64 = components.iter().map(|c| c.weight).sum();
        if total_weight < f64::EPSILON {
            return NEUTRAL as u8;
        }

        let weighted: f64 = components.iter().map(|c| c.weight * c.deviation).sum();
        (NEUTRAL + weighted / total_weight).clamp(0.0, 100.0).round() as u8
    }

    /// Balanced readings earn a bonus; extremes in either direction are
    /// penalized by their distance from neutral.
    fn fear_greed_deviation(&self, value: f64) -> f64 {
        if (self.config.balanced_low..=self.config.balanced_high).contains(&value) {
            self.config.balanced_bonus
        } else {
            -(value - NEUTRAL).abs()
        }
    }

    fn event_penalty(&self, level: EventRiskLevel, high_impact_today: bool) -> f64 {
        let penalties = &self.config.event_penalties;
        let base = match level {
            EventRiskLevel::Low => penalties.low,
            EventRiskLevel::Moderate => penalties.moderate,
            EventRiskLevel::High => penalties.high,
            EventRiskLevel::VeryHigh => penalties.very_high,
        };
        let extra = if high_impact_today {
            self.config.high_impact_penalty
        } else {
            0.0
        };
        (base + extra).max(0.0)
    }

    /// Maps a +/- `momentum_range_pct` 24h change onto 0-100, centered on 50.
    fn momentum_deviation(&self, change_pct: f64) -> f64 {
        let range = self.config.momentum_range_pct;
        let normalized = ((change_pct + range) / (2.0 * range) * 100.0).clamp(0.0, 100.0);
        normalized - NEUTRAL
    }
}
