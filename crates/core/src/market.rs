//! Market context snapshots.
//!
//! Every component is optional: a snapshot taken while an upstream feed is
//! down simply leaves that component as `None`, and scorers treat it as an
//! absent signal.

use serde::{Deserialize, Serialize};

/// Number of sub-fields the data-quality check looks for.
pub const RECOGNIZED_FIELD_COUNT: usize = 7;

/// Sentiment scores, each on a 0-100 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentContext {
    #[serde(default)]
    pub technical_score: Option<f64>,
    #[serde(default)]
    pub on_chain_score: Option<f64>,
    #[serde(default)]
    pub macro_score: Option<f64>,
}

/// Fear & Greed index reading (0 = extreme fear, 100 = extreme greed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FearGreedContext {
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityContext {
    pub level: VolatilityLevel,
}

/// Economic-calendar risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventRiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    pub risk_level: EventRiskLevel,
    #[serde(default)]
    pub has_high_impact_today: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumContext {
    /// Signed 24h price change in percent.
    pub price_change_24h: f64,
}

/// Market snapshot combining every signal family the scorers consume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedMarketContext {
    #[serde(default)]
    pub sentiment: Option<SentimentContext>,
    #[serde(default)]
    pub fear_greed: Option<FearGreedContext>,
    #[serde(default)]
    pub volatility: Option<VolatilityContext>,
    #[serde(default)]
    pub events: Option<EventContext>,
    #[serde(default)]
    pub momentum: Option<MomentumContext>,
}

impl UnifiedMarketContext {
    /// Creates an empty context with every component absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sentiment(
        mut self,
        technical: Option<f64>,
        on_chain: Option<f64>,
        macro_score: Option<f64>,
    ) -> Self {
        self.sentiment = Some(SentimentContext {
            technical_score: technical,
            on_chain_score: on_chain,
            macro_score,
        });
        self
    }

    #[must_use]
    pub fn with_fear_greed(mut self, value: f64) -> Self {
        self.fear_greed = Some(FearGreedContext { value });
        self
    }

    #[must_use]
    pub fn with_volatility(mut self, level: VolatilityLevel) -> Self {
        self.volatility = Some(VolatilityContext { level });
        self
    }

    #[must_use]
    pub fn with_events(mut self, risk_level: EventRiskLevel, has_high_impact_today: bool) -> Self {
        self.events = Some(EventContext {
            risk_level,
            has_high_impact_today,
        });
        self
    }

    #[must_use]
    pub fn with_momentum(mut self, price_change_24h: f64) -> Self {
        self.momentum = Some(MomentumContext { price_change_24h });
        self
    }

    /// Counts how many of the recognized sub-fields carry a finite value.
    #[must_use]
    pub fn present_field_count(&self) -> usize {
        let finite = |v: Option<f64>| v.is_some_and(f64::is_finite);

        let sentiment = self.sentiment.map_or(0, |s| {
            [s.technical_score, s.on_chain_score, s.macro_score]
                .into_iter()
                .filter(|v| finite(*v))
                .count()
        });

        sentiment
            + usize::from(finite(self.fear_greed.map(|f| f.value)))
            + usize::from(self.volatility.is_some())
            + usize::from(self.events.is_some())
            + usize::from(finite(self.momentum.map(|m| m.price_change_24h)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_has_no_fields() {
        assert_eq!(UnifiedMarketContext::new().present_field_count(), 0);
    }

    #[test]
    fn full_context_has_every_field() {
        let ctx = UnifiedMarketContext::new()
            .with_sentiment(Some(60.0), Some(55.0), Some(40.0))
            .with_fear_greed(50.0)
            .with_volatility(VolatilityLevel::Medium)
            .with_events(EventRiskLevel::Low, false)
            .with_momentum(2.5);

        assert_eq!(ctx.present_field_count(), RECOGNIZED_FIELD_COUNT);
    }

    #[test]
    fn non_finite_readings_are_not_counted() {
        let ctx = UnifiedMarketContext::new()
            .with_sentiment(Some(f64::NAN), None, Some(40.0))
            .with_momentum(f64::INFINITY);

        assert_eq!(ctx.present_field_count(), 1);
    }

    #[test]
    fn deserializes_partial_snapshot() {
        let json = r#"{
            "sentiment": { "technicalScore": 72 },
            "events": { "riskLevel": "VERY_HIGH", "hasHighImpactToday": true },
            "volatility": { "level": "high" }
        }"#;

        let ctx: UnifiedMarketContext = serde_json::from_str(json).unwrap();

        assert_eq!(ctx.sentiment.and_then(|s| s.technical_score), Some(72.0));
        assert!(ctx.fear_greed.is_none());
        assert_eq!(ctx.events.map(|e| e.risk_level), Some(EventRiskLevel::VeryHigh));
        assert_eq!(ctx.present_field_count(), 3);
    }
}
