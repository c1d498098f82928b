//! Performance by market condition.
//!
//! Each trade's entry snapshot is scored on three factors (fear/greed,
//! volatility, event risk), each worth up to `MAX_FACTOR_POINTS`, and the
//! normalized total places it in one of five buckets. This is a coarser,
//! unweighted cousin of the composite market score and is computed
//! independently of it.

use journal_core::{
    ContextConfig, EventRiskLevel, TradeRecord, UnifiedMarketContext, VolatilityLevel,
    MAX_FACTOR_POINTS,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Market-condition bucket, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextBucket {
    Optimal,
    Favorable,
    Moderate,
    Risky,
    Extreme,
}

impl ContextBucket {
    pub const ALL: [Self; 5] = [
        Self::Optimal,
        Self::Favorable,
        Self::Moderate,
        Self::Risky,
        Self::Extreme,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Optimal => "Optimal",
            Self::Favorable => "Favorable",
            Self::Moderate => "Moderate",
            Self::Risky => "Risky",
            Self::Extreme => "Extreme",
        }
    }
}

/// Closed-trade results inside one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketPerformance {
    pub trades: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub total_pnl: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPerformance {
    /// Every bucket, including empty ones.
    pub buckets: BTreeMap<ContextBucket, BucketPerformance>,
    /// Highest win rate among buckets with enough trades.
    pub best_zone: Option<ContextBucket>,
    /// Closed trades that could be bucketed.
    pub classified: usize,
    /// Closed trades with no snapshot or no usable factor.
    pub unclassified: usize,
}

/// Normalized factor score (0-100), or `None` when no factor is present.
#[must_use]
pub fn context_score(ctx: &UnifiedMarketContext, config: &ContextConfig) -> Option<f64> {
    let factors: Vec<u8> = [
        fear_greed_points(ctx, config),
        volatility_points(ctx, config),
        event_points(ctx, config),
    ]
    .into_iter()
    .flatten()
    .collect();

    if factors.is_empty() {
        return None;
    }

    let earned: u32 = factors.iter().map(|p| u32::from(*p)).sum();
    let possible = factors.len() as f64 * f64::from(MAX_FACTOR_POINTS);
    Some(f64::from(earned) / possible * 100.0)
}

/// Buckets a score, checking thresholds top-down.
#[must_use]
pub fn bucket_for_score(score: f64, config: &ContextConfig) -> ContextBucket {
    let t = &config.thresholds;
    if score >= t.optimal {
        ContextBucket::Optimal
    } else if score >= t.favorable {
        ContextBucket::Favorable
    } else if score >= t.moderate {
        ContextBucket::Moderate
    } else if score >= t.risky {
        ContextBucket::Risky
    } else {
        ContextBucket::Extreme
    }
}

#[must_use]
pub fn classify(ctx: &UnifiedMarketContext, config: &ContextConfig) -> Option<ContextBucket> {
    context_score(ctx, config).map(|score| bucket_for_score(score, config))
}

/// Aggregates closed trades by the bucket of their entry snapshot.
#[must_use]
pub fn analyze_by_context(trades: &[TradeRecord], config: &ContextConfig) -> ContextPerformance {
    let mut buckets: BTreeMap<ContextBucket, BucketPerformance> = ContextBucket::ALL
        .iter()
        .map(|b| (*b, BucketPerformance::default()))
        .collect();
    let mut unclassified = 0;

    for trade in trades.iter().filter(|t| t.is_closed()) {
        let Some(bucket) = trade
            .market_context
            .as_ref()
            .and_then(|ctx| classify(ctx, config))
        else {
            unclassified += 1;
            continue;
        };

        let perf = buckets.entry(bucket).or_default();
        perf.trades += 1;
        perf.wins += usize::from(trade.is_win());
        perf.total_pnl += trade.net_pnl();
    }

    for perf in buckets.values_mut() {
        if perf.trades > 0 {
            perf.win_rate = perf.wins as f64 / perf.trades as f64 * 100.0;
        }
    }

    // Strictly-greater comparison keeps the better bucket on ties.
    let mut best_zone: Option<(ContextBucket, f64)> = None;
    for (bucket, perf) in &buckets {
        if perf.trades < config.min_trades_per_bucket {
            continue;
        }
        if best_zone.map_or(true, |(_, rate)| perf.win_rate > rate) {
            best_zone = Some((*bucket, perf.win_rate));
        }
    }

    let classified: usize = buckets.values().map(|p| p.trades).sum();
    tracing::debug!(classified, unclassified, "context buckets computed");

    ContextPerformance {
        buckets,
        best_zone: best_zone.map(|(bucket, _)| bucket),
        classified,
        unclassified,
    }
}

fn fear_greed_points(ctx: &UnifiedMarketContext, config: &ContextConfig) -> Option<u8> {
    let value = ctx.fear_greed.map(|f| f.value).filter(|v| v.is_finite())?;
    let within = |(lo, hi): (f64, f64)| (lo..=hi).contains(&value);

    Some(if within(config.fear_greed_best) {
        MAX_FACTOR_POINTS
    } else if within(config.fear_greed_moderate) {
        1
    } else {
        0
    })
}

fn volatility_points(ctx: &UnifiedMarketContext, config: &ContextConfig) -> Option<u8> {
    let points = &config.volatility_points;
    ctx.volatility.map(|v| match v.level {
        VolatilityLevel::Low => points.low,
        VolatilityLevel::Medium => points.medium,
        VolatilityLevel::High => points.high,
    })
}

fn event_points(ctx: &UnifiedMarketContext, config: &ContextConfig) -> Option<u8> {
    let points = &config.event_points;
    ctx.events.map(|e| {
        let base = match e.risk_level {
            EventRiskLevel::Low => points.low,
            EventRiskLevel::Moderate => points.moderate,
            EventRiskLevel::High => points.high,
            EventRiskLevel::VeryHigh => points.very_high,
        };
        if e.has_high_impact_today {
            base.saturating_sub(config.high_impact_deduction)
        } else {
            base
        }
    })
}
