//! Cross-module properties of the journal analytics.

use chrono::{DateTime, Duration, TimeZone, Utc};
use journal_analytics::{
    correlation_matrix, detect_tilt, pair_correlation, CorrelationSource, JournalReport,
    MarketScorer, TiltRisk,
};
use journal_core::{
    AnalyticsConfig, CorrelationConfig, EventRiskLevel, RiskThresholds, TiltConfig, TradeDirection,
    TradeRecord, UnifiedMarketContext, VolatilityLevel,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> DateTime<Utc> {
    // Monday
    Utc.with_ymd_and_hms(2025, 3, 3, 8, 0, 0).unwrap()
}

/// A few weeks of mixed trading across four instruments.
fn sample_history() -> Vec<TradeRecord> {
    let pairs = ["BTCUSDT", "ETHUSDT", "SOLUSDT", "XRPUSDT"];
    let pnls = [
        dec!(12), dec!(-7), dec!(4), dec!(-15), dec!(9), dec!(3), dec!(-2), dec!(-11), dec!(6),
        dec!(14), dec!(-5), dec!(8),
    ];
    let sizes = [dec!(1), dec!(1.5), dec!(2), dec!(4)];

    (0..40)
        .map(|i: usize| {
            let ts = start() + Duration::hours(7 * i as i64) + Duration::minutes(13 * (i % 5) as i64);
            let trade = TradeRecord::closed(
                pairs[(i * 7) % pairs.len()],
                if i % 3 == 0 {
                    TradeDirection::Short
                } else {
                    TradeDirection::Long
                },
                ts,
                sizes[i % sizes.len()],
                pnls[i % pnls.len()],
            );
            if i % 4 == 0 {
                trade.with_market_context(
                    UnifiedMarketContext::new()
                        .with_fear_greed(20.0 + (i as f64) * 2.0)
                        .with_volatility(VolatilityLevel::Medium)
                        .with_events(EventRiskLevel::Moderate, i % 8 == 0),
                )
            } else {
                trade
            }
        })
        .collect()
}

#[test]
fn report_is_deterministic() {
    let trades = sample_history();
    let ctx = UnifiedMarketContext::new()
        .with_sentiment(Some(62.0), Some(48.0), None)
        .with_fear_greed(71.0)
        .with_momentum(-3.5);
    let config = AnalyticsConfig::default();

    let first = serde_json::to_string(&JournalReport::build(&trades, Some(&ctx), &config)).unwrap();
    let second = serde_json::to_string(&JournalReport::build(&trades, Some(&ctx), &config)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn correlation_matrix_is_symmetric_and_bounded() {
    let matrix = correlation_matrix(&sample_history(), &CorrelationConfig::default());

    assert_eq!(matrix.symbols.len(), 4);
    assert_eq!(matrix.cells.len(), 16);
    for row in &matrix.symbols {
        for col in &matrix.symbols {
            let cell = matrix.get(row, col).unwrap();
            let mirror = matrix.get(col, row).unwrap();
            assert!(cell.value.is_finite());
            assert!((-1.0..=1.0).contains(&cell.value));
            assert_eq!(cell.value, mirror.value);
            if row == col {
                assert_eq!(cell.value, 1.0);
            }
        }
    }
}

#[test]
fn pair_correlation_matches_in_both_directions() {
    let trades = sample_history();
    let config = CorrelationConfig::default();

    let ab = pair_correlation(&trades, "BTCUSDT", "SOLUSDT", &config);
    let ba = pair_correlation(&trades, "SOLUSDT", "BTCUSDT", &config);

    assert_eq!(ab, ba);
    assert_eq!(
        pair_correlation(&trades, "ETHUSDT", "ETHUSDT", &config).value,
        1.0
    );
}

#[test]
fn near_identical_daily_pnl_correlates_empirically() {
    let a = [10, -5, 8, -3, 6, -2];
    let b = [9, -4, 7, -2, 5, -1];
    let mut trades = Vec::new();
    for (day, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let ts = start() + Duration::days(day as i64);
        trades.push(TradeRecord::closed("AAAUSDT", TradeDirection::Long, ts, dec!(1), Decimal::from(*x)));
        trades.push(TradeRecord::closed("BBBUSDT", TradeDirection::Long, ts, dec!(1), Decimal::from(*y)));
    }

    let result = pair_correlation(&trades, "AAAUSDT", "BBBUSDT", &CorrelationConfig::default());

    assert_eq!(result.source, CorrelationSource::Empirical);
    assert!(result.value > 0.95);
}

#[test]
fn composite_score_bounded_across_inputs() {
    let scorer = MarketScorer::new();
    let levels = [
        EventRiskLevel::Low,
        EventRiskLevel::Moderate,
        EventRiskLevel::High,
        EventRiskLevel::VeryHigh,
    ];

    for fg in [0.0, 12.5, 30.0, 50.0, 70.0, 99.0, 100.0] {
        for momentum in [-80.0, -20.0, 0.0, 20.0, 80.0] {
            for level in levels {
                let ctx = UnifiedMarketContext::new()
                    .with_sentiment(Some(fg), Some(100.0 - fg), Some(50.0))
                    .with_fear_greed(fg)
                    .with_events(level, fg > 50.0)
                    .with_momentum(momentum);
                let assessment = scorer.assess(&ctx);
                assert!(assessment.score <= 100);
                assert!(assessment.data_quality <= 100);
            }
        }
    }
    assert_eq!(scorer.composite_score(&UnifiedMarketContext::new()), 50);
}

#[test]
fn tilt_gates_on_minimum_sample() {
    let trades: Vec<TradeRecord> = sample_history().into_iter().take(4).collect();

    let analysis = detect_tilt(&trades, &TiltConfig::default());

    assert_eq!(analysis.tilt_score, 0.0);
    assert_eq!(analysis.current_risk, TiltRisk::None);
    assert!(analysis.episodes.is_empty());
}

#[test]
fn tilt_output_is_well_formed() {
    let analysis = detect_tilt(&sample_history(), &TiltConfig::default());

    assert!((0.0..=100.0).contains(&analysis.tilt_score));
    assert_eq!(
        analysis.current_risk,
        TiltRisk::from_score(analysis.tilt_score, &RiskThresholds::default())
    );
    for window in analysis.episodes.windows(2) {
        assert!(window[0].end_date < window[1].start_date);
    }
    for episode in &analysis.episodes {
        assert!(episode.trade_count >= 2);
        assert!(episode.start_date <= episode.end_date);
        assert!(!episode.signals.is_empty());
    }
    assert_eq!(
        analysis.metrics.tilt.trade_count + analysis.metrics.normal.trade_count,
        40
    );
}
