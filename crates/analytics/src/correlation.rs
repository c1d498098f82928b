//! Correlation analysis between traded instruments.
//!
//! Pearson correlation over the daily P&L of each instrument, falling back
//! to a static reference table when the two instruments do not share enough
//! trading days or one of the series is flat.

use chrono::NaiveDate;
use journal_core::{CorrelationConfig, TradeRecord};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Daily net P&L keyed by UTC day.
pub type DailyPnl = BTreeMap<NaiveDate, Decimal>;

/// Where a correlation value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationSource {
    /// Computed from the trader's own daily P&L.
    Empirical,
    /// Looked up from the reference table.
    Static,
}

/// Correlation between two instruments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairCorrelation {
    /// Correlation coefficient in [-1, 1].
    pub value: f64,
    pub source: CorrelationSource,
    /// Number of days both instruments had closed trades.
    pub overlapping_days: usize,
}

/// One cell of the correlation matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationCell {
    pub row_symbol: String,
    pub col_symbol: String,
    pub value: f64,
    pub source: CorrelationSource,
}

/// Square correlation matrix over the most-traded instruments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Row/column order.
    pub symbols: Vec<String>,
    /// Cells in row-major order, `symbols.len()^2` entries.
    pub cells: Vec<CorrelationCell>,
}

impl CorrelationMatrix {
    /// Returns the cell for the given row and column symbols.
    #[must_use]
    pub fn get(&self, row: &str, col: &str) -> Option<&CorrelationCell> {
        let n = self.symbols.len();
        let i = self.symbols.iter().position(|s| s == row)?;
        let j = self.symbols.iter().position(|s| s == col)?;
        self.cells.get(i * n + j)
    }

    /// Off-diagonal pairs whose absolute correlation reaches `threshold`.
    /// Each unordered pair is listed once, upper triangle first.
    #[must_use]
    pub fn concentrated_pairs(&self, threshold: f64) -> Vec<&CorrelationCell> {
        let n = self.symbols.len();
        self.cells
            .iter()
            .enumerate()
            .filter(|(idx, cell)| idx / n < idx % n && cell.value.abs() >= threshold)
            .map(|(_, cell)| cell)
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Calculates the Pearson correlation coefficient between two series.
///
/// Returns `None` when the series differ in length, hold fewer than three
/// points, or either series has no variance.
#[must_use]
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 3 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x < f64::EPSILON || var_y < f64::EPSILON {
        return None;
    }

    let r = covariance / (var_x * var_y).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Sums closed-trade net P&L per instrument and UTC day.
#[must_use]
pub fn daily_pnl_by_symbol(trades: &[TradeRecord]) -> HashMap<&str, DailyPnl> {
    let mut by_symbol: HashMap<&str, DailyPnl> = HashMap::new();

    for trade in trades.iter().filter(|t| t.is_closed()) {
        *by_symbol
            .entry(trade.pair.as_str())
            .or_default()
            .entry(trade.trading_day())
            .or_insert(Decimal::ZERO) += trade.net_pnl();
    }

    by_symbol
}

/// Correlation between two instruments' daily P&L.
///
/// Identical symbols are trivially `1.0`. Pairs sharing fewer than
/// `config.min_overlap_days` days, or with a flat series, fall back to the
/// reference table.
#[must_use]
pub fn pair_correlation(
    trades: &[TradeRecord],
    symbol_a: &str,
    symbol_b: &str,
    config: &CorrelationConfig,
) -> PairCorrelation {
    if symbol_a == symbol_b {
        return PairCorrelation {
            value: 1.0,
            source: CorrelationSource::Static,
            overlapping_days: 0,
        };
    }

    let daily = daily_pnl_by_symbol(trades);
    let empty = DailyPnl::new();
    correlate_daily(
        daily.get(symbol_a).unwrap_or(&empty),
        daily.get(symbol_b).unwrap_or(&empty),
        symbol_a,
        symbol_b,
        config,
    )
}

fn correlate_daily(
    a: &DailyPnl,
    b: &DailyPnl,
    symbol_a: &str,
    symbol_b: &str,
    config: &CorrelationConfig,
) -> PairCorrelation {
    // BTreeMap iteration keeps the aligned series in date order.
    let (xs, ys): (Vec<f64>, Vec<f64>) = a
        .iter()
        .filter_map(|(day, pnl_a)| {
            let pnl_b = b.get(day)?;
            Some((pnl_a.to_f64()?, pnl_b.to_f64()?))
        })
        .unzip();
    let overlapping_days = xs.len();

    if overlapping_days >= config.min_overlap_days {
        if let Some(value) = pearson_correlation(&xs, &ys) {
            return PairCorrelation {
                value,
                source: CorrelationSource::Empirical,
                overlapping_days,
            };
        }
        tracing::debug!(
            symbol_a,
            symbol_b,
            overlapping_days,
            "flat daily P&L series, using static correlation"
        );
    } else {
        tracing::debug!(
            symbol_a,
            symbol_b,
            overlapping_days,
            required = config.min_overlap_days,
            "insufficient overlapping days, using static correlation"
        );
    }

    PairCorrelation {
        value: static_correlation(symbol_a, symbol_b, config.default_static_correlation),
        source: CorrelationSource::Static,
        overlapping_days,
    }
}

/// Builds the correlation matrix over the `config.max_matrix_symbols`
/// most-traded instruments (closed trades, ties broken alphabetically).
#[must_use]
pub fn correlation_matrix(trades: &[TradeRecord], config: &CorrelationConfig) -> CorrelationMatrix {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for trade in trades.iter().filter(|t| t.is_closed()) {
        *counts.entry(trade.pair.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|(sym_a, n_a), (sym_b, n_b)| n_b.cmp(n_a).then_with(|| sym_a.cmp(sym_b)));
    ranked.truncate(config.max_matrix_symbols);

    let symbols: Vec<&str> = ranked.into_iter().map(|(sym, _)| sym).collect();
    let daily = daily_pnl_by_symbol(trades);
    let empty = DailyPnl::new();

    let mut cells = Vec::with_capacity(symbols.len() * symbols.len());
    for row in &symbols {
        for col in &symbols {
            let (value, source) = if row == col {
                (1.0, CorrelationSource::Static)
            } else {
                let pair = correlate_daily(
                    daily.get(row).unwrap_or(&empty),
                    daily.get(col).unwrap_or(&empty),
                    row,
                    col,
                    config,
                );
                (pair.value, pair.source)
            };

            cells.push(CorrelationCell {
                row_symbol: (*row).to_string(),
                col_symbol: (*col).to_string(),
                value,
                source,
            });
        }
    }

    CorrelationMatrix {
        symbols: symbols.into_iter().map(str::to_string).collect(),
        cells,
    }
}

const QUOTE_SUFFIXES: [&str; 5] = ["FDUSD", "USDT", "USDC", "BUSD", "USD"];

/// Long-run reference correlations between major crypto assets, keyed by
/// base asset in alphabetical order.
const REFERENCE_CORRELATIONS: [(&str, &str, f64); 18] = [
    ("ADA", "BTC", 0.68),
    ("ADA", "ETH", 0.70),
    ("AVAX", "BTC", 0.68),
    ("AVAX", "ETH", 0.72),
    ("AVAX", "SOL", 0.72),
    ("BNB", "BTC", 0.70),
    ("BNB", "ETH", 0.68),
    ("BTC", "DOGE", 0.64),
    ("BTC", "ETH", 0.82),
    ("BTC", "LINK", 0.66),
    ("BTC", "PAXG", 0.10),
    ("BTC", "SOL", 0.74),
    ("BTC", "XRP", 0.62),
    ("DOGE", "ETH", 0.62),
    ("ETH", "LINK", 0.72),
    ("ETH", "MATIC", 0.71),
    ("ETH", "SOL", 0.76),
    ("ETH", "XRP", 0.60),
];

/// Strips separators and the quote asset, e.g. `btc/usdt` -> `BTC`.
#[must_use]
pub fn base_asset(symbol: &str) -> String {
    let cleaned: String = symbol
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase();

    QUOTE_SUFFIXES
        .iter()
        .find_map(|suffix| {
            cleaned
                .strip_suffix(suffix)
                .filter(|base| !base.is_empty())
                .map(str::to_string)
        })
        .unwrap_or(cleaned)
}

/// Reference correlation for two instruments. Order-independent; instruments
/// on the same base asset are fully correlated; unknown pairs get `default`.
#[must_use]
pub fn static_correlation(symbol_a: &str, symbol_b: &str, default: f64) -> f64 {
    let a = base_asset(symbol_a);
    let b = base_asset(symbol_b);
    if a == b {
        return 1.0;
    }

    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    REFERENCE_CORRELATIONS
        .iter()
        .find(|(x, y, _)| *x == lo && *y == hi)
        .map_or(default, |(_, _, value)| *value)
        .clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use journal_core::TradeDirection;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, 10, 0, 0).unwrap()
    }

    fn closed(pair: &str, d: u32, pnl: Decimal) -> TradeRecord {
        TradeRecord::closed(pair, TradeDirection::Long, day(d), dec!(1), pnl)
    }

    fn series(pair: &str, pnls: &[Decimal]) -> Vec<TradeRecord> {
        pnls.iter()
            .enumerate()
            .map(|(i, pnl)| closed(pair, i as u32 + 1, *pnl))
            .collect()
    }

    fn similar_shape_trades() -> Vec<TradeRecord> {
        let mut trades = series("BTCUSDT", &[dec!(10), dec!(-5), dec!(8), dec!(-3), dec!(6), dec!(-2)]);
        trades.extend(series("ETHUSDT", &[dec!(9), dec!(-4), dec!(7), dec!(-2), dec!(5), dec!(-1)]));
        trades
    }

    #[test]
    fn pearson_requires_three_points() {
        assert_eq!(pearson_correlation(&[1.0, 2.0], &[2.0, 4.0]), None);
        assert_eq!(pearson_correlation(&[1.0, 2.0, 3.0], &[2.0, 4.0]), None);
    }

    #[test]
    fn pearson_rejects_flat_series() {
        assert_eq!(pearson_correlation(&[1.0, 1.0, 1.0], &[2.0, 4.0, 5.0]), None);
    }

    #[test]
    fn pearson_perfect_inverse() {
        let r = pearson_correlation(&[1.0, 2.0, 3.0, 4.0], &[8.0, 6.0, 4.0, 2.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-12, "r = {r}");
    }

    #[test]
    fn similar_daily_pnl_is_empirically_correlated() {
        let trades = similar_shape_trades();

        let result = pair_correlation(&trades, "BTCUSDT", "ETHUSDT", &CorrelationConfig::default());

        assert_eq!(result.source, CorrelationSource::Empirical);
        assert_eq!(result.overlapping_days, 6);
        assert!(result.value > 0.95, "correlation was {}", result.value);
    }

    #[test]
    fn same_symbol_is_trivially_one() {
        let result = pair_correlation(&[], "BTCUSDT", "BTCUSDT", &CorrelationConfig::default());

        assert_eq!(result.value, 1.0);
        assert_eq!(result.source, CorrelationSource::Static);
    }

    #[test]
    fn short_overlap_falls_back_to_reference_table() {
        let mut trades = series("BTCUSDT", &[dec!(10), dec!(-5), dec!(8)]);
        trades.extend(series("ETHUSDT", &[dec!(9), dec!(-4), dec!(7)]));

        let result = pair_correlation(&trades, "BTCUSDT", "ETHUSDT", &CorrelationConfig::default());

        assert_eq!(result.source, CorrelationSource::Static);
        assert_eq!(result.overlapping_days, 3);
        assert!((result.value - 0.82).abs() < f64::EPSILON);
    }

    #[test]
    fn flat_series_falls_back_to_static() {
        let mut trades = series("BTCUSDT", &[dec!(5); 6]);
        trades.extend(series("ETHUSDT", &[dec!(9), dec!(-4), dec!(7), dec!(-2), dec!(5), dec!(-1)]));

        let result = pair_correlation(&trades, "BTCUSDT", "ETHUSDT", &CorrelationConfig::default());

        assert_eq!(result.source, CorrelationSource::Static);
        assert!(result.value.is_finite());
    }

    #[test]
    fn open_trades_do_not_contribute() {
        let mut trades = similar_shape_trades();
        for trade in &mut trades {
            trade.status = journal_core::TradeStatus::Open;
        }

        let result = pair_correlation(&trades, "BTCUSDT", "ETHUSDT", &CorrelationConfig::default());

        assert_eq!(result.source, CorrelationSource::Static);
        assert_eq!(result.overlapping_days, 0);
    }

    #[test]
    fn same_day_trades_are_summed() {
        let trades = vec![
            closed("BTCUSDT", 1, dec!(4)),
            closed("BTCUSDT", 1, dec!(-1)),
            closed("BTCUSDT", 2, dec!(2)),
        ];

        let daily = daily_pnl_by_symbol(&trades);
        let btc = &daily["BTCUSDT"];

        assert_eq!(btc.len(), 2);
        assert_eq!(btc.values().next().copied(), Some(dec!(3)));
    }

    #[test]
    fn static_lookup_is_order_independent() {
        assert_eq!(
            static_correlation("ETHUSDT", "BTCUSDT", 0.5),
            static_correlation("BTCUSDT", "ETHUSDT", 0.5)
        );
        assert_eq!(static_correlation("BTC/USDC", "BTCUSDT", 0.5), 1.0);
        assert_eq!(static_correlation("FOOUSDT", "BARUSDT", 0.3), 0.3);
    }

    #[test]
    fn base_asset_strips_quote_and_separators() {
        assert_eq!(base_asset("btc/usdt"), "BTC");
        assert_eq!(base_asset("ETH-USD"), "ETH");
        assert_eq!(base_asset("SOLFDUSD"), "SOL");
        assert_eq!(base_asset("USDT"), "USDT");
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let mut trades = similar_shape_trades();
        trades.extend(series("SOLUSDT", &[dec!(-3), dec!(4), dec!(-2), dec!(6), dec!(-1), dec!(2)]));

        let matrix = correlation_matrix(&trades, &CorrelationConfig::default());

        assert_eq!(matrix.symbols.len(), 3);
        assert_eq!(matrix.cells.len(), 9);
        for a in &matrix.symbols {
            assert_eq!(matrix.get(a, a).unwrap().value, 1.0);
            for b in &matrix.symbols {
                let ab = matrix.get(a, b).unwrap();
                let ba = matrix.get(b, a).unwrap();
                assert_eq!(ab.value, ba.value);
                assert_eq!(ab.source, ba.source);
                assert!((-1.0..=1.0).contains(&ab.value));
            }
        }
    }

    #[test]
    fn matrix_keeps_most_traded_symbols() {
        let mut trades = series("BTCUSDT", &[dec!(1); 4]);
        trades.extend(series("ETHUSDT", &[dec!(1); 3]));
        trades.extend(series("ADAUSDT", &[dec!(1); 1]));
        trades.extend(series("XRPUSDT", &[dec!(1); 3]));

        let config = CorrelationConfig {
            max_matrix_symbols: 3,
            ..CorrelationConfig::default()
        };
        let matrix = correlation_matrix(&trades, &config);

        assert_eq!(matrix.symbols, vec!["BTCUSDT", "ETHUSDT", "XRPUSDT"]);
    }

    #[test]
    fn concentrated_pairs_lists_each_pair_once() {
        let trades = similar_shape_trades();

        let matrix = correlation_matrix(&trades, &CorrelationConfig::default());
        let pairs = matrix.concentrated_pairs(0.7);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].row_symbol, "BTCUSDT");
        assert_eq!(pairs[0].col_symbol, "ETHUSDT");
    }

    #[test]
    fn empty_history_yields_empty_matrix() {
        let matrix = correlation_matrix(&[], &CorrelationConfig::default());
        assert!(matrix.is_empty());
        assert!(matrix.concentrated_pairs(0.0).is_empty());
    }
}
