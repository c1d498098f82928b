//! Trade records as exported by the journal.
//!
//! A `TradeRecord` is read-only input to every analytic. Field names follow
//! the journal's camelCase JSON export so that records can be deserialized
//! straight from the data-access layer.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market::UnifiedMarketContext;

/// Position direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeDirection {
    Long,
    Short,
}

/// Lifecycle status of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// Recorded outcome of a closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeResult {
    Win,
    Loss,
}

/// Trading session a trade was opened in.
///
/// Ordering follows the trading day from the Pacific open westwards, with
/// `Other` last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingSession {
    Sydney,
    Tokyo,
    London,
    #[serde(alias = "newyork", alias = "ny")]
    NewYork,
    /// Weekend trades and any tag the journal does not recognize.
    #[serde(other)]
    Other,
}

impl TradingSession {
    /// Every session, in display order.
    pub const ALL: [Self; 5] = [
        Self::Sydney,
        Self::Tokyo,
        Self::London,
        Self::NewYork,
        Self::Other,
    ];

    /// Derives the session from a UTC timestamp.
    ///
    /// Saturdays and Sundays map to `Other`. Weekdays are split by UTC hour:
    /// 00-06 Tokyo, 07-12 London, 13-20 New York, 21-23 Sydney.
    #[must_use]
    pub fn from_timestamp(timestamp: DateTime<Utc>) -> Self {
        if matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun) {
            return Self::Other;
        }

        match timestamp.hour() {
            0..=6 => Self::Tokyo,
            7..=12 => Self::London,
            13..=20 => Self::NewYork,
            _ => Self::Sydney,
        }
    }

    /// Human-readable session name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sydney => "Sydney",
            Self::Tokyo => "Tokyo",
            Self::London => "London",
            Self::NewYork => "New York",
            Self::Other => "Off-hours",
        }
    }

    /// Returns true for the Asia-Pacific sessions.
    #[must_use]
    pub const fn is_asia_pacific(self) -> bool {
        matches!(self, Self::Sydney | Self::Tokyo)
    }

    /// Returns true for the Europe/Americas sessions.
    #[must_use]
    pub const fn is_western(self) -> bool {
        matches!(self, Self::London | Self::NewYork)
    }
}

/// A single journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Instrument identifier, e.g. "BTCUSDT".
    pub pair: String,
    pub direction: TradeDirection,
    /// Open/event time of the trade.
    pub trade_date: DateTime<Utc>,
    pub status: TradeStatus,
    #[serde(default)]
    pub result: Option<TradeResult>,
    /// Exchange-reported P&L. Takes precedence over `pnl`.
    #[serde(default)]
    pub realized_pnl: Option<Decimal>,
    /// Manually entered P&L.
    #[serde(default)]
    pub pnl: Option<Decimal>,
    #[serde(default)]
    pub quantity: Decimal,
    /// Stored session tag; derived from `trade_date` when absent.
    #[serde(default)]
    pub session: Option<TradingSession>,
    #[serde(default)]
    pub hold_time_minutes: Option<f64>,
    #[serde(default)]
    pub entry_order_type: Option<String>,
    /// Market snapshot captured when the trade was entered.
    #[serde(default, alias = "market_context")]
    pub market_context: Option<UnifiedMarketContext>,
}

impl TradeRecord {
    /// Creates an open trade with no P&L recorded yet.
    pub fn new(
        pair: impl Into<String>,
        direction: TradeDirection,
        trade_date: DateTime<Utc>,
        quantity: Decimal,
    ) -> Self {
        Self {
            id: None,
            pair: pair.into(),
            direction,
            trade_date,
            status: TradeStatus::Open,
            result: None,
            realized_pnl: None,
            pnl: None,
            quantity,
            session: None,
            hold_time_minutes: None,
            entry_order_type: None,
            market_context: None,
        }
    }

    /// Creates a closed trade with realized P&L. The result is derived from
    /// the sign of `realized_pnl`; a flat trade carries no result.
    pub fn closed(
        pair: impl Into<String>,
        direction: TradeDirection,
        trade_date: DateTime<Utc>,
        quantity: Decimal,
        realized_pnl: Decimal,
    ) -> Self {
        let result = if realized_pnl > Decimal::ZERO {
            Some(TradeResult::Win)
        } else if realized_pnl < Decimal::ZERO {
            Some(TradeResult::Loss)
        } else {
            None
        };

        Self {
            status: TradeStatus::Closed,
            result,
            realized_pnl: Some(realized_pnl),
            ..Self::new(pair, direction, trade_date, quantity)
        }
    }

    /// Builder method to attach a stored session tag.
    #[must_use]
    pub fn with_session(mut self, session: TradingSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Builder method to attach the entry-time market snapshot.
    #[must_use]
    pub fn with_market_context(mut self, context: UnifiedMarketContext) -> Self {
        self.market_context = Some(context);
        self
    }

    /// Builder method to override the recorded result.
    #[must_use]
    pub fn with_result(mut self, result: Option<TradeResult>) -> Self {
        self.result = result;
        self
    }

    /// Net P&L: `realized_pnl`, then `pnl`, then zero.
    #[must_use]
    pub fn net_pnl(&self) -> Decimal {
        self.realized_pnl.or(self.pnl).unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status == TradeStatus::Closed
    }

    /// Returns true if the trade counts as a win. Uses the recorded result
    /// when present, otherwise the sign of the net P&L.
    #[must_use]
    pub fn is_win(&self) -> bool {
        match self.result {
            Some(result) => result == TradeResult::Win,
            None => self.net_pnl() > Decimal::ZERO,
        }
    }

    /// Returns true if the trade counts as a loss. Flat trades with no
    /// recorded result are neither wins nor losses.
    #[must_use]
    pub fn is_loss(&self) -> bool {
        match self.result {
            Some(result) => result == TradeResult::Loss,
            None => self.net_pnl() < Decimal::ZERO,
        }
    }

    /// Calendar day (UTC) the trade belongs to.
    #[must_use]
    pub fn trading_day(&self) -> NaiveDate {
        self.trade_date.date_naive()
    }

    /// Stored session tag, or the session derived from the trade timestamp.
    #[must_use]
    pub fn trading_session(&self) -> TradingSession {
        self.session
            .unwrap_or_else(|| TradingSession::from_timestamp(self.trade_date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        // 2025-01-06 is a Monday
        Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn net_pnl_prefers_realized() {
        let mut trade = TradeRecord::new("BTCUSDT", TradeDirection::Long, at(6, 9), dec!(1));
        assert_eq!(trade.net_pnl(), Decimal::ZERO);

        trade.pnl = Some(dec!(12.5));
        assert_eq!(trade.net_pnl(), dec!(12.5));

        trade.realized_pnl = Some(dec!(-3));
        assert_eq!(trade.net_pnl(), dec!(-3));
    }

    #[test]
    fn closed_trade_derives_result_from_sign() {
        let win = TradeRecord::closed("ETHUSDT", TradeDirection::Short, at(6, 9), dec!(2), dec!(5));
        let loss = TradeRecord::closed("ETHUSDT", TradeDirection::Short, at(6, 9), dec!(2), dec!(-5));
        let flat = TradeRecord::closed("ETHUSDT", TradeDirection::Short, at(6, 9), dec!(2), dec!(0));

        assert!(win.is_closed() && win.is_win() && !win.is_loss());
        assert!(loss.is_loss() && !loss.is_win());
        assert!(!flat.is_win() && !flat.is_loss());
    }

    #[test]
    fn recorded_result_overrides_pnl_sign() {
        let trade = TradeRecord::closed("BTCUSDT", TradeDirection::Long, at(6, 9), dec!(1), dec!(-1))
            .with_result(Some(TradeResult::Win));

        assert!(trade.is_win());
    }

    #[test]
    fn session_derived_from_utc_hour() {
        assert_eq!(TradingSession::from_timestamp(at(6, 0)), TradingSession::Tokyo);
        assert_eq!(TradingSession::from_timestamp(at(6, 6)), TradingSession::Tokyo);
        assert_eq!(TradingSession::from_timestamp(at(6, 7)), TradingSession::London);
        assert_eq!(TradingSession::from_timestamp(at(6, 12)), TradingSession::London);
        assert_eq!(TradingSession::from_timestamp(at(6, 13)), TradingSession::NewYork);
        assert_eq!(TradingSession::from_timestamp(at(6, 20)), TradingSession::NewYork);
        assert_eq!(TradingSession::from_timestamp(at(6, 21)), TradingSession::Sydney);
    }

    #[test]
    fn weekend_trades_are_off_hours() {
        // 2025-01-11 is a Saturday
        assert_eq!(TradingSession::from_timestamp(at(11, 14)), TradingSession::Other);
        assert_eq!(TradingSession::from_timestamp(at(12, 3)), TradingSession::Other);
    }

    #[test]
    fn stored_session_takes_precedence() {
        let trade = TradeRecord::new("BTCUSDT", TradeDirection::Long, at(6, 9), dec!(1))
            .with_session(TradingSession::Tokyo);

        assert_eq!(trade.trading_session(), TradingSession::Tokyo);
    }

    #[test]
    fn deserializes_journal_export() {
        let json = r#"{
            "pair": "SOLUSDT",
            "direction": "SHORT",
            "tradeDate": "2025-01-07T14:30:00Z",
            "status": "closed",
            "result": "loss",
            "pnl": -42.1,
            "realizedPnl": "-40.5",
            "quantity": 3,
            "session": "new_york"
        }"#;

        let trade: TradeRecord = serde_json::from_str(json).unwrap();

        assert_eq!(trade.direction, TradeDirection::Short);
        assert_eq!(trade.net_pnl(), dec!(-40.5));
        assert_eq!(trade.session, Some(TradingSession::NewYork));
        assert!(trade.market_context.is_none());
        assert!(trade.hold_time_minutes.is_none());
    }

    #[test]
    fn unknown_session_tag_maps_to_other() {
        let json = r#"{
            "pair": "BTCUSDT",
            "direction": "LONG",
            "tradeDate": "2025-01-07T14:30:00Z",
            "status": "open",
            "session": "frankfurt"
        }"#;

        let trade: TradeRecord = serde_json::from_str(json).unwrap();

        assert_eq!(trade.session, Some(TradingSession::Other));
        assert_eq!(trade.quantity, Decimal::ZERO);
    }
}
