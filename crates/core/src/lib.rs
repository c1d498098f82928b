//! Core types for trade journal analytics.
//!
//! Holds the trade and market-context data model, the tunable analytics
//! configuration with its loader, and display formatting helpers.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod format;
pub mod market;
pub mod trade;

pub use config::{
    AnalyticsConfig, BucketThresholds, ContextConfig, CorrelationConfig, EventPenalties,
    EventPoints, MarketScoreConfig, MarketScoreWeights, RiskThresholds, SessionConfig, TiltConfig,
    TiltWeights, VolatilityPoints, MAX_FACTOR_POINTS,
};
pub use config_loader::ConfigLoader;
pub use error::JournalError;
pub use format::{
    format_compact, format_currency, format_currency_f64, format_number, format_percent,
    format_pnl, Currency, Locale,
};
pub use market::{
    EventContext, EventRiskLevel, FearGreedContext, MomentumContext, SentimentContext,
    UnifiedMarketContext, VolatilityContext, VolatilityLevel, RECOGNIZED_FIELD_COUNT,
};
pub use trade::{TradeDirection, TradeRecord, TradeResult, TradeStatus, TradingSession};
