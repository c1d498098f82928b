//! Behavioral analytics over trade journal histories.
//!
//! Every analytic is a pure function of its inputs: trades (and optionally a
//! market snapshot) go in, a serializable result comes out. Insufficient data
//! produces neutral results rather than errors.
//!
//! - [`correlation`]: daily P&L correlation between instruments
//! - [`tilt`]: revenge-trading detection
//! - [`session`]: performance by trading session
//! - [`market_score`]: composite market favorability score and bias
//! - [`context`]: performance by market-condition bucket
//! - [`report`]: all of the above in one pass

pub mod context;
pub mod correlation;
pub mod market_score;
pub mod report;
pub mod session;
pub mod tilt;

pub use context::{
    analyze_by_context, bucket_for_score, classify, context_score, BucketPerformance,
    ContextBucket, ContextPerformance,
};
pub use correlation::{
    correlation_matrix, daily_pnl_by_symbol, pair_correlation, pearson_correlation,
    static_correlation, CorrelationCell, CorrelationMatrix, CorrelationSource, PairCorrelation,
};
pub use market_score::{ComponentScore, MarketAssessment, MarketComponent, MarketScorer, TradingBias};
pub use report::JournalReport;
pub use session::{
    compute_session_metrics, session_insights, SessionBreakdown, SessionInsight,
    SessionPerformance,
};
pub use tilt::{
    detect_tilt, EpisodeSeverity, TiltAnalysis, TiltDetector, TiltEpisode, TiltMetrics, TiltRisk,
    TiltSignal, TiltSignals, WindowMetrics,
};
