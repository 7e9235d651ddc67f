//! Sift - Technical analysis and market scanning engine
//!
//! Computes SMA, RSI, and MACD over OHLCV candles, derives typed trading
//! signals and a weighted composite score per instrument, thresholds the
//! score into trade recommendations (with an optional external reasoning
//! service and a mandatory local fallback), and scans a volume-filtered
//! symbol universe through an injected [`MarketDataProvider`] under fixed
//! rate constraints.

pub mod config;
pub mod error;
pub mod provider;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use config::{Config, ReasoningConfig, ScanSettings, ScoringWeights, TrendThresholds};
pub use error::{EngineError, Result};
pub use provider::MarketDataProvider;
pub use services::advisor::{
    AdviceRequest, ChatCompletionClient, ReasoningService, RecommendationEngine,
};
pub use services::analyzer::{analyze, AnalyzerProfile};
pub use services::scanner::MarketScanner;
pub use types::*;
