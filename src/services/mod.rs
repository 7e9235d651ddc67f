//! Core services: indicator math, analysis aggregation, composite
//! scoring, recommendation thresholding, and the market scanner.

pub mod advisor;
pub mod analyzer;
pub mod indicators;
pub mod scanner;
pub mod scoring;

pub use advisor::{AdviceRequest, ChatCompletionClient, ReasoningService, RecommendationEngine};
pub use analyzer::{analyze, AnalyzerProfile};
pub use scanner::MarketScanner;
pub use scoring::{composite_score, ScoreContext};
