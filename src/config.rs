use serde::{Deserialize, Serialize};
use std::env;

/// Weights applied to the factors of the composite score.
///
/// Each weight is a multiplier in [0, 1]; they are not required to sum
/// to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub trend: f64,
    pub momentum: f64,
    pub volume: f64,
    pub volatility: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            trend: 0.4,
            momentum: 0.3,
            volume: 0.15,
            volatility: 0.15,
        }
    }
}

/// Score cut points for recommendation thresholding.
///
/// Callers supply these; the invariant is
/// `strong_bull > bull > bear > strong_bear`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendThresholds {
    pub strong_bull: f64,
    pub bull: f64,
    pub bear: f64,
    pub strong_bear: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            strong_bull: 80.0,
            bull: 60.0,
            bear: 40.0,
            strong_bear: 20.0,
        }
    }
}

/// Market scanner settings.
///
/// Supplied by the caller per scanner instance; the engine does not
/// persist them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSettings {
    /// Maximum number of pairs to scan per run.
    pub max_pairs: usize,
    /// Auto-scan interval in minutes.
    pub refresh_interval_minutes: u64,
    /// Candle timeframe for analysis (e.g. "15m").
    pub timeframe: String,
    /// Minimum 24h quote volume for a symbol to qualify.
    pub min_quote_volume: f64,
    /// Minimum strongest-signal strength (percent) to record a result.
    pub signal_threshold: f64,
    /// Whether to compute the composite score during scans.
    pub scoring_enabled: bool,
    /// Composite score weights.
    pub weights: ScoringWeights,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_pairs: 50,
            refresh_interval_minutes: 15,
            timeframe: "15m".to_string(),
            min_quote_volume: 1_000_000.0,
            signal_threshold: 70.0,
            scoring_enabled: true,
            weights: ScoringWeights::default(),
        }
    }
}

/// External reasoning service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningConfig {
    /// Base URL of an OpenAI-compatible chat API.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Maximum response length in tokens.
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub scan: ScanSettings,
    pub thresholds: TrendThresholds,
    /// Present only when a reasoning API key is configured.
    pub reasoning: Option<ReasoningConfig>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = ScanSettings::default();
        let scan = ScanSettings {
            max_pairs: env::var("SIFT_MAX_PAIRS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_pairs),
            refresh_interval_minutes: env::var("SIFT_REFRESH_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_interval_minutes),
            timeframe: env::var("SIFT_TIMEFRAME").unwrap_or(defaults.timeframe),
            min_quote_volume: env::var("SIFT_MIN_QUOTE_VOLUME")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_quote_volume),
            signal_threshold: env::var("SIFT_SIGNAL_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.signal_threshold),
            scoring_enabled: env::var("SIFT_SCORING_ENABLED")
                .ok()
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.scoring_enabled),
            weights: ScoringWeights {
                trend: env::var("SIFT_WEIGHT_TREND")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.weights.trend),
                momentum: env::var("SIFT_WEIGHT_MOMENTUM")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.weights.momentum),
                volume: env::var("SIFT_WEIGHT_VOLUME")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.weights.volume),
                volatility: env::var("SIFT_WEIGHT_VOLATILITY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.weights.volatility),
            },
        };

        let thresholds = TrendThresholds::default();

        // Reasoning stays disabled unless a key is configured.
        let reasoning = env::var("SIFT_REASONING_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .map(|api_key| ReasoningConfig {
                base_url: env::var("SIFT_REASONING_BASE_URL")
                    .unwrap_or_else(|_| "https://api.deepseek.com/v1".to_string()),
                api_key,
                model: env::var("SIFT_REASONING_MODEL")
                    .unwrap_or_else(|_| "deepseek-chat".to_string()),
                max_tokens: env::var("SIFT_REASONING_MAX_TOKENS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(500),
                temperature: env::var("SIFT_REASONING_TEMPERATURE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0.7),
            });

        Self {
            scan,
            thresholds,
            reasoning,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanSettings::default(),
            thresholds: TrendThresholds::default(),
            reasoning: None,
        }
    }
}
