use serde::{Deserialize, Serialize};

/// A single OHLCV candle.
///
/// Candle sequences from a provider are ordered by strictly increasing
/// timestamp and are never mutated by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    /// Unix timestamp (milliseconds) of the candle open.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Read-only column view over a candle sequence.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    pub closes: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl PriceSeries {
    /// Extract per-column series from a candle slice.
    pub fn from_candles(candles: &[Candle]) -> Self {
        Self {
            closes: candles.iter().map(|c| c.close).collect(),
            highs: candles.iter().map(|c| c.high).collect(),
            lows: candles.iter().map(|c| c.low).collect(),
            volumes: candles.iter().map(|c| c.volume).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// 24h ticker snapshot for a symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub symbol: String,
    /// Last traded price.
    pub last: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ask: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    /// 24h volume in the base currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// 24h volume in the quote currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_volume: Option<f64>,
    /// 24h price change in percent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    /// Unix timestamp (milliseconds) of the snapshot.
    pub timestamp: i64,
}

/// Static metadata for a tradable symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMeta {
    pub symbol: String,
    /// Base currency (e.g. "BTC" in BTC/USDT).
    pub base: String,
    /// Quote currency (e.g. "USDT" in BTC/USDT).
    pub quote: String,
    /// Whether the market is currently tradable.
    pub active: bool,
    /// Dark-pool markets are excluded from scans.
    pub dark_pool: bool,
}
