use serde::{Deserialize, Serialize};

/// Direction of a trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl TrendDirection {
    /// Get display label for this direction.
    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Bullish => "Bullish",
            TrendDirection::Bearish => "Bearish",
            TrendDirection::Neutral => "Neutral",
        }
    }
}

/// RSI zone classification.
///
/// Values above 70 are overbought, below 30 oversold; the 30-70 band
/// splits into bullish/bearish around the 50 midline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RsiZone {
    Overbought,
    Oversold,
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl RsiZone {
    /// Classify an RSI value; an absent value abstains as neutral.
    pub fn classify(rsi: Option<f64>) -> Self {
        match rsi {
            Some(value) if value > 70.0 => RsiZone::Overbought,
            Some(value) if value < 30.0 => RsiZone::Oversold,
            Some(value) if value > 50.0 => RsiZone::Bullish,
            Some(value) if value < 50.0 => RsiZone::Bearish,
            _ => RsiZone::Neutral,
        }
    }
}

/// MACD momentum sub-signal, refined from the trend by histogram sign.
///
/// "Strong" requires the MACD line, signal line, and histogram to agree
/// on the same side of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MacdMomentum {
    StrongBuy,
    Buy,
    Sell,
    StrongSell,
    #[default]
    None,
}

/// MACD values for the most recent point of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Indicator snapshot for one analysis pass.
///
/// `None` marks the defined insufficient-data state: the series was
/// shorter than the indicator's required window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_sma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_sma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdOutput>,
}

/// Kind of an emitted trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    SmaGoldenCross,
    SmaDeathCross,
    RsiOversold,
    RsiOverbought,
    MacdCrossover,
}

impl SignalType {
    /// Get display label for this signal type.
    pub fn label(&self) -> &'static str {
        match self {
            SignalType::SmaGoldenCross => "SMA golden cross",
            SignalType::SmaDeathCross => "SMA death cross",
            SignalType::RsiOversold => "RSI oversold",
            SignalType::RsiOverbought => "RSI overbought",
            SignalType::MacdCrossover => "MACD crossover",
        }
    }
}

/// Suggested side of an emitted signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    Buy,
    Sell,
}

/// Indicator that produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalSource {
    Sma,
    Rsi,
    Macd,
}

impl SignalSource {
    pub fn label(&self) -> &'static str {
        match self {
            SignalSource::Sma => "SMA",
            SignalSource::Rsi => "RSI",
            SignalSource::Macd => "MACD",
        }
    }
}

/// A discrete, typed trade suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub action: SignalAction,
    /// Signal strength in [0, 100].
    pub strength: f64,
    pub description: String,
    pub source: SignalSource,
}

/// Full per-symbol analysis produced by the aggregator.
///
/// Produced fresh on every evaluation and owned by the caller; signals
/// keep their emission order (SMA, then RSI, then MACD).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub indicators: IndicatorSet,
    pub sma_trend: TrendDirection,
    /// SMA divergence in percent (0 when the trend is neutral).
    pub sma_strength: f64,
    pub rsi_trend: RsiZone,
    pub macd_trend: TrendDirection,
    pub macd_momentum: MacdMomentum,
    pub signals: Vec<Signal>,
    /// Composite score in [0, 100], when scoring was enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub current_price: f64,
}

impl Analysis {
    /// Strongest signal of this analysis; earlier signals win ties.
    pub fn strongest_signal(&self) -> Option<&Signal> {
        self.signals
            .iter()
            .reduce(|best, signal| if signal.strength > best.strength { signal } else { best })
    }
}
