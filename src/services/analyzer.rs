//! Technical analysis aggregation: indicator values, trend
//! classifications, and typed trading signals for one symbol.

use crate::config::ScoringWeights;
use crate::services::indicators::{macd, rsi, sma};
use crate::services::scoring::{self, ScoreContext};
use crate::types::{
    Analysis, Candle, IndicatorSet, MacdMomentum, MacdOutput, PriceSeries, RsiZone, Signal,
    SignalAction, SignalSource, SignalType, TrendDirection,
};

const RSI_PERIOD: usize = 14;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;

/// Trailing window for the average-volume comparison in scoring.
const VOLUME_LOOKBACK: usize = 20;

/// SMA divergence below this percent is treated as noise, not a signal.
const SMA_SIGNAL_FLOOR: f64 = 1.0;

/// Indicator periods and signal tuning for one analysis mode.
///
/// The scan profile pairs shorter SMAs with a steeper strength
/// multiplier than the chart profile. The two are tuned independently
/// and intentionally asymmetric; do not unify them.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzerProfile {
    pub short_period: usize,
    pub long_period: usize,
    /// Multiplier from raw SMA divergence percent to signal strength.
    pub sma_strength_scale: f64,
}

impl AnalyzerProfile {
    /// Chart mode: caller-chosen periods with gentle strength scaling.
    pub fn chart(short_period: usize, long_period: usize) -> Self {
        Self {
            short_period,
            long_period,
            sma_strength_scale: 0.2,
        }
    }

    /// Scan mode: fixed fast periods tuned for batch screening.
    pub fn scan() -> Self {
        Self {
            short_period: 5,
            long_period: 21,
            sma_strength_scale: 5.0,
        }
    }
}

/// Run a full analysis pass over a candle sequence.
///
/// Indicators that lack history abstain with `None` and emit no
/// signals; the function itself never fails. Passing `weights` enables
/// composite scoring over the same series.
pub fn analyze(
    candles: &[Candle],
    profile: &AnalyzerProfile,
    current_price: f64,
    weights: Option<&ScoringWeights>,
) -> Analysis {
    let series = PriceSeries::from_candles(candles);

    let short_sma = sma(&series.closes, profile.short_period);
    let long_sma = sma(&series.closes, profile.long_period);
    let rsi_value = rsi(&series.closes, RSI_PERIOD);
    let macd_value = macd(&series.closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);

    let (sma_trend, sma_strength) = classify_sma(short_sma, long_sma);
    let rsi_trend = RsiZone::classify(rsi_value);
    let (macd_trend, macd_momentum) = match macd_value {
        Some(ref output) => classify_macd(output),
        None => (TrendDirection::Neutral, MacdMomentum::None),
    };

    let signals = build_signals(
        profile,
        sma_trend,
        sma_strength,
        rsi_trend,
        rsi_value,
        macd_momentum,
    );

    let score = weights.map(|weights| {
        let ctx = ScoreContext {
            sma_trend,
            sma_strength,
            rsi: rsi_value,
            macd_present: macd_value.is_some(),
            macd_trend,
            macd_momentum,
            current_volume: series.volumes.last().copied(),
            average_volume: average_volume(&series.volumes, VOLUME_LOOKBACK),
            high: series.highs.last().copied(),
            low: series.lows.last().copied(),
            close: series.closes.last().copied(),
        };
        scoring::composite_score(&ctx, weights)
    });

    Analysis {
        indicators: IndicatorSet {
            short_sma,
            long_sma,
            rsi: rsi_value,
            macd: macd_value,
        },
        sma_trend,
        sma_strength,
        rsi_trend,
        macd_trend,
        macd_momentum,
        signals,
        score,
        current_price,
    }
}

/// SMA trend with divergence strength; abstains when either SMA is
/// missing.
fn classify_sma(short_sma: Option<f64>, long_sma: Option<f64>) -> (TrendDirection, f64) {
    match (short_sma, long_sma) {
        (Some(short), Some(long)) if short > long => {
            (TrendDirection::Bullish, ((short / long) - 1.0) * 100.0)
        }
        (Some(short), Some(long)) if short < long => {
            (TrendDirection::Bearish, ((long / short) - 1.0) * 100.0)
        }
        _ => (TrendDirection::Neutral, 0.0),
    }
}

/// MACD trend (line vs signal) and histogram-refined momentum.
fn classify_macd(output: &MacdOutput) -> (TrendDirection, MacdMomentum) {
    let trend = if output.macd > output.signal {
        TrendDirection::Bullish
    } else if output.macd < output.signal {
        TrendDirection::Bearish
    } else {
        TrendDirection::Neutral
    };

    let momentum = if output.macd > 0.0 && output.signal > 0.0 && output.histogram > 0.0 {
        MacdMomentum::StrongBuy
    } else if output.macd < 0.0 && output.signal < 0.0 && output.histogram < 0.0 {
        MacdMomentum::StrongSell
    } else if trend == TrendDirection::Bullish && output.histogram > 0.0 {
        MacdMomentum::Buy
    } else if trend == TrendDirection::Bearish && output.histogram < 0.0 {
        MacdMomentum::Sell
    } else {
        MacdMomentum::None
    };

    (trend, momentum)
}

/// Emit signals in SMA, RSI, MACD order; the order is significant for
/// strongest-signal tie-breaking downstream.
fn build_signals(
    profile: &AnalyzerProfile,
    sma_trend: TrendDirection,
    sma_strength: f64,
    rsi_trend: RsiZone,
    rsi_value: Option<f64>,
    macd_momentum: MacdMomentum,
) -> Vec<Signal> {
    let mut signals = Vec::new();

    if sma_strength > SMA_SIGNAL_FLOOR {
        let strength = (sma_strength * profile.sma_strength_scale).min(100.0);
        match sma_trend {
            TrendDirection::Bullish => signals.push(Signal {
                signal_type: SignalType::SmaGoldenCross,
                action: SignalAction::Buy,
                strength,
                description: format!(
                    "Golden cross: fast SMA ({}) crossed above slow SMA ({})",
                    profile.short_period, profile.long_period
                ),
                source: SignalSource::Sma,
            }),
            TrendDirection::Bearish => signals.push(Signal {
                signal_type: SignalType::SmaDeathCross,
                action: SignalAction::Sell,
                strength,
                description: format!(
                    "Death cross: fast SMA ({}) crossed below slow SMA ({})",
                    profile.short_period, profile.long_period
                ),
                source: SignalSource::Sma,
            }),
            TrendDirection::Neutral => {}
        }
    }

    if let Some(value) = rsi_value {
        match rsi_trend {
            RsiZone::Oversold => signals.push(Signal {
                signal_type: SignalType::RsiOversold,
                action: SignalAction::Buy,
                strength: 80.0,
                description: format!(
                    "RSI in oversold territory ({:.2}) - potential upward reversal",
                    value
                ),
                source: SignalSource::Rsi,
            }),
            RsiZone::Overbought => signals.push(Signal {
                signal_type: SignalType::RsiOverbought,
                action: SignalAction::Sell,
                strength: 80.0,
                description: format!(
                    "RSI in overbought territory ({:.2}) - potential downward reversal",
                    value
                ),
                source: SignalSource::Rsi,
            }),
            _ => {}
        }
    }

    match macd_momentum {
        MacdMomentum::StrongBuy => signals.push(Signal {
            signal_type: SignalType::MacdCrossover,
            action: SignalAction::Buy,
            strength: 90.0,
            description:
                "Strong MACD bullish signal: MACD line above the signal line in positive territory"
                    .to_string(),
            source: SignalSource::Macd,
        }),
        MacdMomentum::Buy => signals.push(Signal {
            signal_type: SignalType::MacdCrossover,
            action: SignalAction::Buy,
            strength: 70.0,
            description: "MACD bullish signal: MACD line crossed above the signal line".to_string(),
            source: SignalSource::Macd,
        }),
        MacdMomentum::StrongSell => signals.push(Signal {
            signal_type: SignalType::MacdCrossover,
            action: SignalAction::Sell,
            strength: 90.0,
            description:
                "Strong MACD bearish signal: MACD line below the signal line in negative territory"
                    .to_string(),
            source: SignalSource::Macd,
        }),
        MacdMomentum::Sell => signals.push(Signal {
            signal_type: SignalType::MacdCrossover,
            action: SignalAction::Sell,
            strength: 70.0,
            description: "MACD bearish signal: MACD line crossed below the signal line".to_string(),
            source: SignalSource::Macd,
        }),
        MacdMomentum::None => {}
    }

    signals
}

/// Trailing average volume; abstains when the window is not filled.
fn average_volume(volumes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || volumes.len() < period {
        return None;
    }

    Some(volumes[volumes.len() - period..].iter().sum::<f64>() / period as f64)
}
