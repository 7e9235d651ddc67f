//! Composite scoring: weighted blend of trend, momentum, volume, and
//! volatility factors into a single 0-100 ranking number.

use crate::config::ScoringWeights;
use crate::types::{MacdMomentum, TrendDirection};
use tracing::warn;

/// Factor inputs for one composite-score evaluation.
///
/// Absent inputs (insufficient history) make their factor abstain.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreContext {
    pub sma_trend: TrendDirection,
    /// SMA divergence in percent.
    pub sma_strength: f64,
    pub rsi: Option<f64>,
    /// Whether MACD could be computed at all.
    pub macd_present: bool,
    pub macd_trend: TrendDirection,
    pub macd_momentum: MacdMomentum,
    /// Volume of the latest candle.
    pub current_volume: Option<f64>,
    /// Trailing average volume over the lookback window.
    pub average_volume: Option<f64>,
    /// High/low/close of the latest candle.
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
}

/// Blend the factors into a score in [0, 100], starting from a neutral 50.
///
/// Scoring is total: inputs that would produce a non-finite value yield
/// the neutral score instead of an error.
pub fn composite_score(ctx: &ScoreContext, weights: &ScoringWeights) -> f64 {
    let score = raw_score(ctx, weights);
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        warn!("Composite score was not finite, returning neutral");
        50.0
    }
}

fn raw_score(ctx: &ScoreContext, weights: &ScoringWeights) -> f64 {
    let mut score = 50.0;

    // Trend factor: SMA divergence, saturating at 10%.
    match ctx.sma_trend {
        TrendDirection::Bullish => {
            score += weights.trend * 100.0 * (ctx.sma_strength / 10.0).min(1.0);
        }
        TrendDirection::Bearish => {
            score -= weights.trend * 100.0 * (ctx.sma_strength / 10.0).min(1.0);
        }
        TrendDirection::Neutral => {}
    }

    // Momentum factor, RSI half: oversold pushes up, overbought down,
    // the neutral band contributes linearly around the 50 midline.
    if let Some(rsi) = ctx.rsi {
        if rsi < 30.0 {
            score += weights.momentum * 100.0 * (1.0 - rsi / 30.0);
        } else if rsi > 70.0 {
            score -= weights.momentum * 100.0 * ((rsi - 70.0) / 30.0);
        } else {
            score += weights.momentum * 100.0 * ((rsi - 50.0) / 20.0);
        }
    }

    // Momentum factor, MACD half.
    if ctx.macd_present {
        match ctx.macd_momentum {
            MacdMomentum::StrongBuy => score += weights.momentum * 100.0,
            MacdMomentum::Buy => score += weights.momentum * 70.0,
            MacdMomentum::StrongSell => score -= weights.momentum * 100.0,
            MacdMomentum::Sell => score -= weights.momentum * 70.0,
            MacdMomentum::None => match ctx.macd_trend {
                TrendDirection::Bullish => score += weights.momentum * 30.0,
                TrendDirection::Bearish => score -= weights.momentum * 30.0,
                TrendDirection::Neutral => {}
            },
        }
    }

    // The volume and volatility factors follow the SMA trend direction.
    let trend_sign = if ctx.sma_trend == TrendDirection::Bullish {
        1.0
    } else {
        -1.0
    };

    // Volume factor: latest volume vs the trailing average. Weak volume
    // counts against the prevailing trend.
    if let (Some(current), Some(average)) = (ctx.current_volume, ctx.average_volume) {
        if current > average * 1.5 {
            score += weights.volume * 100.0 * trend_sign;
        } else if current > average * 1.2 {
            score += weights.volume * 70.0 * trend_sign;
        } else if current < average * 0.8 {
            score -= weights.volume * 30.0 * trend_sign;
        }
    }

    // Volatility factor: percent range of the latest candle. A degenerate
    // candle (zero close) makes the range non-finite; the factor abstains.
    if let (Some(high), Some(low), Some(close)) = (ctx.high, ctx.low, ctx.close) {
        let percent_range = (high - low) / close * 100.0;
        if percent_range.is_finite() {
            if percent_range > 5.0 {
                score += weights.volatility * 100.0 * trend_sign;
            } else if percent_range > 2.0 {
                score += weights.volatility * 60.0 * trend_sign;
            } else {
                score += weights.volatility * 20.0 * trend_sign;
            }
        }
    }

    score
}
