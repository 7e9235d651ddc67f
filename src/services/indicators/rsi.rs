//! Relative Strength Index (RSI) indicator.

/// Default smoothing period used across the engine.
pub const DEFAULT_PERIOD: usize = 14;

/// Wilder-smoothed RSI for the most recent point of a series.
///
/// Measures momentum by comparing the magnitude of recent gains to
/// recent losses. Values range 0-100:
/// - Below 30: Oversold (potential buy signal)
/// - Above 70: Overbought (potential sell signal)
///
/// The average gain/loss is seeded from the first `period` deltas, then
/// smoothed exponentially over the rest of the series. Returns `None`
/// when fewer than `period + 1` values are available.
pub fn rsi(series: &[f64], period: usize) -> Option<f64> {
    if period == 0 || series.len() < period + 1 {
        return None;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in 1..=period {
        let change = series[i] - series[i - 1];
        if change >= 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let mut avg_gain = gains / period as f64;
    let mut avg_loss = losses / period as f64;

    // Smoothed averages over the remaining data.
    for i in (period + 1)..series.len() {
        let change = series[i] - series[i - 1];
        let (gain, loss) = if change >= 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };

        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
