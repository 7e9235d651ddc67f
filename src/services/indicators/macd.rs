//! MACD (Moving Average Convergence Divergence) indicator.

use crate::types::MacdOutput;

/// Calculate an EMA series for a slice of values.
///
/// The first EMA is the SMA of the first `period` values; subsequent
/// points use the standard recursive update with `k = 2 / (period + 1)`.
/// Empty when the input is shorter than `period`.
fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = Vec::with_capacity(values.len() - period + 1);

    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
    ema.push(seed);

    for value in &values[period..] {
        let prev = *ema.last().unwrap();
        ema.push((value - prev) * multiplier + prev);
    }

    ema
}

/// MACD line, signal line, and histogram for the most recent point.
///
/// - MACD line = EMA(`fast`) − EMA(`slow`)
/// - Signal line = EMA(`signal_period`) of the MACD line
/// - Histogram = MACD line − signal line
///
/// One vectorized pass over the series; the running EMA state makes
/// each point O(1) instead of recomputing full history. Returns `None`
/// when fewer than `slow + signal_period` values are available.
pub fn macd(series: &[f64], fast: usize, slow: usize, signal_period: usize) -> Option<MacdOutput> {
    if fast == 0 || slow <= fast || series.len() < slow + signal_period {
        return None;
    }

    let fast_ema = ema_series(series, fast);
    let slow_ema = ema_series(series, slow);

    // Align the fast series to the slow one (fast starts earlier).
    let offset = slow - fast;
    let macd_line: Vec<f64> = fast_ema
        .iter()
        .skip(offset)
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();

    if macd_line.len() < signal_period {
        return None;
    }

    let signal_line = ema_series(&macd_line, signal_period);

    let macd = *macd_line.last()?;
    let signal = *signal_line.last()?;

    Some(MacdOutput {
        macd,
        signal,
        histogram: macd - signal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_seed_is_sma() {
        let values = [2.0, 4.0, 6.0, 8.0];
        let ema = ema_series(&values, 3);
        assert_eq!(ema[0], 4.0);
        // (8 - 4) * 0.5 + 4
        assert_eq!(ema[1], 6.0);
    }

    #[test]
    fn test_ema_insufficient_data() {
        assert!(ema_series(&[1.0, 2.0], 3).is_empty());
    }

    #[test]
    fn test_macd_insufficient_data() {
        let series: Vec<f64> = (0..34).map(|i| i as f64).collect();
        assert!(macd(&series, 12, 26, 9).is_none());
    }

    #[test]
    fn test_macd_minimum_length() {
        let series: Vec<f64> = (0..35).map(|i| 100.0 + i as f64).collect();
        assert!(macd(&series, 12, 26, 9).is_some());
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let series: Vec<f64> = (0..60).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let output = macd(&series, 12, 26, 9).unwrap();
        assert!(output.macd > 0.0);
        assert!(output.signal > 0.0);
    }

    #[test]
    fn test_macd_negative_in_downtrend() {
        let series: Vec<f64> = (0..60).map(|i| 100.0 * 0.99f64.powi(i)).collect();
        let output = macd(&series, 12, 26, 9).unwrap();
        assert!(output.macd < 0.0);
        assert!(output.signal < 0.0);
    }

    #[test]
    fn test_macd_histogram_identity() {
        let series: Vec<f64> = (0..50)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();
        let output = macd(&series, 12, 26, 9).unwrap();
        assert!((output.histogram - (output.macd - output.signal)).abs() < 1e-12);
    }
}
