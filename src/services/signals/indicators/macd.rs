//! MACD (Moving Average Convergence Divergence) indicator.

use super::Ema;
use crate::types::MacdValue;

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of the MACD line
/// - Histogram = MACD Line - Signal Line
///
/// The signal line runs over the MACD value of every price prefix of length
/// `slow_period..=N`, each prefix evaluated with the seeded EMA. Running the
/// fast and slow EMAs once and reading their prefix series gives the same
/// values bit for bit without the quadratic recomputation.
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period: fast_period.max(1),
            slow_period: slow_period.max(1),
            signal_period: signal_period.max(1),
        }
    }

    /// MACD value of each prefix `prices[..i]` for `i` in `slow_period..=N`.
    pub fn line_series(&self, prices: &[f64]) -> Vec<f64> {
        let fast = Ema::new(self.fast_period).prefix_series(prices);
        let slow = Ema::new(self.slow_period).prefix_series(prices);

        (self.slow_period..=prices.len())
            .map(|len| fast[len - 1] - slow[len - 1])
            .collect()
    }

    /// Calculate MACD, signal and histogram.
    ///
    /// With fewer prices than `slow_period` there is no MACD history and the
    /// signal line equals the MACD line (histogram 0).
    pub fn calculate(&self, prices: &[f64]) -> MacdValue {
        let macd =
            Ema::new(self.fast_period).calculate(prices) - Ema::new(self.slow_period).calculate(prices);

        let history = self.line_series(prices);
        let signal = if history.is_empty() {
            macd
        } else {
            Ema::new(self.signal_period).calculate(&history)
        };

        MacdValue {
            macd,
            signal,
            histogram: macd - signal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(count: usize) -> Vec<f64> {
        (0..count)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1)
            .collect()
    }

    /// Direct prefix-by-prefix evaluation of the MACD history.
    fn naive_line_series(prices: &[f64]) -> Vec<f64> {
        (26..=prices.len())
            .map(|len| {
                let prefix = &prices[..len];
                Ema::new(12).calculate(prefix) - Ema::new(26).calculate(prefix)
            })
            .collect()
    }

    #[test]
    fn test_line_series_matches_prefix_recomputation() {
        let prices = wave(120);
        let fast = Macd::default().line_series(&prices);
        let naive = naive_line_series(&prices);
        assert_eq!(fast.len(), naive.len());
        for (a, b) in fast.iter().zip(naive.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_signal_is_ema_of_history() {
        let prices = wave(80);
        let value = Macd::default().calculate(&prices);
        let expected_signal = Ema::new(9).calculate(&naive_line_series(&prices));
        assert_eq!(value.signal.to_bits(), expected_signal.to_bits());
        assert_eq!(value.histogram, value.macd - value.signal);
    }

    #[test]
    fn test_last_history_value_is_macd() {
        let prices = wave(60);
        let value = Macd::default().calculate(&prices);
        let history = Macd::default().line_series(&prices);
        assert_eq!(history.last().copied(), Some(value.macd));
    }

    #[test]
    fn test_short_series_has_zero_histogram() {
        let prices = wave(20);
        let value = Macd::default().calculate(&prices);
        assert_eq!(value.signal, value.macd);
        assert_eq!(value.histogram, 0.0);
    }

    #[test]
    fn test_rising_series_is_bullish() {
        let prices: Vec<f64> = (0..100).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let value = Macd::default().calculate(&prices);
        assert!(value.macd > 0.0);
        assert!(value.histogram > 0.0);
    }
}
