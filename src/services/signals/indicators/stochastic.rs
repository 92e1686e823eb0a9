//! Stochastic Oscillator indicator.

use crate::types::{Candle, StochasticValue};

/// Stochastic Oscillator.
///
/// Compares closing price to price range over a period:
/// %K = (Current Close - Lowest Low) / (Highest High - Lowest Low) * 100
///
/// %D is the mean of %K recomputed over each of the last `d_period`
/// full-length trailing windows.
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        Self {
            k_period: k_period.max(1),
            d_period: d_period.max(1),
        }
    }

    /// %K of a window against its last close. A flat window reads 50.
    fn percent_k(window: &[Candle]) -> f64 {
        let Some(last) = window.last() else {
            return 50.0;
        };
        let lowest_low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let highest_high = window
            .iter()
            .map(|c| c.high)
            .fold(f64::NEG_INFINITY, f64::max);

        if highest_high > lowest_low {
            (last.close - lowest_low) / (highest_high - lowest_low) * 100.0
        } else {
            50.0
        }
    }

    /// Calculate %K and %D. Fewer candles than `k_period` reads 50/50.
    pub fn calculate(&self, candles: &[Candle]) -> StochasticValue {
        let n = candles.len();
        if n < self.k_period {
            return StochasticValue { k: 50.0, d: 50.0 };
        }

        let k = Self::percent_k(&candles[n - self.k_period..]);

        let k_values: Vec<f64> = (n.saturating_sub(self.d_period)..n)
            .filter_map(|i| {
                let start = (i + 1).saturating_sub(self.k_period);
                let window = &candles[start..=i];
                (window.len() == self.k_period).then(|| Self::percent_k(window))
            })
            .collect();

        let d = if k_values.is_empty() {
            k
        } else {
            k_values.iter().sum::<f64>() / k_values.len() as f64
        };

        StochasticValue { k, d }
    }
}
