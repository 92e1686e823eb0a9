//! Exponential Moving Average (EMA) indicator.

use super::Sma;

/// EMA (Exponential Moving Average) indicator.
///
/// Seeded with the SMA of the first `period` values, then iterated forward
/// over every remaining value with multiplier `2 / (period + 1)`. The seed is
/// never recomputed per window.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    fn multiplier(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }

    /// Calculate the EMA over the whole sequence.
    ///
    /// With fewer values than the period, returns the last value unchanged.
    pub fn calculate(&self, values: &[f64]) -> f64 {
        if values.len() < self.period {
            return values.last().copied().unwrap_or(0.0);
        }

        let multiplier = self.multiplier();
        let mut ema = Sma::new(self.period).calculate(&values[..self.period]);
        for value in &values[self.period..] {
            ema = value * multiplier + ema * (1.0 - multiplier);
        }
        ema
    }

    /// EMA of every prefix: element `i` equals `calculate(&values[..=i])`.
    pub fn prefix_series(&self, values: &[f64]) -> Vec<f64> {
        let multiplier = self.multiplier();
        let mut series = Vec::with_capacity(values.len());
        let mut ema = 0.0;

        for (i, value) in values.iter().enumerate() {
            let len = i + 1;
            if len < self.period {
                series.push(*value);
                continue;
            }
            ema = if len == self.period {
                Sma::new(self.period).calculate(&values[..self.period])
            } else {
                value * multiplier + ema * (1.0 - multiplier)
            };
            series.push(ema);
        }

        series
    }
}
