//! Simple Moving Average (SMA) indicator.

/// SMA (Simple Moving Average) indicator.
///
/// Arithmetic mean of the last `period` values. With fewer values than the
/// period it returns the last value unchanged.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    /// Calculate the SMA of the trailing window. Empty input yields 0.
    pub fn calculate(&self, values: &[f64]) -> f64 {
        if values.len() < self.period {
            return values.last().copied().unwrap_or(0.0);
        }

        values[values.len() - self.period..].iter().sum::<f64>() / self.period as f64
    }
}
