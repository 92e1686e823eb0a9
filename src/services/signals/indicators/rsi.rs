//! Relative Strength Index (RSI) indicator.

/// Neutral reading returned when there is not enough data.
pub const RSI_NEUTRAL: f64 = 50.0;

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of recent gains to recent losses.
/// Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
///
/// Averages are seeded with the plain mean of the first `period` changes and
/// then Wilder-smoothed across every later change.
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    pub fn min_periods(&self) -> usize {
        self.period + 1
    }

    /// Calculate RSI value from price changes.
    ///
    /// Fewer than `period + 1` prices yields the neutral 50.
    pub fn calculate(&self, prices: &[f64]) -> f64 {
        if prices.len() < self.min_periods() {
            return RSI_NEUTRAL;
        }

        let period = self.period;
        let mut gains = Vec::with_capacity(prices.len() - 1);
        let mut losses = Vec::with_capacity(prices.len() - 1);

        for pair in prices.windows(2) {
            let change = pair[1] - pair[0];
            gains.push(if change > 0.0 { change } else { 0.0 });
            losses.push(if change < 0.0 { change.abs() } else { 0.0 });
        }

        let mut avg_gain: f64 = gains.iter().take(period).sum::<f64>() / period as f64;
        let mut avg_loss: f64 = losses.iter().take(period).sum::<f64>() / period as f64;

        for i in period..gains.len() {
            avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        }

        if avg_loss == 0.0 {
            return 100.0;
        }

        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}
