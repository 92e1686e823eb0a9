//! Historical volatility.

use crate::types::Candle;

/// Periods per year used to annualize.
const ANNUALIZATION_PERIODS: f64 = 365.0;

/// Natural-log returns of consecutive closes.
pub fn log_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

/// Population standard deviation of log returns over the whole sequence,
/// annualized by √365 and expressed in percent. Fewer than 2 candles reads 0.
pub fn volatility(candles: &[Candle]) -> f64 {
    if candles.len() < 2 {
        return 0.0;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let returns = log_returns(&closes);
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    variance.sqrt() * ANNUALIZATION_PERIODS.sqrt() * 100.0
}
