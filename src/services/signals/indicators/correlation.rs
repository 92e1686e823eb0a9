//! Cross-asset return correlation.

use super::volatility::log_returns;
use crate::types::Candle;

/// Minimum overlapping candles before a correlation is attempted.
const MIN_OVERLAP: usize = 20;
/// Minimum paired return observations.
const MIN_RETURNS: usize = 10;

/// Pearson correlation of log returns between a symbol and BTC over their
/// overlapping trailing window, clamped to [-1, 1].
///
/// Reads 0 when the overlap is under 20 candles, when fewer than 10 paired
/// returns exist, or when either side has no variance.
pub fn btc_correlation(symbol_candles: &[Candle], btc_candles: &[Candle]) -> f64 {
    let overlap = symbol_candles.len().min(btc_candles.len());
    if overlap < MIN_OVERLAP {
        return 0.0;
    }

    let symbol_closes: Vec<f64> = symbol_candles[symbol_candles.len() - overlap..]
        .iter()
        .map(|c| c.close)
        .collect();
    let btc_closes: Vec<f64> = btc_candles[btc_candles.len() - overlap..]
        .iter()
        .map(|c| c.close)
        .collect();

    let xs = log_returns(&symbol_closes);
    let ys = log_returns(&btc_closes);
    if xs.len() < MIN_RETURNS {
        return 0.0;
    }

    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = xs.iter().zip(&ys).map(|(x, y)| x * y).sum();
    let sum_x2: f64 = xs.iter().map(|x| x * x).sum();
    let sum_y2: f64 = ys.iter().map(|y| y * y).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    let correlation = numerator / denominator;
    if correlation.is_nan() {
        return 0.0;
    }
    correlation.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64 * 60_000, c, c * 1.01, c * 0.99, c, 10.0))
            .collect()
    }

    fn noisy(count: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        let mut price = 100.0;
        (0..count)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let step = ((state >> 33) % 1000) as f64 / 1000.0 - 0.5;
                price *= 1.0 + step * 0.04;
                price
            })
            .collect()
    }

    #[test]
    fn test_self_correlation_is_one() {
        let candles = candles_from_closes(&noisy(60, 7));
        let corr = btc_correlation(&candles, &candles);
        assert!((corr - 1.0).abs() < 1e-9, "got {}", corr);
    }

    #[test]
    fn test_inverse_moves_are_negatively_correlated() {
        let closes = noisy(40, 11);
        let inverse: Vec<f64> = closes.iter().map(|c| 10_000.0 / c).collect();
        let corr = btc_correlation(&candles_from_closes(&closes), &candles_from_closes(&inverse));
        assert!((corr + 1.0).abs() < 1e-9, "got {}", corr);
    }

    #[test]
    fn test_short_overlap_is_zero() {
        let a = candles_from_closes(&noisy(100, 1));
        let b = candles_from_closes(&noisy(19, 2));
        assert_eq!(btc_correlation(&a, &b), 0.0);
    }

    #[test]
    fn test_flat_series_is_zero() {
        let a = candles_from_closes(&noisy(30, 3));
        let b = candles_from_closes(&[50.0; 30]);
        assert_eq!(btc_correlation(&a, &b), 0.0);
    }

    #[test]
    fn test_uses_trailing_overlap() {
        let closes = noisy(80, 5);
        let a = candles_from_closes(&closes);
        let b = candles_from_closes(&closes[30..]);
        let corr = btc_correlation(&a, &b);
        assert!((corr - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_range() {
        let corr = btc_correlation(
            &candles_from_closes(&noisy(50, 21)),
            &candles_from_closes(&noisy(50, 42)),
        );
        assert!((-1.0..=1.0).contains(&corr));
    }
}
