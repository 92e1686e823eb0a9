//! Composite trend strength.

use super::Ema;
use crate::types::Candle;

/// Mean of (price vs EMA20) and (EMA20 vs EMA50), as fractions.
///
/// Positive values indicate an uptrend, negative a downtrend. Fewer than 20
/// candles reads 0.
pub fn trend_strength(candles: &[Candle]) -> f64 {
    if candles.len() < 20 {
        return 0.0;
    }

    let prices: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let ema20 = Ema::new(20).calculate(&prices);
    let ema50 = Ema::new(50).calculate(&prices);
    let current_price = prices[prices.len() - 1];

    let price_vs_ema20 = (current_price - ema20) / ema20;
    let ema_alignment = (ema20 - ema50) / ema50;

    (price_vs_ema20 + ema_alignment) / 2.0
}
