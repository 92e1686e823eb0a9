//! Support and resistance levels.

use crate::types::{Candle, SupportResistance};

const LOOKBACK: usize = 20;
const EXTREMES: usize = 3;

/// Resistance is the mean of the 3 highest highs and support the mean of the
/// 3 lowest lows over the last 20 candles. With fewer candles the levels are
/// ±2% of the last close.
pub fn support_resistance(candles: &[Candle]) -> SupportResistance {
    let Some(last) = candles.last() else {
        return SupportResistance {
            support: 0.0,
            resistance: 0.0,
        };
    };

    if candles.len() < LOOKBACK {
        return SupportResistance {
            support: last.close * 0.98,
            resistance: last.close * 1.02,
        };
    }

    let window = &candles[candles.len() - LOOKBACK..];
    let mut highs: Vec<f64> = window.iter().map(|c| c.high).collect();
    let mut lows: Vec<f64> = window.iter().map(|c| c.low).collect();
    highs.sort_by(|a, b| b.total_cmp(a));
    lows.sort_by(|a, b| a.total_cmp(b));

    SupportResistance {
        support: lows.iter().take(EXTREMES).sum::<f64>() / EXTREMES as f64,
        resistance: highs.iter().take(EXTREMES).sum::<f64>() / EXTREMES as f64,
    }
}
