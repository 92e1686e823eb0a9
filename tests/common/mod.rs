//! Shared fixtures for integration tests.

#![allow(dead_code)]

use augur::types::Candle;

pub const HOUR_MS: i64 = 3_600_000;

/// Steadily rising candles: each close is 1 above its open, bases 1.5 apart.
pub fn create_uptrend_candles(count: usize, start: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let base = start + i as f64 * 1.5;
            Candle::new(i as i64 * HOUR_MS, base, base + 2.0, base - 1.0, base + 1.0, 1000.0)
        })
        .collect()
}

/// Mirror of [`create_uptrend_candles`].
pub fn create_downtrend_candles(count: usize, start: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let base = start - i as f64 * 1.5;
            Candle::new(i as i64 * HOUR_MS, base, base + 1.0, base - 2.0, base - 1.0, 1000.0)
        })
        .collect()
}

pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Candle::new(i as i64 * HOUR_MS, c, c, c, c, 1000.0))
        .collect()
}
