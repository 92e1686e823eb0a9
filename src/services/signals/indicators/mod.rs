//! Technical indicator implementations.
//!
//! Every calculation degrades to a documented default on short input instead
//! of failing; downstream confidence thresholds assume those defaults.

pub mod bollinger;
pub mod correlation;
pub mod ema;
pub mod levels;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use bollinger::BollingerBands;
pub use correlation::btc_correlation;
pub use ema::Ema;
pub use levels::support_resistance;
pub use macd::Macd;
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::Stochastic;
pub use trend::trend_strength;
pub use volatility::volatility;
pub use volume::volume_profile;

use crate::types::{Candle, IndicatorSet};

/// Close prices of a candle sequence.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Compute the full indicator snapshot for a candle sequence.
pub fn compute_indicators(candles: &[Candle]) -> IndicatorSet {
    let prices = closes(candles);

    IndicatorSet {
        ema12: Ema::new(12).calculate(&prices),
        ema26: Ema::new(26).calculate(&prices),
        ema50: Ema::new(50).calculate(&prices),
        rsi: Rsi::default().calculate(&prices),
        stochastic: Stochastic::default().calculate(candles),
        bollinger_bands: BollingerBands::default().calculate(&prices),
        macd: Macd::default().calculate(&prices),
        volatility: volatility(candles),
        volume_profile: volume_profile(candles),
    }
}
