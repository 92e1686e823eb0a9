//! Indicator-driven signal synthesis.
//!
//! Rule groups run in a fixed order against one confidence accumulator. The
//! first rule that picks a direction owns it; later rules only add or
//! subtract confidence.

use crate::services::signals::geometry::{resolve_levels, RiskPercents};
use crate::services::signals::indicators::trend_strength;
use crate::types::{Candle, IndicatorSet, Signal, SignalDirection, Timeframe};
use tracing::debug;

/// Candles required before the synthesizer will score anything.
pub const MIN_SYNTHESIS_CANDLES: usize = 50;

/// Indicator-driven signals below this confidence are rejected.
pub const MIN_SYNTHESIS_CONFIDENCE: i32 = 65;

/// Confidence ceiling.
pub const MAX_CONFIDENCE: i32 = 95;

/// Running confluence score.
#[derive(Debug, Default)]
struct Confluence {
    direction: Option<SignalDirection>,
    confidence: i32,
    reasons: Vec<&'static str>,
}

impl Confluence {
    fn add(&mut self, weight: i32, reason: &'static str) {
        self.confidence += weight;
        self.reasons.push(reason);
    }

    /// Add weight and take `direction` only if none is set yet.
    fn lean(&mut self, direction: SignalDirection, weight: i32, reason: &'static str) {
        if self.direction.is_none() {
            self.direction = Some(direction);
        }
        self.add(weight, reason);
    }

    fn is(&self, direction: SignalDirection) -> bool {
        self.direction == Some(direction)
    }

    fn ema_alignment(&mut self, ind: &IndicatorSet) {
        if ind.ema12 > ind.ema26 && ind.ema26 > ind.ema50 {
            self.lean(SignalDirection::Buy, 25, "Bullish EMA alignment");
        } else if ind.ema12 < ind.ema26 && ind.ema26 < ind.ema50 {
            self.lean(SignalDirection::Sell, 25, "Bearish EMA alignment");
        }
    }

    fn rsi(&mut self, rsi: f64) {
        if rsi < 25.0 {
            self.lean(SignalDirection::Buy, 30, "RSI oversold");
        } else if rsi > 75.0 {
            self.lean(SignalDirection::Sell, 30, "RSI overbought");
        } else if rsi < 35.0 && self.is(SignalDirection::Buy) {
            self.add(15, "RSI approaching oversold");
        } else if rsi > 65.0 && self.is(SignalDirection::Sell) {
            self.add(15, "RSI approaching overbought");
        }
    }

    fn stochastic(&mut self, ind: &IndicatorSet) {
        let (k, d) = (ind.stochastic.k, ind.stochastic.d);
        if k < 20.0 && d < 20.0 {
            self.lean(SignalDirection::Buy, 20, "Stochastic oversold");
        } else if k > 80.0 && d > 80.0 {
            self.lean(SignalDirection::Sell, 20, "Stochastic overbought");
        } else if k > d && k < 50.0 && self.is(SignalDirection::Buy) {
            self.add(15, "Stochastic bullish crossover");
        } else if k < d && k > 50.0 && self.is(SignalDirection::Sell) {
            self.add(15, "Stochastic bearish crossover");
        }
    }

    fn bollinger(&mut self, ind: &IndicatorSet, price: f64) {
        let bands = ind.bollinger_bands;
        let width = bands.upper - bands.lower;
        if width <= 0.0 {
            return;
        }
        let position = (price - bands.lower) / width;
        if position <= 0.1 {
            self.lean(SignalDirection::Buy, 25, "Price at lower Bollinger band");
        } else if position >= 0.9 {
            self.lean(SignalDirection::Sell, 25, "Price at upper Bollinger band");
        }
    }

    fn macd(&mut self, ind: &IndicatorSet) {
        let macd = ind.macd;
        if macd.macd > macd.signal && macd.histogram > 0.0 && self.is(SignalDirection::Buy) {
            self.add(20, "MACD bullish confirmation");
        } else if macd.macd < macd.signal && macd.histogram < 0.0 && self.is(SignalDirection::Sell) {
            self.add(20, "MACD bearish confirmation");
        }
    }

    fn volume(&mut self, volume_profile: f64) {
        if volume_profile > 1.5 {
            self.add(15, "High volume confirmation");
        } else if volume_profile < 0.5 {
            self.add(-10, "Low volume");
        }
    }

    fn volatility(&mut self, volatility: f64) {
        if volatility > 100.0 {
            self.add(-15, "Extreme volatility");
        } else if volatility < 30.0 {
            self.add(10, "Low volatility");
        }
    }

    fn correlation(&mut self, btc_correlation: f64) {
        let strength = btc_correlation.abs();
        if strength > 0.8 {
            self.add(15, "Strong BTC correlation");
        } else if strength < 0.3 {
            self.add(10, "Independent of BTC");
        }
    }

    fn momentum(&mut self, price_change_pct: f64) {
        if price_change_pct.abs() <= 2.0 {
            return;
        }
        let aligned = (price_change_pct > 0.0 && self.is(SignalDirection::Buy))
            || (price_change_pct < 0.0 && self.is(SignalDirection::Sell));
        if aligned {
            self.add(15, "Momentum aligned");
        } else {
            self.add(-10, "Momentum against direction");
        }
    }

    fn trend(&mut self, strength: f64) {
        if (strength > 0.7 && self.is(SignalDirection::Buy))
            || (strength < -0.7 && self.is(SignalDirection::Sell))
        {
            self.add(20, "Strong trend confirmation");
        }
    }
}

/// Score one symbol's indicators and build a signal if the confluence is
/// strong enough.
///
/// Returns `None` when fewer than 50 candles are given, no rule picked a
/// direction, confidence stays below 65, or the target/stop geometry is
/// invalid.
pub fn synthesize_signal(
    symbol: &str,
    candles: &[Candle],
    indicators: &IndicatorSet,
    btc_correlation: f64,
    timeframe: Timeframe,
) -> Option<Signal> {
    if candles.len() < MIN_SYNTHESIS_CANDLES {
        debug!("Skipping {}: {} candles, need {}", symbol, candles.len(), MIN_SYNTHESIS_CANDLES);
        return None;
    }

    let current_price = candles[candles.len() - 1].close;
    let previous_close = candles[candles.len() - 2].close;
    let price_change_pct = if previous_close != 0.0 {
        (current_price - previous_close) / previous_close * 100.0
    } else {
        0.0
    };

    let mut score = Confluence::default();
    score.ema_alignment(indicators);
    score.rsi(indicators.rsi);
    score.stochastic(indicators);
    score.bollinger(indicators, current_price);
    score.macd(indicators);
    score.volume(indicators.volume_profile);
    score.volatility(indicators.volatility);
    score.correlation(btc_correlation);
    score.momentum(price_change_pct);
    score.trend(trend_strength(candles));

    let Some(direction) = score.direction else {
        debug!("No signal for {}: no direction (confidence {})", symbol, score.confidence);
        return None;
    };
    if score.confidence < MIN_SYNTHESIS_CONFIDENCE {
        debug!(
            "No signal for {}: confidence {} below {}",
            symbol, score.confidence, MIN_SYNTHESIS_CONFIDENCE
        );
        return None;
    }
    let confidence = score.confidence.clamp(0, MAX_CONFIDENCE) as u8;

    let risk = RiskPercents::for_timeframe(timeframe, indicators.volatility);
    let Some(levels) = resolve_levels(direction, current_price, risk) else {
        debug!("No signal for {}: invalid target/stop around {}", symbol, current_price);
        return None;
    };

    Some(Signal::new(
        symbol.to_string(),
        direction,
        current_price,
        levels.target_price,
        levels.stop_loss,
        confidence,
        timeframe,
        *indicators,
        btc_correlation,
        score.reasons.join(", "),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::indicators::compute_indicators;
    use crate::types::{BollingerValue, MacdValue, SignalStatus, StochasticValue};

    fn flat_candles(count: usize, price: f64) -> Vec<Candle> {
        (0..count)
            .map(|i| Candle::new(i as i64 * 60_000, price, price, price, price, 1000.0))
            .collect()
    }

    fn create_uptrend_candles(count: usize) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                let base = 100.0 + i as f64 * 1.5;
                Candle::new(i as i64 * 60_000, base, base + 2.0, base - 1.0, base + 1.0, 1000.0)
            })
            .collect()
    }

    /// Indicators that fire no rule on their own except the calm-volatility
    /// and independence bonuses, which are neutralized here.
    fn quiet_indicators() -> IndicatorSet {
        IndicatorSet {
            ema12: 100.0,
            ema26: 100.0,
            ema50: 100.0,
            rsi: 50.0,
            stochastic: StochasticValue { k: 50.0, d: 50.0 },
            bollinger_bands: BollingerValue {
                upper: 120.0,
                middle: 100.0,
                lower: 80.0,
            },
            macd: MacdValue {
                macd: 0.0,
                signal: 0.0,
                histogram: 0.0,
            },
            volatility: 50.0,
            volume_profile: 1.0,
        }
    }

    fn bullish_indicators() -> IndicatorSet {
        IndicatorSet {
            ema12: 110.0,
            ema26: 105.0,
            ema50: 100.0,
            rsi: 30.0,
            macd: MacdValue {
                macd: 1.0,
                signal: 0.5,
                histogram: 0.5,
            },
            volume_profile: 2.0,
            ..quiet_indicators()
        }
    }

    #[test]
    fn test_requires_fifty_candles() {
        let candles = flat_candles(49, 100.0);
        assert!(synthesize_signal("ETHUSDT", &candles, &bullish_indicators(), 0.5, Timeframe::OneHour)
            .is_none());
    }

    #[test]
    fn test_bullish_confluence() {
        // EMA 25 + RSI 15 + MACD 20 + volume 15.
        let candles = flat_candles(50, 100.0);
        let signal =
            synthesize_signal("ETHUSDT", &candles, &bullish_indicators(), 0.5, Timeframe::OneHour)
                .unwrap();
        assert_eq!(signal.direction, SignalDirection::Buy);
        assert_eq!(signal.confidence, 75);
        assert_eq!(signal.status, SignalStatus::Pending);
        assert_eq!(signal.entry_price, 100.0);
        // 1h base 2.5%/1.8% plus one volatility unit (0.5%/0.3%).
        assert!((signal.target_price - 103.0).abs() < 1e-9);
        assert!((signal.stop_loss - 97.9).abs() < 1e-9);
        assert_eq!(
            signal.reason,
            "Bullish EMA alignment, RSI approaching oversold, MACD bullish confirmation, High volume confirmation"
        );
    }

    #[test]
    fn test_bearish_confluence() {
        let indicators = IndicatorSet {
            ema12: 90.0,
            ema26: 95.0,
            ema50: 100.0,
            rsi: 80.0,
            macd: MacdValue {
                macd: -1.0,
                signal: -0.5,
                histogram: -0.5,
            },
            ..quiet_indicators()
        };
        let candles = flat_candles(50, 100.0);
        let signal =
            synthesize_signal("ETHUSDT", &candles, &indicators, 0.5, Timeframe::OneHour).unwrap();
        assert_eq!(signal.direction, SignalDirection::Sell);
        assert_eq!(signal.confidence, 75);
        assert!((signal.target_price - 97.0).abs() < 1e-9);
        assert!((signal.stop_loss - 102.1).abs() < 1e-9);
    }

    #[test]
    fn test_low_confidence_rejected() {
        let indicators = IndicatorSet {
            volume_profile: 1.0,
            ..bullish_indicators()
        };
        // 25 + 15 + 20 = 60.
        let candles = flat_candles(50, 100.0);
        assert!(synthesize_signal("ETHUSDT", &candles, &indicators, 0.5, Timeframe::OneHour).is_none());
    }

    #[test]
    fn test_no_direction_rejected() {
        let indicators = IndicatorSet {
            volume_profile: 3.0,
            volatility: 10.0,
            ..quiet_indicators()
        };
        // 15 + 10 + 10 with nothing choosing a side.
        let candles = flat_candles(50, 100.0);
        assert!(synthesize_signal("ETHUSDT", &candles, &indicators, 0.1, Timeframe::OneHour).is_none());
    }

    #[test]
    fn test_penalties_apply() {
        let indicators = IndicatorSet {
            volume_profile: 0.4,
            volatility: 150.0,
            ..bullish_indicators()
        };
        // 25 + 15 + 20 - 10 - 15 = 35.
        let candles = flat_candles(50, 100.0);
        assert!(synthesize_signal("ETHUSDT", &candles, &indicators, 0.5, Timeframe::OneHour).is_none());
    }

    #[test]
    fn test_misaligned_momentum_penalized() {
        // Last candle drops 5% against a Buy setup: 75 - 10 = 65, still accepted.
        let mut candles = flat_candles(50, 100.0);
        candles[49] = Candle::new(49 * 60_000, 100.0, 100.0, 95.0, 95.0, 1000.0);
        let signal =
            synthesize_signal("ETHUSDT", &candles, &bullish_indicators(), 0.5, Timeframe::OneHour)
                .unwrap();
        assert_eq!(signal.confidence, 65);
        assert!(signal.reason.ends_with("Momentum against direction"));
    }

    #[test]
    fn test_confidence_capped() {
        let indicators = IndicatorSet {
            rsi: 20.0,
            stochastic: StochasticValue { k: 10.0, d: 15.0 },
            bollinger_bands: BollingerValue {
                upper: 140.0,
                middle: 120.0,
                lower: 99.0,
            },
            volatility: 20.0,
            ..bullish_indicators()
        };
        let candles = flat_candles(50, 100.0);
        let signal =
            synthesize_signal("ETHUSDT", &candles, &indicators, 0.9, Timeframe::FourHours).unwrap();
        assert_eq!(signal.confidence, 95);
    }

    #[test]
    fn test_flat_market_rejected() {
        let candles = flat_candles(60, 100.0);
        let indicators = compute_indicators(&candles);
        assert!(synthesize_signal("ETHUSDT", &candles, &indicators, 0.0, Timeframe::OneHour).is_none());
    }

    #[test]
    fn test_rising_series_keeps_ema_direction() {
        let candles = create_uptrend_candles(60);
        let indicators = compute_indicators(&candles);
        assert!(indicators.ema12 > indicators.ema26 && indicators.ema26 > indicators.ema50);
        assert!(indicators.rsi > 75.0);

        let signal =
            synthesize_signal("ETHUSDT", &candles, &indicators, 0.5, Timeframe::OneHour).unwrap();
        assert_eq!(signal.direction, SignalDirection::Buy);
        assert!(signal.reason.starts_with("Bullish EMA alignment, RSI overbought"));
        assert!(signal.confidence >= 65 && signal.confidence <= 95);
        assert!(signal.target_price > signal.entry_price);
        assert!(signal.entry_price > signal.stop_loss);
    }
}
