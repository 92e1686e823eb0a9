//! Target and stop derivation.
//!
//! Both the indicator-driven synthesizer and the pattern detector turn a
//! direction and an entry price into target/stop levels here. Percentages
//! come from the timeframe risk table plus a volatility increment; pattern
//! signals are further scaled by candle size and volume, and stable assets
//! are capped.

use crate::types::{Candle, SignalDirection, Timeframe};
use tracing::debug;

/// Target and stop must each sit at least this fraction away from entry.
pub const MIN_DISTANCE_PCT: f64 = 0.005;

/// Flat target/stop used when derived levels break the ordering invariant.
pub const FALLBACK_PCT: f64 = 0.02;

/// Cap applied to target and stop of stable assets.
pub const STABLE_CAP_PCT: f64 = 0.02;

/// Quote currencies recognized when splitting a pair into base/quote.
const QUOTE_ASSETS: &[&str] = &[
    "USDT", "FDUSD", "USDC", "BUSD", "TUSD", "USD", "DAI", "EUR", "TRY", "BRL", "BTC", "ETH",
    "BNB",
];

/// Target and stop distances as fractions of entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskPercents {
    pub target: f64,
    pub stop: f64,
}

impl RiskPercents {
    /// Timeframe base plus `min(volatility / 50, 2)` × 0.005 on the target
    /// and × 0.003 on the stop.
    pub fn for_timeframe(timeframe: Timeframe, volatility: f64) -> Self {
        let (base_target, base_stop) = timeframe.risk_params();
        let volatility = if volatility.is_finite() {
            volatility.max(0.0)
        } else {
            0.0
        };
        let volatility_multiplier = (volatility / 50.0).min(2.0);

        Self {
            target: base_target + volatility_multiplier * 0.005,
            stop: base_stop + volatility_multiplier * 0.003,
        }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self {
            target: self.target * factor,
            stop: self.stop * factor,
        }
    }

    pub fn capped(self, cap: f64) -> Self {
        Self {
            target: self.target.min(cap),
            stop: self.stop.min(cap),
        }
    }
}

/// Resolved price levels for a trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeLevels {
    pub target_price: f64,
    pub stop_loss: f64,
}

/// Size/volume scaling for pattern signals:
/// `1 + 0.2 × size + 0.1 × volume`, where size is the mean candle range over
/// 1% of the first close and volume is the mean volume over the first
/// candle's volume, each capped at 3.
pub fn pattern_scale(window: &[Candle]) -> f64 {
    let Some(first) = window.first() else {
        return 1.0;
    };
    let n = window.len() as f64;

    let avg_range = window.iter().map(|c| c.range()).sum::<f64>() / n;
    let size_multiplier = if first.close > 0.0 {
        (avg_range / (first.close * 0.01)).min(3.0)
    } else {
        0.0
    };

    let avg_volume = window.iter().map(|c| c.volume).sum::<f64>() / n;
    let volume_multiplier = if first.volume > 0.0 {
        (avg_volume / first.volume).min(3.0)
    } else {
        1.0
    };

    1.0 + 0.2 * size_multiplier + 0.1 * volume_multiplier
}

/// Whether a pair's base asset is one of the configured stable assets.
pub fn is_stable_asset(symbol: &str, stable_assets: &[String]) -> bool {
    let symbol = symbol.to_uppercase();
    stable_assets.iter().any(|asset| {
        let asset = asset.to_uppercase();
        match symbol.strip_prefix(asset.as_str()) {
            Some("") => true,
            Some(quote) => QUOTE_ASSETS.contains(&quote),
            None => false,
        }
    })
}

/// Target/stop ordering: Buy needs target > entry > stop, Sell needs
/// stop > entry > target, and every level must be a positive price.
pub fn is_ordered(direction: SignalDirection, entry: f64, target: f64, stop: f64) -> bool {
    let finite = entry.is_finite() && target.is_finite() && stop.is_finite();
    let positive = entry > 0.0 && target > 0.0 && stop > 0.0;
    let ordered = match direction {
        SignalDirection::Buy => target > entry && entry > stop,
        SignalDirection::Sell => stop > entry && entry > target,
    };
    finite && positive && ordered
}

fn apply(direction: SignalDirection, entry: f64, risk: RiskPercents) -> TradeLevels {
    let sign = direction.sign();
    TradeLevels {
        target_price: entry * (1.0 + sign * risk.target),
        stop_loss: entry * (1.0 - sign * risk.stop),
    }
}

/// Turn risk percentages into price levels.
///
/// Levels that break the ordering invariant are corrected to a flat ±2%.
/// Levels that are still unordered, or that sit within 0.5% of entry, are
/// rejected with `None`.
pub fn resolve_levels(
    direction: SignalDirection,
    entry: f64,
    risk: RiskPercents,
) -> Option<TradeLevels> {
    let mut levels = apply(direction, entry, risk);

    if !is_ordered(direction, entry, levels.target_price, levels.stop_loss) {
        debug!(
            "Target/stop out of order for entry {} ({:?}), falling back to ±{}%",
            entry,
            risk,
            FALLBACK_PCT * 100.0
        );
        levels = apply(
            direction,
            entry,
            RiskPercents {
                target: FALLBACK_PCT,
                stop: FALLBACK_PCT,
            },
        );
        if !is_ordered(direction, entry, levels.target_price, levels.stop_loss) {
            return None;
        }
    }

    let min_distance = entry * MIN_DISTANCE_PCT;
    if (levels.target_price - entry).abs() < min_distance
        || (levels.stop_loss - entry).abs() < min_distance
    {
        debug!("Target/stop within {}% of entry {}, rejecting", MIN_DISTANCE_PCT * 100.0, entry);
        return None;
    }

    Some(levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stable() -> Vec<String> {
        vec!["USDC".to_string(), "DAI".to_string()]
    }

    #[test]
    fn test_risk_percents_without_volatility() {
        let risk = RiskPercents::for_timeframe(Timeframe::OneHour, 0.0);
        assert_eq!(risk, RiskPercents { target: 0.025, stop: 0.018 });
    }

    #[test]
    fn test_volatility_increment_is_capped() {
        let risk = RiskPercents::for_timeframe(Timeframe::OneMinute, 500.0);
        assert!((risk.target - 0.02).abs() < 1e-12);
        assert!((risk.stop - 0.014).abs() < 1e-12);

        let half = RiskPercents::for_timeframe(Timeframe::OneMinute, 25.0);
        assert!((half.target - 0.0125).abs() < 1e-12);
    }

    #[test]
    fn test_buy_levels() {
        let levels = resolve_levels(
            SignalDirection::Buy,
            100.0,
            RiskPercents { target: 0.03, stop: 0.02 },
        )
        .unwrap();
        assert!((levels.target_price - 103.0).abs() < 1e-9);
        assert!((levels.stop_loss - 98.0).abs() < 1e-9);
    }

    #[test]
    fn test_sell_levels() {
        let levels = resolve_levels(
            SignalDirection::Sell,
            100.0,
            RiskPercents { target: 0.03, stop: 0.02 },
        )
        .unwrap();
        assert!((levels.target_price - 97.0).abs() < 1e-9);
        assert!((levels.stop_loss - 102.0).abs() < 1e-9);
    }

    #[test]
    fn test_unordered_levels_are_corrected() {
        // A target beyond 100% drives a Sell target negative.
        let levels = resolve_levels(
            SignalDirection::Sell,
            100.0,
            RiskPercents { target: 1.5, stop: 0.02 },
        )
        .unwrap();
        assert!((levels.target_price - 98.0).abs() < 1e-9);
        assert!((levels.stop_loss - 102.0).abs() < 1e-9);

        // Negative percentages invert a Buy.
        let levels = resolve_levels(
            SignalDirection::Buy,
            100.0,
            RiskPercents { target: -0.05, stop: 0.03 },
        )
        .unwrap();
        assert!((levels.target_price - 102.0).abs() < 1e-9);
        assert!((levels.stop_loss - 98.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_close_levels_are_rejected() {
        let risk = RiskPercents { target: 0.004, stop: 0.02 };
        assert_eq!(resolve_levels(SignalDirection::Buy, 100.0, risk), None);

        let risk = RiskPercents { target: 0.02, stop: 0.001 };
        assert_eq!(resolve_levels(SignalDirection::Sell, 100.0, risk), None);
    }

    #[test]
    fn test_invalid_entry_is_rejected() {
        let risk = RiskPercents { target: 0.02, stop: 0.02 };
        assert_eq!(resolve_levels(SignalDirection::Buy, 0.0, risk), None);
        assert_eq!(resolve_levels(SignalDirection::Buy, f64::NAN, risk), None);
    }

    #[test]
    fn test_pattern_scale() {
        // Range 2 on a first close of 100 is 2× the 1% unit; volumes double.
        let window = vec![
            Candle::new(0, 100.0, 101.0, 99.0, 100.0, 10.0),
            Candle::new(1, 100.0, 101.0, 99.0, 100.0, 30.0),
        ];
        let scale = pattern_scale(&window);
        assert!((scale - (1.0 + 0.2 * 2.0 + 0.1 * 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_pattern_scale_caps() {
        let window = vec![
            Candle::new(0, 100.0, 150.0, 50.0, 100.0, 1.0),
            Candle::new(1, 100.0, 150.0, 50.0, 100.0, 1000.0),
        ];
        assert!((pattern_scale(&window) - 1.9).abs() < 1e-12);
    }

    #[test]
    fn test_pattern_scale_zero_first_volume() {
        let window = vec![Candle::new(0, 100.0, 100.0, 100.0, 100.0, 0.0)];
        assert!((pattern_scale(&window) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_stable_asset_detection() {
        assert!(is_stable_asset("USDCUSDT", &stable()));
        assert!(is_stable_asset("daiusdt", &stable()));
        assert!(is_stable_asset("USDC", &stable()));
        assert!(!is_stable_asset("ETHUSDT", &stable()));
        assert!(!is_stable_asset("USDCXUSDT", &stable()));
    }

    #[test]
    fn test_default_stable_assets_cover_tether() {
        let defaults: Vec<String> = crate::config::DEFAULT_STABLE_ASSETS
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(is_stable_asset("USDTTRY", &defaults));
        assert!(is_stable_asset("USDTBRL", &defaults));
        assert!(is_stable_asset("FDUSDUSDT", &defaults));
        assert!(!is_stable_asset("ETHUSDT", &defaults));
        assert!(!is_stable_asset("BTCUSDT", &defaults));
    }

    #[test]
    fn test_capped() {
        let risk = RiskPercents { target: 0.05, stop: 0.01 }.capped(STABLE_CAP_PCT);
        assert_eq!(risk, RiskPercents { target: 0.02, stop: 0.01 });
    }
}
