//! Candlestick pattern detection.
//!
//! Every rule is evaluated independently at every anchor candle from index 4
//! onward, so a single pass can report several patterns on the same candle.

use crate::config::DEFAULT_STABLE_ASSETS;
use crate::services::signals::geometry::{
    is_stable_asset, pattern_scale, resolve_levels, RiskPercents, STABLE_CAP_PCT,
};
use crate::services::signals::indicators::{closes, volatility, Rsi};
use crate::types::{Candle, IndicatorSet, PatternHit, PatternKind, Signal, Timeframe};
use tracing::debug;

/// Smallest window the detector looks at.
pub const MIN_PATTERN_WINDOW: usize = 5;

/// Two levels are "equal" within this relative tolerance.
const LEVEL_TOLERANCE: f64 = 0.01;
/// Flat side of a triangle, relative to its extreme.
const TRIANGLE_FLATNESS: f64 = 0.005;
/// RSI below this over the trailing 15 closes is an oversold pattern.
const OVERSOLD_RSI: f64 = 10.0;

fn within(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() / a < tolerance
}

fn is_hammer(c: &Candle) -> bool {
    let body = c.body();
    body < c.range() * 0.4 && c.lower_shadow() > body * 2.0 && c.upper_shadow() < body
}

fn is_bullish_engulfing(prev: &Candle, last: &Candle) -> bool {
    prev.is_bearish() && last.is_bullish() && last.open < prev.close && last.close > prev.open
}

fn is_bearish_engulfing(prev: &Candle, last: &Candle) -> bool {
    prev.is_bullish() && last.is_bearish() && last.open > prev.close && last.close < prev.open
}

fn is_doji(c: &Candle) -> bool {
    c.body() < c.range() * 0.1
}

/// Highs 4 and 2 candles back match each other and the current high.
fn is_double_top(window: &[Candle]) -> bool {
    let (h1, h2, now) = (window[0].high, window[2].high, window[4].high);
    within(h1, h2, LEVEL_TOLERANCE) && within(h2, now, LEVEL_TOLERANCE)
}

fn is_double_bottom(window: &[Candle]) -> bool {
    let (l1, l2, now) = (window[0].low, window[2].low, window[4].low);
    within(l1, l2, LEVEL_TOLERANCE) && within(l2, now, LEVEL_TOLERANCE)
}

/// Flat highs with rising lows across the 5-candle window.
fn is_ascending_triangle(window: &[Candle]) -> bool {
    let max_high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let min_high = window.iter().map(|c| c.high).fold(f64::INFINITY, f64::min);
    max_high - min_high < max_high * TRIANGLE_FLATNESS
        && window[4].low > window[0].low
        && window[3].low > window[1].low
}

/// Flat lows with falling highs across the 5-candle window.
fn is_descending_triangle(window: &[Candle]) -> bool {
    let max_low = window.iter().map(|c| c.low).fold(f64::NEG_INFINITY, f64::max);
    let min_low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    max_low - min_low < max_low * TRIANGLE_FLATNESS
        && window[4].high < window[0].high
        && window[3].high < window[1].high
}

/// Patterns completed by the candle at `index` (requires `index >= 4`).
fn hits_at(candles: &[Candle], index: usize) -> Vec<PatternHit> {
    let last = &candles[index];
    let prev = &candles[index - 1];
    let window = &candles[index - 4..=index];
    let mut kinds = Vec::new();

    if is_hammer(last) {
        kinds.push(PatternKind::Hammer);
    }
    if is_bullish_engulfing(prev, last) {
        kinds.push(PatternKind::BullishEngulfing);
    }
    if is_bearish_engulfing(prev, last) {
        kinds.push(PatternKind::BearishEngulfing);
    }
    if is_double_top(window) {
        kinds.push(PatternKind::DoubleTop);
    }
    if is_double_bottom(window) {
        kinds.push(PatternKind::DoubleBottom);
    }
    if is_ascending_triangle(window) {
        kinds.push(PatternKind::AscendingTriangle);
    }
    if is_descending_triangle(window) {
        kinds.push(PatternKind::DescendingTriangle);
    }
    if index >= 14 {
        let trailing = closes(&candles[index - 14..=index]);
        if Rsi::default().calculate(&trailing) < OVERSOLD_RSI {
            kinds.push(PatternKind::OversoldRsi);
        }
    }
    if is_doji(last) {
        kinds.push(PatternKind::Doji);
    }

    kinds
        .into_iter()
        .map(|kind| PatternHit::new(kind, index))
        .collect()
}

/// Scan a candle window for every pattern occurrence, oldest anchor first.
/// Windows shorter than 5 candles yield nothing.
pub fn detect_pattern_hits(candles: &[Candle]) -> Vec<PatternHit> {
    if candles.len() < MIN_PATTERN_WINDOW {
        return Vec::new();
    }

    (MIN_PATTERN_WINDOW - 1..candles.len())
        .flat_map(|index| hits_at(candles, index))
        .collect()
}

/// Turns pattern hits into signals.
pub struct PatternDetector {
    stable_assets: Vec<String>,
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new(DEFAULT_STABLE_ASSETS.iter().map(|s| s.to_string()).collect())
    }
}

impl PatternDetector {
    pub fn new(stable_assets: Vec<String>) -> Self {
        Self { stable_assets }
    }

    /// Emit one signal per directional hit whose base confidence reaches
    /// `confidence_floor`. Entry is the anchor candle's close.
    pub fn detect(
        &self,
        candles: &[Candle],
        symbol: &str,
        timeframe: Timeframe,
        confidence_floor: u8,
    ) -> Vec<Signal> {
        self.detect_from(candles, symbol, timeframe, confidence_floor, 0)
    }

    /// Like [`PatternDetector::detect`], but only hits anchored at
    /// `first_anchor` or later become signals. Earlier candles still feed
    /// the rules and the risk scaling.
    pub fn detect_from(
        &self,
        candles: &[Candle],
        symbol: &str,
        timeframe: Timeframe,
        confidence_floor: u8,
        first_anchor: usize,
    ) -> Vec<Signal> {
        let hits: Vec<PatternHit> = detect_pattern_hits(candles)
            .into_iter()
            .filter(|hit| hit.anchor_index >= first_anchor)
            .collect();
        if hits.is_empty() {
            return Vec::new();
        }

        let mut risk =
            RiskPercents::for_timeframe(timeframe, volatility(candles)).scaled(pattern_scale(candles));
        if is_stable_asset(symbol, &self.stable_assets) {
            risk = risk.capped(STABLE_CAP_PCT);
        }

        let mut signals = Vec::new();
        for hit in hits {
            let Some(direction) = hit.direction else {
                continue;
            };
            if hit.base_confidence < confidence_floor {
                continue;
            }

            let entry_price = candles[hit.anchor_index].close;
            let Some(levels) = resolve_levels(direction, entry_price, risk) else {
                debug!(
                    "Discarding {} on {} at candle {}: invalid target/stop",
                    hit.kind.name(),
                    symbol,
                    hit.anchor_index
                );
                continue;
            };

            signals.push(Signal::new(
                symbol.to_string(),
                direction,
                entry_price,
                levels.target_price,
                levels.stop_loss,
                hit.base_confidence,
                timeframe,
                IndicatorSet::neutral(entry_price),
                0.0,
                format!("Candle pattern detected: {}", hit.kind.name()),
            ));
        }

        debug!(
            "Pattern scan of {} ({} candles) produced {} signals",
            symbol,
            candles.len(),
            signals.len()
        );

        signals
    }
}

/// Pattern-driven signal generation with the default stable-asset list.
pub fn detect_patterns(
    candles: &[Candle],
    symbol: &str,
    timeframe: Timeframe,
    confidence_floor: u8,
) -> Vec<Signal> {
    PatternDetector::default().detect(candles, symbol, timeframe, confidence_floor)
}
