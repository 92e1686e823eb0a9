use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Timeframe;

/// Trade direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalDirection {
    Buy,
    Sell,
}

impl SignalDirection {
    /// Get display label for this direction.
    pub fn label(&self) -> &'static str {
        match self {
            SignalDirection::Buy => "Buy",
            SignalDirection::Sell => "Sell",
        }
    }

    /// +1 for Buy, -1 for Sell.
    pub fn sign(&self) -> f64 {
        match self {
            SignalDirection::Buy => 1.0,
            SignalDirection::Sell => -1.0,
        }
    }
}

/// Lifecycle status of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStatus {
    /// Created, not yet resolved.
    #[default]
    Pending,
    /// An operator is actively following the signal.
    Active,
    /// Target reached.
    Win,
    /// Stop reached.
    Loss,
}

impl SignalStatus {
    /// Win and Loss are never changed by price checks.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SignalStatus::Win | SignalStatus::Loss)
    }
}

/// Stochastic oscillator reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticValue {
    pub k: f64,
    pub d: f64,
}

/// Bollinger band levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// MACD line, signal line and histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Snapshot of every indicator computed for one candle sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    pub ema12: f64,
    pub ema26: f64,
    pub ema50: f64,
    pub rsi: f64,
    pub stochastic: StochasticValue,
    pub bollinger_bands: BollingerValue,
    pub macd: MacdValue,
    /// Annualized volatility, percent.
    pub volatility: f64,
    /// Last volume over trailing 10-candle mean.
    pub volume_profile: f64,
}

impl IndicatorSet {
    /// Flat placeholder set centered on `price`, attached to pattern-driven
    /// signals which are not derived from indicators.
    pub fn neutral(price: f64) -> Self {
        Self {
            ema12: price,
            ema26: price,
            ema50: price,
            rsi: 50.0,
            stochastic: StochasticValue { k: 50.0, d: 50.0 },
            bollinger_bands: BollingerValue {
                upper: price,
                middle: price,
                lower: price,
            },
            macd: MacdValue {
                macd: 0.0,
                signal: 0.0,
                histogram: 0.0,
            },
            volatility: 0.0,
            volume_profile: 1.0,
        }
    }
}

/// Named chart formation recognized by the pattern detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Hammer,
    BullishEngulfing,
    BearishEngulfing,
    DoubleTop,
    DoubleBottom,
    AscendingTriangle,
    DescendingTriangle,
    OversoldRsi,
    Doji,
}

impl PatternKind {
    /// Get display name for this pattern.
    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::Hammer => "Hammer",
            PatternKind::BullishEngulfing => "Bullish Engulfing",
            PatternKind::BearishEngulfing => "Bearish Engulfing",
            PatternKind::DoubleTop => "Double Top",
            PatternKind::DoubleBottom => "Double Bottom",
            PatternKind::AscendingTriangle => "Ascending Triangle",
            PatternKind::DescendingTriangle => "Descending Triangle",
            PatternKind::OversoldRsi => "Oversold RSI",
            PatternKind::Doji => "Doji",
        }
    }

    /// Direction implied by the pattern. Doji is informational only.
    pub fn direction(&self) -> Option<SignalDirection> {
        match self {
            PatternKind::Hammer
            | PatternKind::BullishEngulfing
            | PatternKind::DoubleBottom
            | PatternKind::AscendingTriangle
            | PatternKind::OversoldRsi => Some(SignalDirection::Buy),
            PatternKind::BearishEngulfing
            | PatternKind::DoubleTop
            | PatternKind::DescendingTriangle => Some(SignalDirection::Sell),
            PatternKind::Doji => None,
        }
    }

    /// Default confidence assigned to a hit.
    pub fn base_confidence(&self) -> u8 {
        match self {
            PatternKind::Hammer => 65,
            PatternKind::BullishEngulfing | PatternKind::BearishEngulfing => 70,
            PatternKind::DoubleTop | PatternKind::DoubleBottom => 80,
            PatternKind::AscendingTriangle | PatternKind::DescendingTriangle => 75,
            PatternKind::OversoldRsi => 60,
            PatternKind::Doji => 50,
        }
    }
}

/// One pattern occurrence in a candle sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternHit {
    pub kind: PatternKind,
    pub direction: Option<SignalDirection>,
    /// Index of the candle that completes the pattern.
    pub anchor_index: usize,
    pub base_confidence: u8,
}

impl PatternHit {
    pub fn new(kind: PatternKind, anchor_index: usize) -> Self {
        Self {
            kind,
            direction: kind.direction(),
            anchor_index,
            base_confidence: kind.base_confidence(),
        }
    }
}

/// A scored trade recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    /// Unique signal ID.
    pub id: Uuid,
    /// Exchange pair, e.g. `ETHUSDT`.
    pub symbol: String,
    pub direction: SignalDirection,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    /// 0-95.
    pub confidence: u8,
    /// Distance to target as a percentage of entry.
    pub expected_gain: f64,
    pub timeframe: Timeframe,
    /// Unix timestamp (milliseconds) when generated.
    pub created_at: i64,
    pub indicators: IndicatorSet,
    /// In [-1, 1].
    pub btc_correlation: f64,
    /// Human-readable rationale.
    pub reason: String,
    pub status: SignalStatus,
}

impl Signal {
    /// Create a new pending signal stamped with the current time.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: String,
        direction: SignalDirection,
        entry_price: f64,
        target_price: f64,
        stop_loss: f64,
        confidence: u8,
        timeframe: Timeframe,
        indicators: IndicatorSet,
        btc_correlation: f64,
        reason: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol,
            direction,
            entry_price,
            target_price,
            stop_loss,
            confidence,
            expected_gain: ((target_price - entry_price) / entry_price * 100.0).abs(),
            timeframe,
            created_at: chrono::Utc::now().timestamp_millis(),
            indicators,
            btc_correlation,
            reason,
            status: SignalStatus::Pending,
        }
    }

    /// Stop distance as a percentage of entry.
    pub fn risk_pct(&self) -> f64 {
        ((self.stop_loss - self.entry_price) / self.entry_price * 100.0).abs()
    }

    /// Status a live price resolves this signal to, if it crosses target or stop.
    pub fn resolve(&self, price: f64) -> Option<SignalStatus> {
        match self.direction {
            SignalDirection::Buy => {
                if price >= self.target_price {
                    Some(SignalStatus::Win)
                } else if price <= self.stop_loss {
                    Some(SignalStatus::Loss)
                } else {
                    None
                }
            }
            SignalDirection::Sell => {
                if price <= self.target_price {
                    Some(SignalStatus::Win)
                } else if price >= self.stop_loss {
                    Some(SignalStatus::Loss)
                } else {
                    None
                }
            }
        }
    }
}

/// Nearest support and resistance levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
}

/// Which engine path a generation pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Confluence scoring over the indicator set.
    #[default]
    Indicators,
    /// Candlestick pattern detection.
    Candles,
}

impl AnalysisMode {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "indicators" | "indicator" => Some(Self::Indicators),
            "candles" | "candle" | "patterns" => Some(Self::Candles),
            _ => None,
        }
    }
}

/// Win/loss statistics over a set of tracked signals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub total_signals: u32,
    pub wins: u32,
    pub losses: u32,
    /// Wins as a percentage of all tracked signals.
    pub win_rate: f64,
    /// Sum of winning gains minus losing stops, percent.
    pub total_profit: f64,
    pub avg_gain: f64,
    pub avg_loss: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy_signal() -> Signal {
        Signal::new(
            "ETHUSDT".to_string(),
            SignalDirection::Buy,
            100.0,
            102.0,
            98.0,
            70,
            Timeframe::OneHour,
            IndicatorSet::neutral(100.0),
            0.0,
            String::new(),
        )
    }

    #[test]
    fn test_new_signal_is_pending_with_expected_gain() {
        let signal = buy_signal();
        assert_eq!(signal.status, SignalStatus::Pending);
        assert!((signal.expected_gain - 2.0).abs() < 1e-9);
        assert!((signal.risk_pct() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_buy() {
        let signal = buy_signal();
        assert_eq!(signal.resolve(102.5), Some(SignalStatus::Win));
        assert_eq!(signal.resolve(102.0), Some(SignalStatus::Win));
        assert_eq!(signal.resolve(97.9), Some(SignalStatus::Loss));
        assert_eq!(signal.resolve(100.5), None);
    }

    #[test]
    fn test_resolve_sell() {
        let mut signal = buy_signal();
        signal.direction = SignalDirection::Sell;
        signal.target_price = 98.0;
        signal.stop_loss = 102.0;
        assert_eq!(signal.resolve(97.0), Some(SignalStatus::Win));
        assert_eq!(signal.resolve(102.0), Some(SignalStatus::Loss));
        assert_eq!(signal.resolve(99.0), None);
    }

    #[test]
    fn test_pattern_kind_metadata() {
        assert_eq!(PatternKind::Doji.direction(), None);
        assert_eq!(PatternKind::DoubleTop.direction(), Some(SignalDirection::Sell));
        assert_eq!(PatternKind::DoubleTop.base_confidence(), 80);
        assert_eq!(PatternKind::OversoldRsi.base_confidence(), 60);
        let hit = PatternHit::new(PatternKind::Hammer, 7);
        assert_eq!(hit.direction, Some(SignalDirection::Buy));
        assert_eq!(hit.base_confidence, 65);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(SignalStatus::Win.is_terminal());
        assert!(SignalStatus::Loss.is_terminal());
        assert!(!SignalStatus::Pending.is_terminal());
        assert!(!SignalStatus::Active.is_terminal());
    }

    #[test]
    fn test_signal_serializes_camel_case() {
        let json = serde_json::to_value(buy_signal()).unwrap();
        assert_eq!(json["direction"], "BUY");
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["timeframe"], "1h");
        assert!(json.get("targetPrice").is_some());
        assert!(json["indicators"].get("volumeProfile").is_some());
    }
}
