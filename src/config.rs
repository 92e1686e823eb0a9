use crate::types::{AnalysisMode, Timeframe};
use std::env;

/// Default Binance REST endpoint.
pub const DEFAULT_BINANCE_API_URL: &str = "https://api.binance.com/api/v3";

/// Pegged-value base assets whose target and stop are capped.
pub const DEFAULT_STABLE_ASSETS: &[&str] = &["USDT", "USDC", "BUSD", "TUSD", "FDUSD", "USDP", "DAI"];

const DEFAULT_SYMBOLS: &[&str] = &["BTCUSDT", "ETHUSDT", "SOLUSDT", "BNBUSDT", "XRPUSDT"];

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Binance REST base URL.
    pub binance_api_url: String,
    /// Pairs scanned on each generation pass.
    pub symbols: Vec<String>,
    /// Pair used as the correlation benchmark.
    pub btc_symbol: String,
    /// Candle timeframe for generation.
    pub timeframe: Timeframe,
    /// Indicator confluence or candle patterns.
    pub analysis_mode: AnalysisMode,
    /// Candles requested per symbol.
    pub candle_limit: usize,
    /// Minimum confidence kept by a generation pass (also the pattern floor).
    pub min_confidence: u8,
    /// Maximum signals kept per generation pass.
    pub max_signals: usize,
    /// Lifecycle monitor tick interval (ms).
    pub monitor_interval_ms: u64,
    /// Longest wait for one price answer, for monitor ticks and HTTP calls (ms).
    pub price_timeout_ms: u64,
    /// Only the last N candles may anchor a pattern signal; 0 means all.
    pub pattern_lookback: usize,
    /// Stable base assets (e.g. `USDC`).
    pub stable_assets: Vec<String>,
}

/// Split a comma-separated list into trimmed, upper-cased, non-empty items.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup. Missing or unparsable values
    /// fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let symbols = lookup("SCAN_SYMBOLS")
            .map(|s| parse_list(&s))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect());

        let stable_assets = lookup("STABLE_ASSETS")
            .map(|s| parse_list(&s))
            .unwrap_or_else(|| DEFAULT_STABLE_ASSETS.iter().map(|s| s.to_string()).collect());

        Self {
            binance_api_url: lookup("BINANCE_API_URL")
                .unwrap_or_else(|| DEFAULT_BINANCE_API_URL.to_string()),
            symbols,
            btc_symbol: lookup("BTC_SYMBOL")
                .map(|s| s.trim().to_uppercase())
                .unwrap_or_else(|| "BTCUSDT".to_string()),
            timeframe: lookup("TIMEFRAME")
                .and_then(|v| Timeframe::from_str(v.trim()))
                .unwrap_or_default(),
            analysis_mode: lookup("ANALYSIS_MODE")
                .and_then(|v| AnalysisMode::from_str(v.trim()))
                .unwrap_or_default(),
            candle_limit: lookup("CANDLE_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            min_confidence: lookup("MIN_CONFIDENCE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            max_signals: lookup("MAX_SIGNALS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            monitor_interval_ms: lookup("MONITOR_INTERVAL_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5_000),
            price_timeout_ms: lookup("PRICE_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(10_000),
            pattern_lookback: lookup("PATTERN_LOOKBACK")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            stable_assets,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
