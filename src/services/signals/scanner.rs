//! Multi-symbol generation pass.

use crate::config::Config;
use crate::error::AppError;
use crate::services::signals::indicators::{btc_correlation, compute_indicators, support_resistance};
use crate::services::signals::patterns::PatternDetector;
use crate::services::signals::synthesizer::{synthesize_signal, MIN_SYNTHESIS_CANDLES};
use crate::sources::PriceFeed;
use crate::types::{AnalysisMode, Candle, Signal, Timeframe};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Knobs for one generation pass.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub timeframe: Timeframe,
    pub mode: AnalysisMode,
    pub candle_limit: usize,
    /// Pattern floor and post-filter for both modes.
    pub min_confidence: u8,
    pub max_signals: usize,
    pub btc_symbol: String,
    /// Candles mode only: the last N candles may anchor a signal, so old
    /// formations are not entered at stale prices. 0 keeps every anchor.
    pub pattern_lookback: usize,
}

impl ScanSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeframe: config.timeframe,
            mode: config.analysis_mode,
            candle_limit: config.candle_limit,
            min_confidence: config.min_confidence,
            max_signals: config.max_signals,
            btc_symbol: config.btc_symbol.clone(),
            pattern_lookback: config.pattern_lookback,
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Generates signals for a list of symbols from a price feed.
pub struct SignalScanner {
    feed: Arc<dyn PriceFeed>,
    detector: PatternDetector,
    settings: ScanSettings,
}

impl SignalScanner {
    pub fn new(feed: Arc<dyn PriceFeed>, settings: ScanSettings, stable_assets: Vec<String>) -> Self {
        Self {
            feed,
            detector: PatternDetector::new(stable_assets),
            settings,
        }
    }

    pub fn from_config(feed: Arc<dyn PriceFeed>, config: &Config) -> Self {
        Self::new(feed, ScanSettings::from_config(config), config.stable_assets.clone())
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Scan every symbol and return the strongest signals, highest
    /// confidence first. Symbols that fail to load are logged and skipped.
    pub async fn scan(&self, symbols: &[String]) -> Vec<Signal> {
        let settings = &self.settings;
        let btc_candles = match self
            .feed
            .fetch_candles(&settings.btc_symbol, settings.timeframe, settings.candle_limit)
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                warn!(
                    "Could not load {} candles for correlation, assuming none: {}",
                    settings.btc_symbol, e
                );
                Vec::new()
            }
        };

        let mut signals = Vec::new();
        for symbol in symbols {
            match self.scan_symbol(symbol, &btc_candles).await {
                Ok(found) => signals.extend(found),
                Err(e) => warn!("Skipping {}: {}", symbol, e),
            }
        }

        signals.retain(|s| s.confidence >= settings.min_confidence);
        signals.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        signals.truncate(settings.max_signals);

        info!(
            "Scanned {} symbols ({:?}, {}): {} signals",
            symbols.len(),
            settings.mode,
            settings.timeframe,
            signals.len()
        );

        signals
    }

    /// Signals for one symbol, before the pass-wide filter. Fewer than 50
    /// candles yields none.
    pub async fn scan_symbol(
        &self,
        symbol: &str,
        btc_candles: &[Candle],
    ) -> Result<Vec<Signal>, AppError> {
        let settings = &self.settings;
        let candles = if symbol.eq_ignore_ascii_case(&settings.btc_symbol) && !btc_candles.is_empty() {
            btc_candles.to_vec()
        } else {
            self.feed
                .fetch_candles(symbol, settings.timeframe, settings.candle_limit)
                .await?
        };

        if candles.len() < MIN_SYNTHESIS_CANDLES {
            debug!("Skipping {}: only {} candles", symbol, candles.len());
            return Ok(Vec::new());
        }

        let signals = match settings.mode {
            AnalysisMode::Indicators => {
                let indicators = compute_indicators(&candles);
                let correlation = btc_correlation(&candles, btc_candles);
                synthesize_signal(symbol, &candles, &indicators, correlation, settings.timeframe)
                    .into_iter()
                    .collect()
            }
            AnalysisMode::Candles => {
                let first_anchor = match settings.pattern_lookback {
                    0 => 0,
                    lookback => candles.len().saturating_sub(lookback),
                };
                self.detector.detect_from(
                    &candles,
                    symbol,
                    settings.timeframe,
                    settings.min_confidence,
                    first_anchor,
                )
            }
        };

        if !signals.is_empty() {
            let levels = support_resistance(&candles);
            debug!(
                "{}: {} signals, support {:.4}, resistance {:.4}",
                symbol,
                signals.len(),
                levels.support,
                levels.resistance
            );
        }

        Ok(signals)
    }
}
