//! Augur - rule-based crypto trading signal engine

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

// Re-export commonly used types
pub use types::*;
pub use services::signals::{
    compute_indicators, detect_patterns, synthesize_signal, tick, SignalMonitor, SignalScanner,
};
pub use sources::{BinanceFeed, PriceFeed, StaticFeed};
