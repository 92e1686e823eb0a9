//! Trading signal engine.
//!
//! Indicator computation, candlestick pattern detection, confluence
//! scoring and the lifecycle monitor that resolves signals against live
//! prices.

pub mod geometry;
pub mod indicators;
pub mod monitor;
pub mod patterns;
pub mod performance;
pub mod scanner;
pub mod synthesizer;

pub use indicators::compute_indicators;
pub use monitor::{tick, SignalMonitor, TickReport, Transition};
pub use patterns::{detect_pattern_hits, detect_patterns, PatternDetector};
pub use performance::performance_stats;
pub use scanner::{ScanSettings, SignalScanner};
pub use synthesizer::synthesize_signal;
