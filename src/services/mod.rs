pub mod signals;

pub use signals::{PatternDetector, ScanSettings, SignalMonitor, SignalScanner};
