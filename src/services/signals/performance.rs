//! Win/loss statistics over tracked signals.

use crate::types::{PerformanceStats, Signal, SignalStatus};

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Aggregate outcomes. Win rate is over every signal given, open ones
/// included; gains are expected gains of wins and losses are stop
/// distances of losses, both in percent.
pub fn performance_stats(signals: &[Signal]) -> PerformanceStats {
    let gains: Vec<f64> = signals
        .iter()
        .filter(|s| s.status == SignalStatus::Win)
        .map(|s| s.expected_gain)
        .collect();
    let losses: Vec<f64> = signals
        .iter()
        .filter(|s| s.status == SignalStatus::Loss)
        .map(|s| s.risk_pct())
        .collect();

    let total = signals.len();
    let win_rate = if total > 0 {
        gains.len() as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    PerformanceStats {
        total_signals: total as u32,
        wins: gains.len() as u32,
        losses: losses.len() as u32,
        win_rate,
        total_profit: gains.iter().sum::<f64>() - losses.iter().sum::<f64>(),
        avg_gain: mean(&gains),
        avg_loss: mean(&losses),
    }
}
