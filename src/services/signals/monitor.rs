//! Signal lifecycle monitor.
//!
//! Tracks signals from creation to resolution. Each tick snapshots the open
//! signals, fetches one price per symbol concurrently and resolves signals
//! whose target or stop was crossed. A symbol whose price cannot be fetched
//! within the price timeout is skipped for that tick. Operator changes (track, activate, override,
//! untrack) may land at any time; a tick never overwrites a status that
//! became terminal while its prices were in flight.

use crate::error::AppError;
use crate::services::signals::performance::performance_stats;
use crate::sources::PriceFeed;
use crate::types::{PerformanceStats, Signal, SignalStatus};
use dashmap::DashMap;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{interval, timeout, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Longest wait for one symbol's price before it counts as failed.
pub const DEFAULT_PRICE_TIMEOUT: Duration = Duration::from_secs(10);

/// Advance every open signal against `price_lookup`.
///
/// Returns the signals in input order. Win/Loss signals and signals whose
/// symbol has no price are returned unchanged.
pub fn tick<F>(signals: &[Signal], price_lookup: F) -> Vec<Signal>
where
    F: Fn(&str) -> Option<f64>,
{
    signals
        .iter()
        .map(|signal| {
            let mut signal = signal.clone();
            if signal.status.is_terminal() {
                return signal;
            }
            if let Some(status) = price_lookup(&signal.symbol).and_then(|price| signal.resolve(price)) {
                signal.status = status;
            }
            signal
        })
        .collect()
}

/// A status change applied by a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub id: Uuid,
    pub symbol: String,
    pub from: SignalStatus,
    pub to: SignalStatus,
    pub price: f64,
}

/// Outcome of one monitor tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Distinct symbols queried.
    pub symbols_checked: usize,
    /// Symbols whose price fetch failed.
    pub failed_symbols: Vec<String>,
    pub transitions: Vec<Transition>,
}

/// Owns the tracked signal set.
pub struct SignalMonitor {
    feed: Arc<dyn PriceFeed>,
    tracked: DashMap<Uuid, Signal>,
    price_timeout: Duration,
    /// Held for the whole tick so ticks never overlap.
    tick_lock: Mutex<()>,
}

impl SignalMonitor {
    pub fn new(feed: Arc<dyn PriceFeed>) -> Arc<Self> {
        Self::with_price_timeout(feed, DEFAULT_PRICE_TIMEOUT)
    }

    pub fn with_price_timeout(feed: Arc<dyn PriceFeed>, price_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            feed,
            tracked: DashMap::new(),
            price_timeout,
            tick_lock: Mutex::new(()),
        })
    }

    /// Start tracking a signal as Pending. Returns false if its id is
    /// already tracked, leaving the existing entry untouched.
    pub fn track(&self, mut signal: Signal) -> bool {
        if self.tracked.contains_key(&signal.id) {
            return false;
        }
        signal.status = SignalStatus::Pending;
        debug!("Tracking {} signal {} on {}", signal.direction.label(), signal.id, signal.symbol);
        self.tracked.insert(signal.id, signal);
        true
    }

    /// Move a Pending signal to Active.
    pub fn activate(&self, id: Uuid) -> Result<Signal, AppError> {
        let mut entry = self
            .tracked
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("signal {}", id)))?;

        if entry.status != SignalStatus::Pending {
            return Err(AppError::BadRequest(format!(
                "signal {} is {:?}, only pending signals can be activated",
                id, entry.status
            )));
        }
        entry.status = SignalStatus::Active;
        info!("Signal {} on {} activated", id, entry.symbol);
        Ok(entry.clone())
    }

    /// Operator override; accepted from any status, regardless of price.
    pub fn set_status(&self, id: Uuid, status: SignalStatus) -> Result<Signal, AppError> {
        let mut entry = self
            .tracked
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("signal {}", id)))?;

        info!("Signal {} on {} manually set {:?} -> {:?}", id, entry.symbol, entry.status, status);
        entry.status = status;
        Ok(entry.clone())
    }

    pub fn untrack(&self, id: Uuid) -> Option<Signal> {
        self.tracked.remove(&id).map(|(_, signal)| signal)
    }

    pub fn get(&self, id: Uuid) -> Option<Signal> {
        self.tracked.get(&id).map(|s| s.value().clone())
    }

    /// All tracked signals, oldest first.
    pub fn signals(&self) -> Vec<Signal> {
        let mut signals: Vec<Signal> = self.tracked.iter().map(|s| s.value().clone()).collect();
        signals.sort_by_key(|s| s.created_at);
        signals
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn performance(&self) -> PerformanceStats {
        performance_stats(&self.signals())
    }

    /// Run one price check over the open signals.
    pub async fn tick(&self) -> TickReport {
        let _guard = self.tick_lock.lock().await;

        let snapshot: Vec<Signal> = self
            .tracked
            .iter()
            .filter(|s| !s.status.is_terminal())
            .map(|s| s.value().clone())
            .collect();

        let mut symbols: Vec<String> = snapshot.iter().map(|s| s.symbol.clone()).collect();
        symbols.sort();
        symbols.dedup();

        let fetches = symbols.iter().map(|symbol| async move {
            let result = match timeout(self.price_timeout, self.feed.current_price(symbol)).await {
                Ok(result) => result,
                Err(_) => Err(AppError::price_fetch(
                    symbol,
                    format!("no answer within {:?}", self.price_timeout),
                )),
            };
            (symbol.as_str(), result)
        });

        let mut report = TickReport {
            symbols_checked: symbols.len(),
            ..TickReport::default()
        };
        let mut prices: HashMap<&str, f64> = HashMap::new();
        for (symbol, result) in join_all(fetches).await {
            match result {
                Ok(price) => {
                    prices.insert(symbol, price);
                }
                Err(e) => {
                    warn!("Price check failed for {} via {}: {}", symbol, self.feed.name(), e);
                    report.failed_symbols.push(symbol.to_string());
                }
            }
        }

        let updated = tick(&snapshot, |symbol| prices.get(symbol).copied());
        for (before, after) in snapshot.iter().zip(updated) {
            if before.status == after.status {
                continue;
            }
            // Skip signals untracked or resolved by an operator meanwhile.
            let Some(mut entry) = self.tracked.get_mut(&after.id) else {
                continue;
            };
            if entry.status.is_terminal() {
                continue;
            }

            let price = prices.get(after.symbol.as_str()).copied().unwrap_or_default();
            info!(
                "Signal {} on {}: {:?} -> {:?} at {}",
                after.id, after.symbol, entry.status, after.status, price
            );
            report.transitions.push(Transition {
                id: after.id,
                symbol: after.symbol.clone(),
                from: entry.status,
                to: after.status,
                price,
            });
            entry.status = after.status;
        }

        debug!(
            "Monitor tick: {} symbols checked, {} failed, {} transitions",
            report.symbols_checked,
            report.failed_symbols.len(),
            report.transitions.len()
        );

        report
    }

    /// Tick every `period` until `shutdown` fires. A tick still waiting on
    /// prices when shutdown arrives is dropped before it changes anything.
    pub async fn run(&self, period: Duration, mut shutdown: broadcast::Receiver<()>) {
        info!("Signal monitor started, tick interval {:?}", period);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = self.tick() => {}
                        _ = shutdown.recv() => {
                            info!("Signal monitor received shutdown signal mid-tick");
                            break;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Signal monitor received shutdown signal");
                    break;
                }
            }
        }
    }
}
