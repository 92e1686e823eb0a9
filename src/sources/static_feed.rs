//! In-memory price feed.
//!
//! Serves whatever candles and prices were last stored, so generation passes
//! and monitor ticks can run against fixed data without touching the network.

use crate::error::AppError;
use crate::sources::{FeedFuture, PriceFeed};
use crate::types::{Candle, Timeframe};
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// A [`PriceFeed`] backed by maps keyed on upper-cased symbol.
#[derive(Default)]
pub struct StaticFeed {
    candles: DashMap<String, Vec<Candle>>,
    prices: DashMap<String, f64>,
    failing: DashSet<String>,
    stalled: DashSet<String>,
    price_delay_ms: AtomicU64,
    price_requests: AtomicUsize,
}

impl StaticFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_candles(&self, symbol: &str, candles: Vec<Candle>) {
        self.candles.insert(symbol.to_uppercase(), candles);
    }

    pub fn set_price(&self, symbol: &str, price: f64) {
        self.prices.insert(symbol.to_uppercase(), price);
    }

    /// Make every request for `symbol` fail until [`StaticFeed::recover`].
    pub fn fail(&self, symbol: &str) {
        self.failing.insert(symbol.to_uppercase());
    }

    pub fn recover(&self, symbol: &str) {
        self.failing.remove(&symbol.to_uppercase());
    }

    /// Make `current_price` for `symbol` hang forever, like an exchange
    /// that accepted the connection and never answered.
    pub fn stall(&self, symbol: &str) {
        self.stalled.insert(symbol.to_uppercase());
    }

    /// Delay every `current_price` answer by `delay`.
    pub fn set_price_delay(&self, delay: Duration) {
        self.price_delay_ms
            .store(delay.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of `current_price` calls served so far, failures included.
    pub fn price_requests(&self) -> usize {
        self.price_requests.load(Ordering::Relaxed)
    }

    fn check(&self, symbol: &str) -> Result<String, AppError> {
        let key = symbol.to_uppercase();
        if self.failing.contains(&key) {
            return Err(AppError::price_fetch(symbol, "feed unavailable"));
        }
        Ok(key)
    }
}

impl PriceFeed for StaticFeed {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_candles<'a>(
        &'a self,
        symbol: &'a str,
        _timeframe: Timeframe,
        limit: usize,
    ) -> FeedFuture<'a, Vec<Candle>> {
        Box::pin(async move {
            let key = self.check(symbol)?;
            let candles = self
                .candles
                .get(&key)
                .map(|c| c.value().clone())
                .ok_or_else(|| AppError::NotFound(format!("no candles for {}", symbol)))?;
            let skip = candles.len().saturating_sub(limit);
            Ok(candles[skip..].to_vec())
        })
    }

    fn current_price<'a>(&'a self, symbol: &'a str) -> FeedFuture<'a, f64> {
        Box::pin(async move {
            self.price_requests.fetch_add(1, Ordering::Relaxed);
            if self.stalled.contains(&symbol.to_uppercase()) {
                std::future::pending::<()>().await;
            }
            let delay = self.price_delay_ms.load(Ordering::Relaxed);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            let key = self.check(symbol)?;
            self.prices
                .get(&key)
                .map(|p| *p.value())
                .ok_or_else(|| AppError::NotFound(format!("no price for {}", symbol)))
        })
    }
}
