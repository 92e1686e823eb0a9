//! Market data sources.
//!
//! The engine never talks to an exchange directly; it is handed a
//! [`PriceFeed`] so tests can substitute a fake.

pub mod binance;
pub mod static_feed;

pub use binance::BinanceFeed;
pub use static_feed::StaticFeed;

use std::future::Future;
use std::pin::Pin;

use crate::error::AppError;
use crate::types::{Candle, Timeframe};

/// Boxed future returned by [`PriceFeed`] methods.
pub type FeedFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'a>>;

/// Candle and spot price provider.
pub trait PriceFeed: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Up to `limit` candles for `symbol`, ascending by timestamp.
    fn fetch_candles<'a>(
        &'a self,
        symbol: &'a str,
        timeframe: Timeframe,
        limit: usize,
    ) -> FeedFuture<'a, Vec<Candle>>;

    /// Latest traded price for `symbol`.
    fn current_price<'a>(&'a self, symbol: &'a str) -> FeedFuture<'a, f64>;
}
