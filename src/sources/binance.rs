use crate::config::DEFAULT_BINANCE_API_URL;
use crate::error::AppError;
use crate::sources::{FeedFuture, PriceFeed};
use crate::types::{Candle, Timeframe};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Binance caps a single klines request at this many candles.
const MAX_KLINES: usize = 1000;

/// Binance spot price response.
#[derive(Debug, Deserialize)]
struct BinancePrice {
    symbol: String,
    price: String,
}

/// Parse one kline row: `[openTime, open, high, low, close, volume, ...]`
/// with prices encoded as strings.
fn parse_kline(row: &[Value]) -> Option<Candle> {
    let number = |v: &Value| -> Option<f64> {
        match v {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    };

    if row.len() < 6 {
        return None;
    }

    Some(Candle::new(
        row[0].as_i64()?,
        number(&row[1])?,
        number(&row[2])?,
        number(&row[3])?,
        number(&row[4])?,
        number(&row[5])?,
    ))
}

/// Binance REST price feed.
#[derive(Clone)]
pub struct BinanceFeed {
    client: Client,
    base_url: String,
}

/// Per-request ceiling unless the caller picks one.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

impl Default for BinanceFeed {
    fn default() -> Self {
        Self::new(DEFAULT_BINANCE_API_URL)
    }
}

impl BinanceFeed {
    /// Create a new feed against `base_url` (e.g. `https://api.binance.com/api/v3`).
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Like [`BinanceFeed::new`], failing any request that takes longer than `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent("Augur/1.0")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        symbol: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "Binance API returned {} for {}: {}",
                status,
                symbol,
                text.chars().take(200).collect::<String>()
            );
            return Err(AppError::price_fetch(symbol, format!("Binance API error: {}", status)));
        }

        Ok(response.json().await?)
    }

    async fn klines(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, AppError> {
        let url = format!("{}/klines", self.base_url);
        let query = [
            ("symbol", symbol.to_uppercase()),
            ("interval", timeframe.as_str().to_string()),
            ("limit", limit.clamp(1, MAX_KLINES).to_string()),
        ];

        let rows: Vec<Vec<Value>> = self.get_json(symbol, &url, &query).await?;
        let mut candles: Vec<Candle> = rows.iter().filter_map(|row| parse_kline(row)).collect();
        candles.sort_by_key(|c| c.timestamp);
        candles.dedup_by_key(|c| c.timestamp);

        debug!("Binance klines: {} {} -> {} candles", symbol, timeframe, candles.len());
        Ok(candles)
    }

    async fn ticker_price(&self, symbol: &str) -> Result<f64, AppError> {
        let url = format!("{}/ticker/price", self.base_url);
        let query = [("symbol", symbol.to_uppercase())];

        let ticker: BinancePrice = self.get_json(symbol, &url, &query).await?;
        let price: f64 = ticker
            .price
            .parse()
            .map_err(|_| AppError::price_fetch(symbol, format!("unparsable price {:?}", ticker.price)))?;

        if !price.is_finite() || price <= 0.0 {
            return Err(AppError::price_fetch(symbol, format!("invalid price {}", price)));
        }

        debug!("Binance price update: {} = ${}", ticker.symbol, price);
        Ok(price)
    }
}

impl PriceFeed for BinanceFeed {
    fn name(&self) -> &str {
        "binance"
    }

    fn fetch_candles<'a>(
        &'a self,
        symbol: &'a str,
        timeframe: Timeframe,
        limit: usize,
    ) -> FeedFuture<'a, Vec<Candle>> {
        Box::pin(self.klines(symbol, timeframe, limit))
    }

    fn current_price<'a>(&'a self, symbol: &'a str) -> FeedFuture<'a, f64> {
        Box::pin(self.ticker_price(symbol))
    }
}
