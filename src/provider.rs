//! Market data access contract.

use crate::error::Result;
use crate::types::{Candle, MarketMeta, Ticker};
use async_trait::async_trait;
use std::collections::HashMap;

/// Injected market data source.
///
/// Implemented by the host application for a concrete exchange or feed;
/// the engine never names one. All methods may fail with
/// [`EngineError::Provider`](crate::error::EngineError::Provider); the
/// scanner isolates such failures per symbol, single-symbol flows
/// surface them to the caller.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch metadata for every tradable symbol.
    async fn fetch_markets(&self) -> Result<HashMap<String, MarketMeta>>;

    /// Fetch the current ticker for one symbol.
    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker>;

    /// Fetch tickers for every symbol in one call.
    async fn fetch_tickers(&self) -> Result<HashMap<String, Ticker>>;

    /// Fetch up to `limit` candles for a symbol and timeframe, oldest
    /// first, optionally starting at `since` (milliseconds).
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: &str,
        since: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Candle>>;
}
