// =============================================================================
// Market Data Provider — the dashboard's only external collaborator
// =============================================================================
//
// The dashboard never talks to a vendor directly. It holds an
// `Arc<dyn MarketDataProvider>` and asks it for two things: the daily price
// table for a date range, and descriptive metadata for the symbol. Tests swap
// in a deterministic fixture provider instead of the live Yahoo client.
// =============================================================================

pub mod yahoo;

#[cfg(test)]
pub mod fixture;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::market_data::{PriceSeries, SymbolMetadata};

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily OHLCV for `symbol` from `start` (inclusive) to `end` (exclusive).
    ///
    /// An unknown symbol or an empty range is an empty series, not an error.
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries>;

    /// Business summary and logo for `symbol`.
    async fn fetch_metadata(&self, symbol: &str) -> Result<SymbolMetadata>;
}

pub use yahoo::YahooClient;
