//! Deterministic in-memory provider for tests. Counts every call it receives.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};

use crate::market_data::{PriceBar, PriceSeries, SymbolMetadata};
use crate::provider::MarketDataProvider;

pub const FIXTURE_SUMMARY: &str = "Apple Inc. designs, manufactures, and markets smartphones.";
pub const FIXTURE_LOGO: &str = "https://logo.clearbit.com/apple.com";

#[derive(Default)]
pub struct FixtureProvider {
    history_calls: AtomicUsize,
    metadata_calls: AtomicUsize,
    fail_history: bool,
    fail_metadata: bool,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every history request fails as if the transport had gone away.
    pub fn failing_history() -> Self {
        Self {
            fail_history: true,
            ..Self::default()
        }
    }

    pub fn failing_metadata() -> Self {
        Self {
            fail_metadata: true,
            ..Self::default()
        }
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.history_calls() + self.metadata_calls()
    }

    /// Closing price the fixture reports for `date`.
    pub fn close_on(date: NaiveDate) -> f64 {
        100.0 + date.ordinal() as f64
    }
}

fn is_trading_day(date: NaiveDate) -> bool {
    // Weekends plus the New Year's Day holiday observed in 2023.
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
        && date != NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default()
}

#[async_trait]
impl MarketDataProvider for FixtureProvider {
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_history {
            anyhow::bail!("connection refused");
        }
        if symbol != "AAPL" {
            return Ok(PriceSeries::empty());
        }

        let bars = start
            .iter_days()
            .take_while(|d| *d < end)
            .filter(|d| is_trading_day(*d))
            .map(|date| {
                let close = Self::close_on(date);
                PriceBar {
                    date,
                    open: close - 1.0,
                    high: close + 2.0,
                    low: close - 2.0,
                    close,
                    volume: 1_000_000.0 + date.day() as f64,
                }
            })
            .collect();
        Ok(PriceSeries::new(bars))
    }

    async fn fetch_metadata(&self, symbol: &str) -> Result<SymbolMetadata> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_metadata {
            anyhow::bail!("quoteSummary returned 401 Unauthorized");
        }
        if symbol != "AAPL" {
            return Ok(SymbolMetadata::default());
        }
        Ok(SymbolMetadata {
            summary: Some(FIXTURE_SUMMARY.to_string()),
            logo_url: Some(FIXTURE_LOGO.to_string()),
        })
    }
}
