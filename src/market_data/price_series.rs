use chrono::NaiveDate;

use crate::types::Indicator;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single daily OHLCV record for one trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Value of the column named by `indicator`.
    pub fn field(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::Open => self.open,
            Indicator::High => self.high,
            Indicator::Low => self.low,
            Indicator::Close => self.close,
            Indicator::Volume => self.volume,
        }
    }
}

// ---------------------------------------------------------------------------
// PriceSeries -- date-ordered daily table
// ---------------------------------------------------------------------------

/// Daily price table for one symbol, ordered by strictly increasing date.
///
/// Non-trading days are simply absent; nothing is gap-filled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from bars in any order.
    ///
    /// Bars are sorted by date and, when two bars share a date, the one that
    /// came later in `bars` wins.
    pub fn new(mut bars: Vec<PriceBar>) -> Self {
        // Stable sort keeps input order among equal dates.
        bars.sort_by_key(|b| b.date);

        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self { bars: deduped }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// The shared time axis.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// One column of the table, aligned with [`PriceSeries::dates`].
    pub fn column(&self, indicator: Indicator) -> Vec<f64> {
        self.bars.iter().map(|b| b.field(indicator)).collect()
    }
}

// ---------------------------------------------------------------------------
// SymbolMetadata
// ---------------------------------------------------------------------------

/// Descriptive information about a ticker. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolMetadata {
    pub summary: Option<String>,
    pub logo_url: Option<String>,
}
