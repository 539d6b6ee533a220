//! A collection of daily bars for a specific symbol.

use crate::models::bar::DailyBar;

/// Represents a complete set of daily bars for a single symbol.
///
/// Bars are kept in the order the source produced them; use [`BarSeries::sort_by_date`]
/// when a stable ascending order is required (the cache writer does).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "005930").
    pub symbol: String,
    /// The collection of daily bars.
    pub bars: Vec<DailyBar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<DailyBar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    /// An empty series, used when a fetch failed and the caller degrades to "no data".
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn sort_by_date(&mut self) {
        self.bars.sort_by_key(|bar| bar.date);
    }
}
