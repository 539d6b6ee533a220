//! Canonical in-memory representation of a daily bar (OHLCV).
//!
//! This struct is the standard output for all [`DataProvider`](crate::providers::DataProvider)
//! implementations and the row type of the on-disk bar cache.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single trading day's OHLCV record for one symbol.
///
/// Prices are whole currency units (KRW has no minor unit on the exchange).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    /// The trading day this bar covers (exchange-local calendar date).
    pub date: NaiveDate,

    /// Opening price.
    pub open: i64,

    /// Highest price of the session.
    pub high: i64,

    /// Lowest price of the session.
    pub low: i64,

    /// Closing price.
    pub close: i64,

    /// Shares traded during the session.
    pub volume: u64,

    /// Traded value in currency units (price x volume, summed per trade).
    pub trade_value: u64,

    /// Close-to-close fluctuation rate in percent, as published by the provider.
    pub day_rate: f64,
}
