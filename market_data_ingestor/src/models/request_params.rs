use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Parameters for requesting daily bars of one symbol from any market data provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBarsRequest {
    /// Short exchange code (e.g., "005930").
    pub symbol: String,

    /// First trading day to include (inclusive).
    pub start: NaiveDate,

    /// Last trading day to include (inclusive).
    pub end: NaiveDate,
}

impl DailyBarsRequest {
    pub fn new(symbol: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            start,
            end,
        }
    }

    /// Providers reject ranges whose start lies after their end.
    pub fn is_valid_range(&self) -> bool {
        self.start <= self.end
    }
}

/// Parses a `YYYYMMDD` date, the format every command line in the workspace accepts.
pub fn parse_compact_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if raw.len() != 8 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("expected a date as YYYYMMDD, got {raw:?}"));
    }
    NaiveDate::parse_from_str(raw, "%Y%m%d").map_err(|e| format!("invalid date {raw:?}: {e}"))
}
