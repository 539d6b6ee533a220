//! On-disk cache of fetched daily bars.
//!
//! One CSV file per (symbol, date range) under a cache directory. The header uses the
//! Korean column names the exchange publishes (`날짜,시가,고가,저가,종가,거래량,거래대금,등락률`)
//! and dates are written as `YYYY-MM-DD`; both are part of the persisted format, so a
//! file written by [`CsvBarCache::store`] always reads back to identical bars.

use std::{fs, path::PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    errors::Error,
    models::{bar::DailyBar, bar_series::BarSeries, request_params::DailyBarsRequest},
};

/// Identifies one cached fetch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BarCacheKey {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BarCacheKey {
    pub fn new(symbol: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            start,
            end,
        }
    }

    /// `<symbol>_<start YYYYMMDD>_<end YYYYMMDD>.csv`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}.csv",
            self.symbol,
            self.start.format("%Y%m%d"),
            self.end.format("%Y%m%d")
        )
    }
}

impl From<&DailyBarsRequest> for BarCacheKey {
    fn from(params: &DailyBarsRequest) -> Self {
        Self::new(params.symbol.clone(), params.start, params.end)
    }
}

/// Read/write access to previously fetched bars.
pub trait BarCache: Send + Sync {
    /// Returns the cached series, or `None` when nothing was stored under `key`.
    fn load(&self, key: &BarCacheKey) -> Result<Option<BarSeries>, Error>;

    /// Stores `series` under `key`, replacing any previous entry.
    fn store(&self, key: &BarCacheKey, series: &BarSeries) -> Result<(), Error>;
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedBarRow {
    #[serde(rename = "날짜")]
    date: NaiveDate,
    #[serde(rename = "시가")]
    open: i64,
    #[serde(rename = "고가")]
    high: i64,
    #[serde(rename = "저가")]
    low: i64,
    #[serde(rename = "종가")]
    close: i64,
    #[serde(rename = "거래량")]
    volume: u64,
    #[serde(rename = "거래대금")]
    trade_value: u64,
    #[serde(rename = "등락률")]
    day_rate: f64,
}

/// Column order of the cache file.
pub const BAR_CACHE_HEADER: [&str; 8] = [
    "날짜", "시가", "고가", "저가", "종가", "거래량", "거래대금", "등락률",
];

impl From<&DailyBar> for CachedBarRow {
    fn from(bar: &DailyBar) -> Self {
        Self {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            trade_value: bar.trade_value,
            day_rate: bar.day_rate,
        }
    }
}

impl From<CachedBarRow> for DailyBar {
    fn from(row: CachedBarRow) -> Self {
        Self {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            trade_value: row.trade_value,
            day_rate: row.day_rate,
        }
    }
}

/// File-backed [`BarCache`] writing one CSV per key into `dir`.
#[derive(Clone, Debug)]
pub struct CsvBarCache {
    dir: PathBuf,
}

impl CsvBarCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &BarCacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl BarCache for CsvBarCache {
    fn load(&self, key: &BarCacheKey) -> Result<Option<BarSeries>, Error> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let headers = reader.headers()?.clone();
        if headers.iter().ne(BAR_CACHE_HEADER.iter().copied()) {
            return Err(Error::Cache {
                path,
                message: format!("unexpected header: {headers:?}"),
            });
        }

        let mut bars = Vec::new();
        for row in reader.deserialize::<CachedBarRow>() {
            bars.push(DailyBar::from(row?));
        }
        debug!(symbol = %key.symbol, path = %path.display(), bars = bars.len(), "bar cache hit");
        Ok(Some(BarSeries::new(key.symbol.clone(), bars)))
    }

    fn store(&self, key: &BarCacheKey, series: &BarSeries) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Write next to the target and rename, so a crash never leaves a truncated entry.
        let tmp = path.with_extension("csv.tmp");

        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp)?;
            writer.write_record(BAR_CACHE_HEADER)?;
            let mut sorted = series.clone();
            sorted.sort_by_date();
            for bar in &sorted.bars {
                writer.serialize(CachedBarRow::from(bar))?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp, &path)?;
        debug!(symbol = %key.symbol, path = %path.display(), "bar cache stored");
        Ok(())
    }
}
