//! Raw response shapes of the KRX JSON endpoint and their conversion into canonical models.
//!
//! Every numeric field arrives as a display string (`"71,200"`, `"-1.23"`, `"-"`), so all
//! parsing happens here, once.

use chrono::NaiveDate;
use serde::Deserialize;
use snafu::OptionExt;

use crate::{
    models::{
        asset::{Market, TickerListing},
        bar::DailyBar,
    },
    providers::{InternalSnafu, ProviderError},
};

/// One row of the listing dataset.
#[derive(Deserialize, Debug, Clone)]
pub struct KrxListingRow {
    /// Full ISIN (e.g., "KR7005930003").
    #[serde(rename = "ISU_CD")]
    pub isin: String,
    #[serde(rename = "ISU_SRT_CD")]
    pub short_code: String,
    #[serde(rename = "ISU_ABBRV")]
    pub abbreviation: String,
}

/// One row of the single-issue daily price dataset.
#[derive(Deserialize, Debug, Clone)]
pub struct KrxOhlcvRow {
    #[serde(rename = "TRD_DD")]
    pub trade_date: String,
    #[serde(rename = "TDD_OPNPRC")]
    pub open: String,
    #[serde(rename = "TDD_HGPRC")]
    pub high: String,
    #[serde(rename = "TDD_LWPRC")]
    pub low: String,
    #[serde(rename = "TDD_CLSPRC")]
    pub close: String,
    #[serde(rename = "ACC_TRDVOL")]
    pub volume: String,
    #[serde(rename = "ACC_TRDVAL")]
    pub trade_value: String,
    #[serde(rename = "FLUC_RT")]
    pub fluctuation_rate: String,
}

/// One row of the index daily dataset; only the date matters for the calendar.
#[derive(Deserialize, Debug, Clone)]
pub struct KrxIndexRow {
    #[serde(rename = "TRD_DD")]
    pub trade_date: String,
}

/// One row of the issue finder.
#[derive(Deserialize, Debug, Clone)]
pub struct KrxFinderRow {
    pub full_code: String,
    pub short_code: String,
}

/// Envelope shared by the data sets. The portal names the row array `output`,
/// `OutBlock_1` or `block1` depending on the dataset.
#[derive(Deserialize, Debug)]
pub struct KrxResponse<T> {
    #[serde(default = "Vec::new", alias = "output", alias = "OutBlock_1", alias = "block1")]
    pub rows: Vec<T>,
}

/// Parses an integer display string. `"-"` and empty strings mean "no value" and read as 0.
pub fn parse_krx_int(raw: &str) -> Result<i64, ProviderError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() || cleaned == "-" {
        return Ok(0);
    }
    cleaned.parse::<i64>().ok().context(InternalSnafu {
        message: format!("not an integer: {raw:?}"),
    })
}

pub fn parse_krx_unsigned(raw: &str) -> Result<u64, ProviderError> {
    let value = parse_krx_int(raw)?;
    u64::try_from(value).ok().context(InternalSnafu {
        message: format!("negative quantity: {raw:?}"),
    })
}

pub fn parse_krx_rate(raw: &str) -> Result<f64, ProviderError> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() || cleaned == "-" {
        return Ok(0.0);
    }
    cleaned.parse::<f64>().ok().context(InternalSnafu {
        message: format!("not a rate: {raw:?}"),
    })
}

/// Trade dates arrive as `YYYY/MM/DD`.
pub fn parse_krx_date(raw: &str) -> Result<NaiveDate, ProviderError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y/%m/%d")
        .ok()
        .context(InternalSnafu {
            message: format!("not a trade date: {raw:?}"),
        })
}

impl KrxOhlcvRow {
    pub fn into_bar(self) -> Result<DailyBar, ProviderError> {
        Ok(DailyBar {
            date: parse_krx_date(&self.trade_date)?,
            open: parse_krx_int(&self.open)?,
            high: parse_krx_int(&self.high)?,
            low: parse_krx_int(&self.low)?,
            close: parse_krx_int(&self.close)?,
            volume: parse_krx_unsigned(&self.volume)?,
            trade_value: parse_krx_unsigned(&self.trade_value)?,
            day_rate: parse_krx_rate(&self.fluctuation_rate)?,
        })
    }
}

impl KrxListingRow {
    pub fn into_listing(self, market: Market) -> TickerListing {
        TickerListing {
            symbol: self.short_code.trim().to_string(),
            name: self.abbreviation.trim().to_string(),
            market,
        }
    }
}
