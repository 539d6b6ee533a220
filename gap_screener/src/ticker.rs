use std::fmt;

use market_data_ingestor::models::asset::{Market, TickerListing};

use crate::{
    report::ReportRow,
    series::{PriceSeries, SeriesError},
};

/// Trading days looked back for turnover and surge checks.
pub const LOOKBACK_DAYS: usize = 30;

pub const CONDITION_1_MIN_GAP: f64 = 4.0;
pub const CONDITION_1_SURGE_RATE: f64 = 15.0;
pub const CONDITION_1_SURGE_VALUE: u64 = 50_000_000_000;
pub const CONDITION_1_SPIKE_RATE: f64 = 30.0;
pub const CONDITION_1_SPIKE_VALUE: u64 = 20_000_000_000;

pub const CONDITION_2_MIN_GAP: f64 = 3.0;
pub const CONDITION_2_MIN_VALUE: u64 = 20_000_000_000;

/// Which report a ticker lands in. Condition 1 wins when both hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Condition1,
    Condition2,
    Unmatched,
}

/// A listed equity together with its price history over the run's window.
#[derive(Debug, Clone)]
pub struct Ticker {
    pub symbol: String,
    pub name: String,
    pub market: Market,
    series: PriceSeries,
}

impl Ticker {
    pub fn new(listing: TickerListing, series: PriceSeries) -> Self {
        Self {
            symbol: listing.symbol,
            name: listing.name,
            market: listing.market,
            series,
        }
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    /// Gapped up at least 4% after a 15% day on 50bn KRW or a 30% day on 20bn KRW within
    /// the last 30 trading days.
    pub fn is_condition_1(&self) -> Result<bool, SeriesError> {
        if !self.series.is_gap_rate_over(CONDITION_1_MIN_GAP)? {
            return Ok(false);
        }
        if self.series.has_rate_and_trade_value_over_in_days(
            CONDITION_1_SURGE_RATE,
            CONDITION_1_SURGE_VALUE,
            LOOKBACK_DAYS,
        )? {
            return Ok(true);
        }
        self.series.has_rate_and_trade_value_over_in_days(
            CONDITION_1_SPIKE_RATE,
            CONDITION_1_SPIKE_VALUE,
            LOOKBACK_DAYS,
        )
    }

    /// Gapped up at least 3%, traded 20bn KRW on some day of the last 30 and sits in
    /// regular arrangement.
    pub fn is_condition_2(&self) -> Result<bool, SeriesError> {
        Ok(self.series.is_gap_rate_over(CONDITION_2_MIN_GAP)?
            && self
                .series
                .has_trade_value_over_in_days(CONDITION_2_MIN_VALUE, LOOKBACK_DAYS)?
            && self.series.is_in_regular_arrangement()?)
    }

    pub fn classify(&self) -> Result<Classification, SeriesError> {
        if self.is_condition_1()? {
            Ok(Classification::Condition1)
        } else if self.is_condition_2()? {
            Ok(Classification::Condition2)
        } else {
            Ok(Classification::Unmatched)
        }
    }

    /// Today's report line. `date_label` is written verbatim into the date column.
    pub fn report_row(&self, date_label: &str) -> Result<ReportRow, SeriesError> {
        let today = self.series.last_bar();
        let previous = self.series.previous_bar()?;

        Ok(ReportRow {
            date: date_label.to_string(),
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            market: self.market,
            previous_close: previous.map(|bar| bar.close),
            open: today.map(|bar| bar.open),
            gap_rate: self.series.last_gap_rate()?,
            high: today.map(|bar| bar.high),
            high_rate: self.series.last_high_rate(),
            low: today.map(|bar| bar.low),
            low_rate: self.series.last_low_rate(),
        })
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.symbol, self.name, self.market)
    }
}
