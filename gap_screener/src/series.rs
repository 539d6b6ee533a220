//! Date-indexed daily price history of one ticker.
//!
//! A [`PriceSeries`] is built from a requested window of trading days, newest first, and
//! whatever bars the data source had for them. Index `n` of the window is "today minus
//! `n` trading days"; every query below is phrased in those offsets.
//!
//! Two kinds of "no answer" are kept apart:
//! - a day with no bar yields `None` from the query that needed it;
//! - an offset that leaves the window yields [`SeriesError::OffsetOutOfRange`]. That is a
//!   window sized too small for the question, and is never turned into `None`.

use std::collections::HashMap;

use chrono::NaiveDate;
use market_data_ingestor::models::bar::DailyBar;
use thiserror::Error;
use tracing::debug;

/// Minimum number of bars before moving-average ordering is considered at all.
pub const REGULAR_ARRANGEMENT_MIN_BARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("invalid date window for {symbol}: {reason}")]
    InvalidWindow { symbol: String, reason: String },

    #[error("{date} is not part of the date window of {symbol}")]
    DateNotInWindow { symbol: String, date: NaiveDate },

    #[error("offset {offset} from {date} leaves the {len}-day window of {symbol}")]
    OffsetOutOfRange {
        symbol: String,
        date: NaiveDate,
        offset: usize,
        len: usize,
    },

    #[error("moving average over zero days")]
    ZeroDayAverage,
}

/// Rounds to two decimals the way the value prints, so `x.xx5` ties follow the decimal
/// expansion of the stored float rather than `x * 100` drift.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Percentage change from `base` to `value`, rounded to two decimals.
///
/// A zero base has no defined change and yields `None`. The exchange reports halted
/// sessions with zero open, high and low.
fn percent_change(value: i64, base: i64) -> Option<f64> {
    if base == 0 {
        return None;
    }
    Some(round2((value - base) as f64 / base as f64 * 100.0))
}

#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    /// Requested trading days, strictly descending. Never empty.
    dates: Vec<NaiveDate>,
    positions: HashMap<NaiveDate, usize>,
    /// Sparse: only days the source had data for.
    bars: HashMap<NaiveDate, DailyBar>,
}

impl PriceSeries {
    /// Indexes `fetched` against the requested window.
    ///
    /// Requested days without a fetched bar are logged and left empty; fetched bars outside
    /// the window are ignored.
    pub fn new(
        symbol: impl Into<String>,
        dates: Vec<NaiveDate>,
        fetched: impl IntoIterator<Item = DailyBar>,
    ) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if dates.is_empty() {
            return Err(SeriesError::InvalidWindow {
                symbol,
                reason: "no dates requested".to_string(),
            });
        }
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] <= pair[1]) {
            return Err(SeriesError::InvalidWindow {
                reason: format!("{} does not precede {}", pair[1], pair[0]),
                symbol,
            });
        }

        let positions: HashMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(idx, date)| (*date, idx)).collect();

        let mut available: HashMap<NaiveDate, DailyBar> = fetched
            .into_iter()
            .filter(|bar| positions.contains_key(&bar.date))
            .map(|bar| (bar.date, bar))
            .collect();

        let mut bars = HashMap::with_capacity(available.len());
        for date in &dates {
            match available.remove(date) {
                Some(bar) => {
                    bars.insert(*date, bar);
                }
                None => debug!(symbol = %symbol, %date, "no price for requested date"),
            }
        }

        Ok(Self {
            symbol,
            dates,
            positions,
            bars,
        })
    }

    /// The requested window, newest first.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of days that actually have a bar.
    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    /// Oldest requested day.
    pub fn first_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// Newest requested day ("today").
    pub fn last_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn bar(&self, date: NaiveDate) -> Option<&DailyBar> {
        self.bars.get(&date)
    }

    /// The day `offset` trading days before `date` within the window.
    pub fn date_offset_by(&self, date: NaiveDate, offset: usize) -> Result<NaiveDate, SeriesError> {
        let idx = *self
            .positions
            .get(&date)
            .ok_or_else(|| SeriesError::DateNotInWindow {
                symbol: self.symbol.clone(),
                date,
            })?;

        idx.checked_add(offset)
            .and_then(|target| self.dates.get(target))
            .copied()
            .ok_or_else(|| SeriesError::OffsetOutOfRange {
                symbol: self.symbol.clone(),
                date,
                offset,
                len: self.dates.len(),
            })
    }

    pub fn last_bar(&self) -> Option<&DailyBar> {
        self.bar(self.last_date())
    }

    pub fn previous_bar(&self) -> Result<Option<&DailyBar>, SeriesError> {
        let previous = self.date_offset_by(self.last_date(), 1)?;
        Ok(self.bar(previous))
    }

    /// Close-to-close change into `date`, in percent.
    pub fn day_rate(&self, date: NaiveDate) -> Result<Option<f64>, SeriesError> {
        let previous = self.date_offset_by(date, 1)?;
        Ok(match (self.bar(date), self.bar(previous)) {
            (Some(bar), Some(prev)) => percent_change(bar.close, prev.close),
            _ => None,
        })
    }

    /// Previous close to `date`'s open, in percent.
    pub fn gap_rate(&self, date: NaiveDate) -> Result<Option<f64>, SeriesError> {
        let previous = self.date_offset_by(date, 1)?;
        Ok(match (self.bar(date), self.bar(previous)) {
            (Some(bar), Some(prev)) => percent_change(bar.open, prev.close),
            _ => None,
        })
    }

    pub fn last_gap_rate(&self) -> Result<Option<f64>, SeriesError> {
        self.gap_rate(self.last_date())
    }

    /// True iff today's gap rate exists and is at least `threshold`.
    pub fn is_gap_rate_over(&self, threshold: f64) -> Result<bool, SeriesError> {
        Ok(self
            .last_gap_rate()?
            .is_some_and(|rate| rate >= threshold))
    }

    /// Today's high relative to today's open, in percent.
    pub fn last_high_rate(&self) -> Option<f64> {
        self.last_bar()
            .and_then(|bar| percent_change(bar.high, bar.open))
    }

    /// Today's low relative to today's open, in percent.
    pub fn last_low_rate(&self) -> Option<f64> {
        self.last_bar().and_then(|bar| percent_change(bar.low, bar.open))
    }

    /// Window days `0..=days`, newest first.
    fn trailing_dates(&self, days: usize) -> Result<&[NaiveDate], SeriesError> {
        self.date_offset_by(self.last_date(), days)?;
        Ok(&self.dates[..=days])
    }

    /// Bars of window days `0..=days`, newest first.
    fn trailing_bars(&self, days: usize) -> Result<impl Iterator<Item = &DailyBar>, SeriesError> {
        Ok(self
            .trailing_dates(days)?
            .iter()
            .filter_map(|date| self.bar(*date)))
    }

    /// Whether any bar from `days` trading days ago through today traded at least
    /// `threshold` in value.
    pub fn has_trade_value_over_in_days(
        &self,
        threshold: u64,
        days: usize,
    ) -> Result<bool, SeriesError> {
        Ok(self
            .trailing_bars(days)?
            .any(|bar| bar.trade_value >= threshold))
    }

    /// Whether any day from `days` trading days ago through today closed at least
    /// `rate_threshold` percent up while trading at least `value_threshold` in value.
    /// Days without a rate or a bar are skipped.
    pub fn has_rate_and_trade_value_over_in_days(
        &self,
        rate_threshold: f64,
        value_threshold: u64,
        days: usize,
    ) -> Result<bool, SeriesError> {
        for date in self.trailing_dates(days)? {
            let Some(rate) = self.day_rate(*date)? else {
                continue;
            };
            let Some(bar) = self.bar(*date) else {
                continue;
            };
            if rate >= rate_threshold && bar.trade_value >= value_threshold {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Mean close of the `day` trading days before today.
    ///
    /// The bars of window days `0..=day` are taken newest first and the first one present
    /// is dropped. The sum is always divided by `day`, however many bars were found, so
    /// sparse histories average low.
    pub fn moving_average(&self, day: usize) -> Result<f64, SeriesError> {
        if day == 0 {
            return Err(SeriesError::ZeroDayAverage);
        }
        let sum: i64 = self.trailing_bars(day)?.skip(1).map(|bar| bar.close).sum();
        Ok(round2(sum as f64 / day as f64))
    }

    /// MA5 > MA20 > MA60 > MA120, given at least 120 bars.
    pub fn is_in_regular_arrangement(&self) -> Result<bool, SeriesError> {
        if self.bar_count() < REGULAR_ARRANGEMENT_MIN_BARS {
            return Ok(false);
        }
        let ma5 = self.moving_average(5)?;
        let ma20 = self.moving_average(20)?;
        let ma60 = self.moving_average(60)?;
        let ma120 = self.moving_average(120)?;
        Ok(ma5 > ma20 && ma20 > ma60 && ma60 > ma120)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Days;
    use proptest::prelude::*;

    /// `len` consecutive calendar days ending 2024-06-28, newest first.
    pub(crate) fn window(len: usize) -> Vec<NaiveDate> {
        let today = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        (0..len)
            .map(|n| today.checked_sub_days(Days::new(n as u64)).unwrap())
            .collect()
    }

    pub(crate) fn bar(date: NaiveDate, open: i64, close: i64, trade_value: u64) -> DailyBar {
        DailyBar {
            date,
            open,
            high: open.max(close) + 100,
            low: open.min(close) - 100,
            close,
            volume: 10_000,
            trade_value,
            day_rate: 0.0,
        }
    }

    fn flat_series(len: usize, close: i64) -> PriceSeries {
        let dates = window(len);
        let bars: Vec<_> = dates.iter().map(|d| bar(*d, close, close, 1_000)).collect();
        PriceSeries::new("TEST", dates, bars).unwrap()
    }

    #[test]
    fn window_must_be_strictly_descending() {
        let mut dates = window(3);
        dates.reverse();
        let err = PriceSeries::new("TEST", dates, vec![]).unwrap_err();
        assert!(matches!(err, SeriesError::InvalidWindow { .. }));

        let mut dup = window(2);
        dup.push(dup[1]);
        assert!(PriceSeries::new("TEST", dup, vec![]).is_err());
        assert!(PriceSeries::new("TEST", vec![], vec![]).is_err());
    }

    #[test]
    fn missing_dates_are_dropped_not_synthesized() {
        let dates = window(5);
        let bars = vec![bar(dates[0], 100, 100, 1), bar(dates[3], 100, 100, 1)];
        let series = PriceSeries::new("TEST", dates.clone(), bars).unwrap();

        assert_eq!(series.bar_count(), 2);
        assert!(series.bar(dates[1]).is_none());
        assert_eq!(series.first_date(), dates[4]);
        assert_eq!(series.last_date(), dates[0]);
    }

    #[test]
    fn bars_outside_window_are_ignored() {
        let dates = window(3);
        let outside = dates[2].pred_opt().unwrap();
        let series =
            PriceSeries::new("TEST", dates, vec![bar(outside, 1, 1, 1)]).unwrap();
        assert_eq!(series.bar_count(), 0);
    }

    #[test]
    fn offset_is_index_based_and_fails_past_the_window() {
        let series = flat_series(4, 100);
        let dates = series.dates().to_vec();

        assert_eq!(series.date_offset_by(dates[0], 3).unwrap(), dates[3]);
        assert_eq!(series.date_offset_by(dates[1], 0).unwrap(), dates[1]);
        assert!(matches!(
            series.date_offset_by(dates[1], 3),
            Err(SeriesError::OffsetOutOfRange { offset: 3, len: 4, .. })
        ));
        let stranger = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert!(matches!(
            series.date_offset_by(stranger, 0),
            Err(SeriesError::DateNotInWindow { .. })
        ));
    }

    #[test]
    fn day_rate_and_gap_rate_round_to_two_decimals() {
        let dates = window(3);
        let bars = vec![
            bar(dates[0], 10_350, 10_700, 1),
            bar(dates[1], 9_900, 10_000, 1),
            bar(dates[2], 9_800, 9_900, 1),
        ];
        let series = PriceSeries::new("TEST", dates.clone(), bars).unwrap();

        assert_eq!(series.day_rate(dates[0]).unwrap(), Some(7.0));
        assert_eq!(series.gap_rate(dates[0]).unwrap(), Some(3.5));
        // 10_000 / 9_900 - 1 = 1.0101..%
        assert_eq!(series.day_rate(dates[1]).unwrap(), Some(1.01));
        assert_eq!(series.last_gap_rate().unwrap(), Some(3.5));
        assert!(series.is_gap_rate_over(3.5).unwrap());
        assert!(!series.is_gap_rate_over(3.51).unwrap());

        // The oldest day has nothing before it inside the window.
        assert!(series.day_rate(dates[2]).is_err());
    }

    #[test]
    fn gap_rate_absent_without_previous_bar() {
        let dates = window(3);
        let bars = vec![bar(dates[0], 10_500, 10_700, 1), bar(dates[2], 1, 1, 1)];
        let series = PriceSeries::new("TEST", dates.clone(), bars).unwrap();

        assert!(series.last_bar().is_some());
        assert!(series.previous_bar().unwrap().is_none());
        assert_eq!(series.last_gap_rate().unwrap(), None);
        assert_eq!(series.day_rate(dates[0]).unwrap(), None);
        assert!(!series.is_gap_rate_over(-100.0).unwrap());
    }

    #[test]
    fn high_and_low_rates_are_relative_to_open() {
        let dates = window(2);
        let mut today = bar(dates[0], 10_000, 10_500, 1);
        today.high = 11_234;
        today.low = 9_876;
        let series = PriceSeries::new("TEST", dates, vec![today]).unwrap();

        assert_eq!(series.last_high_rate(), Some(12.34));
        assert_eq!(series.last_low_rate(), Some(-1.24));
    }

    #[test]
    fn high_and_low_rates_absent_without_today() {
        let dates = window(2);
        let series = PriceSeries::new("TEST", dates.clone(), vec![bar(dates[1], 1, 1, 1)]).unwrap();
        assert_eq!(series.last_high_rate(), None);
        assert_eq!(series.last_low_rate(), None);
    }

    #[test]
    fn halted_session_has_no_intraday_rates() {
        let dates = window(3);
        let halted = DailyBar {
            open: 0,
            high: 0,
            low: 0,
            ..bar(dates[0], 0, 10_000, 0)
        };
        let bars = vec![halted, bar(dates[1], 0, 10_000, 1), bar(dates[2], 0, 0, 1)];
        let series = PriceSeries::new("TEST", dates.clone(), bars).unwrap();

        assert_eq!(series.last_high_rate(), None);
        assert_eq!(series.last_low_rate(), None);
        assert_eq!(series.last_gap_rate().unwrap(), Some(-100.0));
        assert_eq!(series.day_rate(dates[0]).unwrap(), Some(0.0));
        // A zero close the day before leaves no rate to compute.
        assert_eq!(series.day_rate(dates[1]).unwrap(), None);
    }

    #[test]
    fn trade_value_window_includes_today_and_the_boundary_day() {
        let dates = window(40);
        let mut bars: Vec<_> = dates.iter().map(|d| bar(*d, 100, 100, 1_000)).collect();
        bars[30].trade_value = 20_000_000_000;
        let series = PriceSeries::new("TEST", dates.clone(), bars.clone()).unwrap();
        assert!(series.has_trade_value_over_in_days(20_000_000_000, 30).unwrap());
        assert!(!series.has_trade_value_over_in_days(20_000_000_000, 29).unwrap());

        bars[30].trade_value = 1_000;
        bars[0].trade_value = 20_000_000_000;
        let series = PriceSeries::new("TEST", dates, bars).unwrap();
        assert!(series.has_trade_value_over_in_days(20_000_000_000, 0).unwrap());
    }

    #[test]
    fn trade_value_window_past_the_end_is_an_error() {
        let series = flat_series(30, 100);
        assert!(series.has_trade_value_over_in_days(1, 29).is_ok());
        assert!(series.has_trade_value_over_in_days(1, 30).is_err());
    }

    /// Flat 10,000 closes over 40 days with one 16% day on 60bn KRW at `idx`.
    fn surge_at(idx: usize) -> PriceSeries {
        let dates = window(40);
        let mut bars: Vec<_> = dates.iter().map(|d| bar(*d, 10_000, 10_000, 1_000)).collect();
        bars[idx].close = 11_600;
        bars[idx].trade_value = 60_000_000_000;
        PriceSeries::new("TEST", dates, bars).unwrap()
    }

    #[test]
    fn rate_and_value_window_includes_today() {
        assert!(surge_at(0)
            .has_rate_and_trade_value_over_in_days(15.0, 50_000_000_000, 30)
            .unwrap());
    }

    #[test]
    fn rate_and_value_window_includes_the_boundary_day() {
        assert!(surge_at(30)
            .has_rate_and_trade_value_over_in_days(15.0, 50_000_000_000, 30)
            .unwrap());
        assert!(!surge_at(31)
            .has_rate_and_trade_value_over_in_days(15.0, 50_000_000_000, 30)
            .unwrap());
    }

    #[test]
    fn rate_and_value_need_the_same_day() {
        let dates = window(40);
        let mut bars: Vec<_> = dates.iter().map(|d| bar(*d, 10_000, 10_000, 1_000)).collect();
        // Day 12 jumps 16% on small value, day 5 has big value on a flat close.
        bars[12].close = 11_600;
        bars[5].trade_value = 60_000_000_000;
        let series = PriceSeries::new("TEST", dates.clone(), bars.clone()).unwrap();
        assert!(!series
            .has_rate_and_trade_value_over_in_days(15.0, 50_000_000_000, 30)
            .unwrap());

        bars[12].trade_value = 60_000_000_000;
        let series = PriceSeries::new("TEST", dates, bars).unwrap();
        assert!(series
            .has_rate_and_trade_value_over_in_days(15.0, 50_000_000_000, 30)
            .unwrap());
        // Day 12 lies outside a 10-day window.
        assert!(!series
            .has_rate_and_trade_value_over_in_days(15.0, 50_000_000_000, 10)
            .unwrap());
    }

    #[test]
    fn rate_and_value_skip_days_without_rate() {
        let dates = window(35);
        let mut bars: Vec<_> = dates.iter().map(|d| bar(*d, 10_000, 10_000, 1_000)).collect();
        bars[7].close = 20_000;
        bars[7].trade_value = 60_000_000_000;
        // Without day 8 there is no rate for day 7.
        bars.remove(8);
        let series = PriceSeries::new("TEST", dates, bars).unwrap();
        assert!(!series
            .has_rate_and_trade_value_over_in_days(15.0, 50_000_000_000, 30)
            .unwrap());
    }

    #[test]
    fn moving_average_drops_today_and_divides_by_nominal_days() {
        let dates = window(10);
        let bars: Vec<_> = dates
            .iter()
            .enumerate()
            .map(|(idx, d)| bar(*d, 0, 1_000 - idx as i64 * 10, 1))
            .collect();
        let series = PriceSeries::new("TEST", dates, bars).unwrap();
        // Closes of days 1..=5: 990, 980, 970, 960, 950.
        assert_eq!(series.moving_average(5).unwrap(), 970.0);
    }

    #[test]
    fn moving_average_on_sparse_window_undercounts() {
        let dates = window(10);
        // Only today, day 2 and day 4 have bars.
        let bars = vec![
            bar(dates[0], 0, 5_000, 1),
            bar(dates[2], 0, 1_000, 1),
            bar(dates[4], 0, 2_000, 1),
        ];
        let series = PriceSeries::new("TEST", dates, bars).unwrap();
        // (1000 + 2000) / 5, not / 2.
        assert_eq!(series.moving_average(5).unwrap(), 600.0);
    }

    #[test]
    fn moving_average_drops_the_newest_present_bar_when_today_is_missing() {
        let dates = window(10);
        let bars = vec![bar(dates[1], 0, 4_000, 1), bar(dates[3], 0, 1_000, 1)];
        let series = PriceSeries::new("TEST", dates, bars).unwrap();
        assert_eq!(series.moving_average(5).unwrap(), 200.0);
        assert!(matches!(series.moving_average(0), Err(SeriesError::ZeroDayAverage)));
    }

    #[test]
    fn regular_arrangement_needs_120_bars() {
        let dates = window(121);
        // Rising prices: newer closes are higher, so MA5 > MA20 > MA60 > MA120.
        let mut bars: Vec<_> = dates
            .iter()
            .enumerate()
            .map(|(idx, d)| bar(*d, 0, 10_000 - idx as i64 * 10, 1))
            .collect();
        let series = PriceSeries::new("TEST", dates.clone(), bars.clone()).unwrap();
        assert!(series.is_in_regular_arrangement().unwrap());

        bars.truncate(119);
        let series = PriceSeries::new("TEST", dates, bars).unwrap();
        assert_eq!(series.bar_count(), 119);
        assert!(!series.is_in_regular_arrangement().unwrap());
    }

    #[test]
    fn regular_arrangement_rejects_falling_prices() {
        let dates = window(121);
        let bars: Vec<_> = dates
            .iter()
            .enumerate()
            .map(|(idx, d)| bar(*d, 0, 5_000 + idx as i64 * 10, 1))
            .collect();
        let series = PriceSeries::new("TEST", dates, bars).unwrap();
        assert!(!series.is_in_regular_arrangement().unwrap());
    }

    #[test]
    fn regular_arrangement_on_a_short_window_is_an_error() {
        // 120 bars fit a 120-day window, but MA120 needs index 120.
        let series = flat_series(120, 100);
        assert!(matches!(
            series.is_in_regular_arrangement(),
            Err(SeriesError::OffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn round2_follows_decimal_expansion() {
        assert_eq!(round2(1.005), 1.0); // 1.005 is stored as 1.00499..
        assert_eq!(round2(-3.14159), -3.14);
        assert_eq!(round2(2.5), 2.5);
        assert!(round2(f64::INFINITY).is_infinite());
    }

    proptest! {
        #[test]
        fn day_rate_matches_percentage_change(
            prev in 1i64..2_000_000,
            close in 1i64..2_000_000,
        ) {
            let dates = window(2);
            let bars = vec![bar(dates[0], close, close, 1), bar(dates[1], prev, prev, 1)];
            let series = PriceSeries::new("TEST", dates.clone(), bars).unwrap();

            let expected = round2((close - prev) as f64 / prev as f64 * 100.0);
            prop_assert_eq!(series.day_rate(dates[0]).unwrap(), Some(expected));
        }

        #[test]
        fn moving_average_divisor_is_nominal(
            present in proptest::collection::vec(any::<bool>(), 21),
            close in 1i64..100_000,
        ) {
            let dates = window(21);
            let bars: Vec<_> = dates
                .iter()
                .zip(&present)
                .filter(|(_, keep)| **keep)
                .map(|(d, _)| bar(*d, close, close, 1))
                .collect();
            let found = bars.len().saturating_sub(1) as i64;
            let series = PriceSeries::new("TEST", dates, bars).unwrap();

            let expected = round2((found * close) as f64 / 20.0);
            prop_assert_eq!(series.moving_average(20).unwrap(), expected);
        }
    }
}
