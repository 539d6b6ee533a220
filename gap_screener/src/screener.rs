//! One screening run: calendar, universe, per-ticker evaluation and reports.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::{StreamExt, stream};
use market_data_ingestor::{
    fetch_daily_bars_cached,
    io::{
        cache::{BarCache, CsvBarCache},
        listing_cache::CsvListingCache,
    },
    models::{
        asset::TickerListing, bar_series::BarSeries, request_params::DailyBarsRequest,
    },
    providers::{DataProvider, TradingCalendar},
};
use tracing::{debug, error, info, warn};

use crate::{
    calendar::previous_business_days,
    config::ScreenerConfig,
    errors::ScreenerError,
    report::{ReportPaths, ReportRow, ReportWriter},
    series::{PriceSeries, SeriesError},
    ticker::{Classification, Ticker},
    universe::load_universe,
};

/// Counts of one run, plus where the reports went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub tickers: usize,
    pub condition_1: usize,
    pub condition_2: usize,
    pub unmatched: usize,
    /// Tickers whose evaluation failed and were left out of both reports.
    pub failed: usize,
    pub paths: ReportPaths,
}

pub struct Screener {
    provider: Arc<dyn DataProvider>,
    calendar: Arc<dyn TradingCalendar>,
    bar_cache: Box<dyn BarCache>,
    listing_cache: CsvListingCache,
    config: ScreenerConfig,
}

impl Screener {
    /// Caches live under `config.data_dir`.
    pub fn new(
        provider: Arc<dyn DataProvider>,
        calendar: Arc<dyn TradingCalendar>,
        config: ScreenerConfig,
    ) -> Self {
        let bar_cache = Box::new(CsvBarCache::new(config.prices_dir()));
        Self::with_bar_cache(provider, calendar, bar_cache, config)
    }

    /// Like [`Screener::new`], with bars read through `bar_cache` instead of the CSV files
    /// under `config.data_dir`.
    pub fn with_bar_cache(
        provider: Arc<dyn DataProvider>,
        calendar: Arc<dyn TradingCalendar>,
        bar_cache: Box<dyn BarCache>,
        config: ScreenerConfig,
    ) -> Self {
        Self {
            listing_cache: CsvListingCache::new(config.listings_dir()),
            provider,
            calendar,
            bar_cache,
            config,
        }
    }

    /// Screens every listed ticker as of `date` and writes both reports for it.
    ///
    /// Reports follow universe order. A ticker whose bars cannot be fetched is screened on
    /// an empty history; one whose evaluation fails is logged and skipped.
    pub async fn run(&self, date: NaiveDate) -> Result<RunSummary, ScreenerError> {
        self.config.validate()?;

        let dates =
            previous_business_days(self.calendar.as_ref(), date, self.config.window_size).await?;
        info!(
            newest = %dates[0],
            oldest = %dates[dates.len() - 1],
            days = dates.len(),
            "resolved trading window"
        );

        let universe = load_universe(
            self.provider.as_ref(),
            &self.listing_cache,
            &self.config.markets,
            dates[0],
        )
        .await?;

        let (mut writer, paths) = ReportWriter::create(&self.config.results_dir, date)?;
        let label = date.format("%Y%m%d").to_string();
        let total = universe.len();
        let mut summary = RunSummary {
            tickers: total,
            condition_1: 0,
            condition_2: 0,
            unmatched: 0,
            failed: 0,
            paths,
        };

        let mut outcomes = stream::iter(universe)
            .map(|listing| self.evaluate(listing, &dates, &label))
            .buffered(self.config.concurrency);

        let mut done = 0;
        while let Some(outcome) = outcomes.next().await {
            done += 1;
            match outcome {
                Ok((classification, row)) => {
                    debug!(
                        done,
                        total,
                        symbol = %row.symbol,
                        ?classification,
                        "screened"
                    );
                    match classification {
                        Classification::Condition1 => summary.condition_1 += 1,
                        Classification::Condition2 => summary.condition_2 += 1,
                        Classification::Unmatched => summary.unmatched += 1,
                    }
                    if classification != Classification::Unmatched {
                        info!(symbol = %row.symbol, name = %row.name, ?classification, "matched");
                    }
                    writer.append(classification, &row)?;
                }
                Err(err) => {
                    summary.failed += 1;
                    error!(done, total, "{err}");
                }
            }
        }
        writer.finish()?;

        info!(
            tickers = summary.tickers,
            condition_1 = summary.condition_1,
            condition_2 = summary.condition_2,
            failed = summary.failed,
            "screening finished"
        );
        Ok(summary)
    }

    async fn evaluate(
        &self,
        listing: TickerListing,
        dates: &[NaiveDate],
        label: &str,
    ) -> Result<(Classification, ReportRow), SeriesError> {
        let bars = self.fetch_bars(&listing.symbol, dates).await;
        let series = PriceSeries::new(listing.symbol.clone(), dates.to_vec(), bars.bars)?;
        let ticker = Ticker::new(listing, series);

        let classification = ticker.classify()?;
        Ok((classification, ticker.report_row(label)?))
    }

    async fn fetch_bars(&self, symbol: &str, dates: &[NaiveDate]) -> BarSeries {
        let (Some(oldest), Some(newest)) = (dates.last(), dates.first()) else {
            return BarSeries::empty(symbol);
        };
        let params = DailyBarsRequest::new(symbol, *oldest, *newest);

        match fetch_daily_bars_cached(self.provider.as_ref(), self.bar_cache.as_ref(), params)
            .await
        {
            Ok(series) => series,
            Err(err) => {
                warn!(symbol, "failed to fetch bars, screening without history: {err}");
                BarSeries::empty(symbol)
            }
        }
    }
}
