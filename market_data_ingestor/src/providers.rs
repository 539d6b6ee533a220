//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] and [`TradingCalendar`] traits, which serve as
//! a unified interface for fetching daily bars, ticker listings and the exchange's
//! trading days from a market data vendor (currently the Korea Exchange data portal).
//!
//! Both traits are designed for async usage and support dynamic dispatch
//! (`dyn DataProvider`) for runtime selection of providers.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{
//!     asset::{Market, TickerListing},
//!     bar_series::BarSeries,
//!     request_params::DailyBarsRequest,
//! };
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_daily_bars(
//!         &self,
//!         params: DailyBarsRequest,
//!     ) -> Result<BarSeries, ProviderError> {
//!         Ok(BarSeries::empty(params.symbol))
//!     }
//!
//!     async fn list_tickers(&self, _market: Market) -> Result<Vec<TickerListing>, ProviderError> {
//!         Ok(vec![])
//!     }
//! }
//! ```

pub mod krx;

use async_trait::async_trait;
use chrono::NaiveDate;
use snafu::{Backtrace, Snafu};

use crate::models::{
    asset::{Market, TickerListing},
    bar_series::BarSeries,
    request_params::DailyBarsRequest,
};

/// Trait for fetching daily bars and ticker listings from a market data provider.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetches the daily bars of one symbol for the inclusive date range in `params`.
    ///
    /// Days without trading simply have no bar; providers never synthesize one.
    async fn fetch_daily_bars(&self, params: DailyBarsRequest) -> Result<BarSeries, ProviderError>;

    /// Lists every ticker currently listed on `market`, in the provider's order.
    async fn list_tickers(&self, market: Market) -> Result<Vec<TickerListing>, ProviderError>;
}

/// Trait for looking up the days the exchange was open.
#[async_trait]
pub trait TradingCalendar: Send + Sync {
    /// Returns the trading days in `[start, end]`, ascending.
    async fn trading_days(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// A configured header value contains invalid characters.
    #[snafu(display("Invalid header value: {source}"))]
    InvalidHeader {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },

    /// The rate limit must allow at least one request per second.
    #[snafu(display("Invalid rate limit: {requests_per_second} requests per second"))]
    InvalidRateLimit {
        requests_per_second: u32,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a specific error message.
    #[snafu(display("API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },

    /// The requested symbol is unknown to the provider.
    #[snafu(display("Unknown symbol: {symbol}"))]
    UnknownSymbol {
        symbol: String,
        backtrace: Backtrace,
    },
}
