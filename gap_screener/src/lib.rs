//! Gap-up screener for KOSPI and KOSDAQ equities.
//!
//! For a screening date the run resolves the trailing window of trading days, loads every
//! listed ticker with its daily bars, and sorts tickers into two CSV reports:
//!
//! - condition 1: a gap of at least 4% after a recent high-turnover surge;
//! - condition 2: a gap of at least 3% on a ticker with recent turnover whose moving
//!   averages are in regular arrangement (MA5 > MA20 > MA60 > MA120).
//!
//! Market data comes through the [`market_data_ingestor`] provider traits and caches.

pub mod calendar;
pub mod cli;
pub mod config;
pub mod errors;
pub mod report;
pub mod screener;
pub mod series;
pub mod ticker;
pub mod universe;
