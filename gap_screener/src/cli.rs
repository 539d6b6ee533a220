use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use market_data_ingestor::models::request_params::parse_compact_date;

use crate::config::ScreenerConfig;

#[derive(Debug, Parser)]
#[command(author, version, about = "Screen KOSPI/KOSDAQ tickers for gap-up setups")]
pub struct Cli {
    /// Screening date, YYYYMMDD
    #[arg(value_parser = parse_compact_date)]
    pub date: NaiveDate,

    /// Path to a TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Tickers fetched concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Cache root for prices and ticker lists
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory the reports are written to
    #[arg(long)]
    pub results_dir: Option<PathBuf>,
}

impl Cli {
    /// Flags win over file and environment settings.
    pub fn apply_to(&self, config: &mut ScreenerConfig) {
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.results_dir {
            config.results_dir = dir.clone();
        }
    }
}
