use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::models::{asset::Market, request_params::parse_compact_date};

#[derive(Parser)]
#[command(author, version, about = "Fetch KRX daily bars and listings into the local cache")]
pub struct Cli {
    /// Cache root; bars go to <DIR>/prices, listings to <DIR>/list
    #[arg(long, default_value = "tickers")]
    pub data_dir: PathBuf,

    /// Maximum requests per second sent to the data portal
    #[arg(long, default_value = "5")]
    pub requests_per_second: u32,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch daily bars for one symbol and store them in the bar cache
    Bars {
        /// Short exchange code (e.g. "005930")
        #[arg(long)]
        symbol: String,

        /// First day, YYYYMMDD
        #[arg(long, value_parser = parse_compact_date)]
        start: NaiveDate,

        /// Last day, YYYYMMDD
        #[arg(short, long, value_parser = parse_compact_date)]
        end: NaiveDate,

        /// Ignore an existing cache entry and fetch again
        #[arg(long)]
        refresh: bool,
    },

    /// Print the current ticker list of a market as CSV
    Tickers {
        /// KOSPI or KOSDAQ
        #[arg(long)]
        market: Market,
    },
}
