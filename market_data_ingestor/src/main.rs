use std::io;

use anyhow::Result;
use clap::Parser;
use market_data_ingestor::{
    cli::commands::{Cli, Commands},
    fetch_daily_bars_cached,
    io::cache::{BarCache, BarCacheKey, CsvBarCache},
    models::request_params::DailyBarsRequest,
    providers::{
        DataProvider,
        krx::{KrxConfig, KrxProvider},
    },
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("market_data_ingestor=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let provider = KrxProvider::new(KrxConfig {
        requests_per_second: cli.requests_per_second,
        ..KrxConfig::from_env()
    })?;

    match cli.command {
        Commands::Bars {
            symbol,
            start,
            end,
            refresh,
        } => {
            let cache = CsvBarCache::new(cli.data_dir.join("prices"));
            let params = DailyBarsRequest::new(symbol, start, end);
            let key = BarCacheKey::from(&params);

            let series = if refresh {
                let series = provider.fetch_daily_bars(params).await?;
                cache.store(&key, &series)?;
                series
            } else {
                fetch_daily_bars_cached(&provider, &cache, params).await?
            };

            info!(symbol = %series.symbol, bars = series.bars.len(), "bars cached");
            // Paths go to stdout so scripts can pick them up.
            println!("{}", cache.path_for(&key).display());
        }

        Commands::Tickers { market } => {
            let listings = provider.list_tickers(market).await?;
            let mut writer = csv::Writer::from_writer(io::stdout());
            for listing in &listings {
                writer.serialize(listing)?;
            }
            writer.flush()?;
            info!(%market, count = listings.len(), "listed tickers");
        }
    }

    Ok(())
}
