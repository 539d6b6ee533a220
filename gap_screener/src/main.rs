use std::{io, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use gap_screener::{cli::Cli, config::ScreenerConfig, screener::Screener};
use market_data_ingestor::providers::krx::{KrxConfig, KrxProvider};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("gap_screener=info".parse()?)
                .add_directive("market_data_ingestor=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ScreenerConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;

    let provider = Arc::new(
        KrxProvider::new(KrxConfig::from(&config.krx)).context("failed to set up KRX client")?,
    );
    let screener = Screener::new(provider.clone(), provider, config);
    let summary = screener.run(cli.date).await?;

    println!("{}", summary.paths.condition_1.display());
    println!("{}", summary.paths.condition_2.display());
    Ok(())
}
