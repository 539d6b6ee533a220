#![cfg(test)]
use chrono::{Duration, Local};
use market_data_ingestor::{
    models::{asset::Market, request_params::DailyBarsRequest},
    providers::{
        DataProvider, TradingCalendar,
        krx::{KrxConfig, KrxProvider},
    },
};
use serial_test::serial;

// These tests talk to the live KRX data portal.

#[tokio::test]
#[serial]
#[ignore]
async fn test_krx_provider_fetch_daily_bars() {
    let provider = KrxProvider::new(KrxConfig::from_env()).expect("Failed to create KrxProvider");

    let end = Local::now().date_naive() - Duration::days(1);
    let params = DailyBarsRequest::new("005930", end - Duration::days(20), end);

    let result = provider.fetch_daily_bars(params).await;
    assert!(result.is_ok(), "fetch_daily_bars returned an error: {:?}", result.err());

    let series = result.unwrap();
    assert_eq!(series.symbol, "005930");
    assert!(!series.bars.is_empty(), "Expected at least one bar for 005930");

    // Provider output is ascending by date
    assert!(series.bars.windows(2).all(|w| w[0].date < w[1].date));
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_krx_provider_lists_kosdaq() {
    let provider = KrxProvider::new(KrxConfig::from_env()).expect("Failed to create KrxProvider");

    let listings = provider.list_tickers(Market::Kosdaq).await.expect("listing");
    assert!(listings.len() > 1000, "KOSDAQ lists well over a thousand issues");
    assert!(listings.iter().all(|l| l.market == Market::Kosdaq));
    assert!(listings.iter().all(|l| l.symbol.len() == 6));
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_krx_trading_days_skip_weekends() {
    use chrono::Datelike;

    let provider = KrxProvider::new(KrxConfig::from_env()).expect("Failed to create KrxProvider");
    let end = Local::now().date_naive();
    let days = provider
        .trading_days(end - Duration::days(30), end)
        .await
        .expect("trading days");

    assert!(!days.is_empty());
    assert!(days.iter().all(|d| d.weekday().number_from_monday() <= 5));
}
