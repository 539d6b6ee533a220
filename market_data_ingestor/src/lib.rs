//! Daily market data for KRX-listed equities: canonical bar and listing models,
//! provider traits with a KRX implementation, and CSV caches for fetched data.

#[cfg(feature = "cli")]
pub mod cli;
pub mod errors;
pub mod io;
pub mod models;
pub mod providers;

use io::cache::{BarCache, BarCacheKey};
use models::{bar_series::BarSeries, request_params::DailyBarsRequest};
use providers::DataProvider;

/// Returns the bars for `params`, reading the cache when an entry exists and otherwise
/// fetching from `provider` and storing the result.
pub async fn fetch_daily_bars_cached(
    provider: &dyn DataProvider,
    cache: &dyn BarCache,
    params: DailyBarsRequest,
) -> Result<BarSeries, errors::Error> {
    let key = BarCacheKey::from(&params);
    if let Some(series) = cache.load(&key)? {
        return Ok(series);
    }

    let series = provider.fetch_daily_bars(params).await?;
    cache.store(&key, &series)?;
    Ok(series)
}
