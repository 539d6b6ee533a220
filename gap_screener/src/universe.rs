//! The set of tickers a run screens.

use chrono::NaiveDate;
use indexmap::IndexMap;
use market_data_ingestor::{
    errors::Error,
    io::listing_cache::CsvListingCache,
    models::asset::{Market, TickerListing},
    providers::DataProvider,
};
use tracing::{debug, info};

/// Listings of `markets` as of `snapshot_date`, in market order then provider order.
///
/// The snapshot for the date is read first. Only markets it has no rows for are listed
/// through `provider`, and the snapshot is rewritten with them. Markets that were not
/// requested are left out of the result even when the snapshot has them. A symbol listed
/// twice keeps its first position.
pub async fn load_universe(
    provider: &dyn DataProvider,
    cache: &CsvListingCache,
    markets: &[Market],
    snapshot_date: NaiveDate,
) -> Result<Vec<TickerListing>, Error> {
    let mut by_market: IndexMap<Market, Vec<TickerListing>> = IndexMap::new();
    for listing in cache.load(snapshot_date)?.unwrap_or_default() {
        by_market.entry(listing.market).or_default().push(listing);
    }

    let mut listed = false;
    for market in markets {
        if by_market.contains_key(market) {
            continue;
        }
        let listings = provider.list_tickers(*market).await?;
        debug!(%market, tickers = listings.len(), "listed market");
        by_market.insert(*market, listings);
        listed = true;
    }

    if listed {
        let snapshot: Vec<_> = by_market.values().flatten().cloned().collect();
        cache.store(snapshot_date, &snapshot)?;
        info!(%snapshot_date, tickers = snapshot.len(), "stored universe snapshot");
    } else {
        info!(%snapshot_date, "using cached universe");
    }

    let mut by_symbol: IndexMap<String, TickerListing> = IndexMap::new();
    for listing in markets
        .iter()
        .filter_map(|market| by_market.get(market))
        .flatten()
    {
        by_symbol
            .entry(listing.symbol.clone())
            .or_insert_with(|| listing.clone());
    }
    Ok(by_symbol.into_values().collect())
}
