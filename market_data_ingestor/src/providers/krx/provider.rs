use std::{
    collections::HashMap,
    num::NonZeroU32,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use chrono::NaiveDate;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, header};
use serde::de::DeserializeOwned;
use shared_utils::env::get_env_var_opt;
use snafu::{OptionExt, ResultExt};
use tracing::debug;

use crate::{
    models::{
        asset::{Market, TickerListing},
        bar_series::BarSeries,
        request_params::DailyBarsRequest,
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidHeaderSnafu, InvalidRateLimitSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu, TradingCalendar, UnknownSymbolSnafu,
        krx::{
            params::{
                Form, JSON_ENDPOINT, REFERER, finder_form, issue_ohlcv_form, kospi_index_form,
                listing_form, validate_range,
            },
            response::{
                KrxFinderRow, KrxIndexRow, KrxListingRow, KrxOhlcvRow, KrxResponse,
                parse_krx_date,
            },
        },
    },
};

pub const DEFAULT_BASE_URL: &str = "http://data.krx.co.kr";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";
const DEFAULT_REQUESTS_PER_SECOND: NonZeroU32 = nonzero!(5u32);

/// Connection settings for [`KrxProvider`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KrxConfig {
    pub base_url: String,
    pub user_agent: String,
    pub requests_per_second: u32,
}

impl Default for KrxConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND.get(),
        }
    }
}

impl KrxConfig {
    /// Defaults, with `KRX_BASE_URL` overriding the portal address when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = get_env_var_opt("KRX_BASE_URL") {
            config.base_url = url;
        }
        config
    }
}

pub struct KrxProvider {
    client: Client,
    endpoint: String,
    limiter: DefaultDirectRateLimiter,
    /// Short code -> ISIN, filled from listings and finder lookups.
    isin_by_symbol: Mutex<HashMap<String, String>>,
}

impl KrxProvider {
    /// Creates a new KRX provider. The portal needs no credentials, only browser-like headers.
    pub fn new(config: KrxConfig) -> Result<Self, ProviderInitError> {
        let per_second = NonZeroU32::new(config.requests_per_second).context(
            InvalidRateLimitSnafu {
                requests_per_second: config.requests_per_second,
            },
        )?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&config.user_agent).context(InvalidHeaderSnafu)?,
        );
        headers.insert(header::REFERER, header::HeaderValue::from_static(REFERER));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), JSON_ENDPOINT),
            limiter: RateLimiter::direct(Quota::per_second(per_second)),
            isin_by_symbol: Mutex::new(HashMap::new()),
        })
    }

    async fn post<T: DeserializeOwned>(&self, form: &Form) -> Result<Vec<T>, ProviderError> {
        self.limiter.until_ready().await;

        let response = self
            .client
            .post(&self.endpoint)
            .form(form)
            .send()
            .await
            .context(ReqwestSnafu)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return ApiSnafu {
                message: format!("{status}: {body}"),
            }
            .fail();
        }

        let parsed = response
            .json::<KrxResponse<T>>()
            .await
            .context(ReqwestSnafu)?;
        Ok(parsed.rows)
    }

    fn remember_isin(&self, symbol: &str, isin: &str) {
        self.isin_by_symbol
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.to_string(), isin.to_string());
    }

    fn known_isin(&self, symbol: &str) -> Option<String> {
        self.isin_by_symbol
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .cloned()
    }

    /// Price queries are keyed by ISIN; resolve it from earlier listings or the finder.
    async fn resolve_isin(&self, symbol: &str) -> Result<String, ProviderError> {
        if let Some(isin) = self.known_isin(symbol) {
            return Ok(isin);
        }

        debug!(symbol, "resolving ISIN through the issue finder");
        let rows: Vec<KrxFinderRow> = self.post(&finder_form(symbol)).await?;
        let isin = rows
            .into_iter()
            .find(|row| row.short_code.trim() == symbol)
            .map(|row| row.full_code.trim().to_string())
            .context(UnknownSymbolSnafu { symbol })?;

        self.remember_isin(symbol, &isin);
        Ok(isin)
    }
}

#[async_trait]
impl DataProvider for KrxProvider {
    async fn fetch_daily_bars(&self, params: DailyBarsRequest) -> Result<BarSeries, ProviderError> {
        validate_range(&params)?;

        let isin = self.resolve_isin(&params.symbol).await?;
        let rows: Vec<KrxOhlcvRow> = self.post(&issue_ohlcv_form(&isin, &params)?).await?;

        let bars = rows
            .into_iter()
            .map(KrxOhlcvRow::into_bar)
            .collect::<Result<Vec<_>, _>>()?;

        // The portal answers newest first.
        let mut series = BarSeries::new(params.symbol, bars);
        series.sort_by_date();
        Ok(series)
    }

    async fn list_tickers(&self, market: Market) -> Result<Vec<TickerListing>, ProviderError> {
        let rows: Vec<KrxListingRow> = self.post(&listing_form(market)).await?;

        let listings = rows
            .into_iter()
            .map(|row| {
                self.remember_isin(row.short_code.trim(), row.isin.trim());
                row.into_listing(market)
            })
            .collect();
        Ok(listings)
    }
}

#[async_trait]
impl TradingCalendar for KrxProvider {
    async fn trading_days(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, ProviderError> {
        if start > end {
            return Ok(Vec::new());
        }

        let rows: Vec<KrxIndexRow> = self.post(&kospi_index_form(start, end)).await?;
        let mut days = rows
            .iter()
            .map(|row| parse_krx_date(&row.trade_date))
            .collect::<Result<Vec<_>, _>>()?;
        days.sort_unstable();
        days.dedup();
        Ok(days)
    }
}
