use chrono::NaiveDate;

use crate::{
    models::{asset::Market, request_params::DailyBarsRequest},
    providers::{ProviderError, ValidationSnafu},
};

/// Path of the JSON endpoint, relative to the configured base URL.
pub const JSON_ENDPOINT: &str = "/comm/bldAttendant/getJsonData.cmd";

/// Referer the portal expects on data requests.
pub const REFERER: &str = "http://data.krx.co.kr/contents/MDC/MDI/mdiLoader";

/// All listed issues with basic information, per market.
pub const BLD_LISTING: &str = "dbms/MDC/STAT/standard/MDCSTAT01901";
/// Daily price history of a single issue.
pub const BLD_ISSUE_OHLCV: &str = "dbms/MDC/STAT/standard/MDCSTAT01701";
/// Daily history of a single index.
pub const BLD_INDEX_OHLCV: &str = "dbms/MDC/STAT/standard/MDCSTAT00301";
/// Issue finder (short code -> ISIN).
pub const BLD_ISSUE_FINDER: &str = "dbms/comm/finder/finder_stkisu";

pub type Form = Vec<(&'static str, String)>;

/// The portal's `mktId` for a market.
pub const fn market_id(market: Market) -> &'static str {
    match market {
        Market::Kospi => "STK",
        Market::Kosdaq => "KSQ",
    }
}

/// Dates are sent as `YYYYMMDD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn listing_form(market: Market) -> Form {
    vec![
        ("bld", BLD_LISTING.to_string()),
        ("mktId", market_id(market).to_string()),
        ("share", "1".to_string()),
        ("csvxls_isNo", "false".to_string()),
    ]
}

/// Builds the daily-price form for an issue. `isin` is the full 12-character code.
pub fn issue_ohlcv_form(isin: &str, params: &DailyBarsRequest) -> Result<Form, ProviderError> {
    validate_range(params)?;
    Ok(vec![
        ("bld", BLD_ISSUE_OHLCV.to_string()),
        ("isuCd", isin.to_string()),
        ("strtDd", format_date(params.start)),
        ("endDd", format_date(params.end)),
        ("adjStkPrc_check", "Y".to_string()),
        ("adjStkPrc", "2".to_string()),
        ("share", "1".to_string()),
        ("money", "1".to_string()),
    ])
}

/// Daily history of the KOSPI composite index; its dates are the exchange's trading days.
pub fn kospi_index_form(start: NaiveDate, end: NaiveDate) -> Form {
    vec![
        ("bld", BLD_INDEX_OHLCV.to_string()),
        ("indIdx", "1".to_string()),
        ("indIdx2", "001".to_string()),
        ("strtDd", format_date(start)),
        ("endDd", format_date(end)),
        ("share", "2".to_string()),
        ("money", "3".to_string()),
    ]
}

pub fn finder_form(symbol: &str) -> Form {
    vec![
        ("bld", BLD_ISSUE_FINDER.to_string()),
        ("mktsel", "ALL".to_string()),
        ("typeNo", "0".to_string()),
        ("searchText", symbol.to_string()),
    ]
}

pub fn validate_range(params: &DailyBarsRequest) -> Result<(), ProviderError> {
    if params.symbol.trim().is_empty() {
        return ValidationSnafu {
            message: "symbol must not be empty".to_string(),
        }
        .fail();
    }
    if !params.is_valid_range() {
        return ValidationSnafu {
            message: format!("start {} is after end {}", params.start, params.end),
        }
        .fail();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ohlcv_form_uses_compact_dates() {
        let params = DailyBarsRequest::new("005930", day(2024, 1, 2), day(2024, 6, 28));
        let form = issue_ohlcv_form("KR7005930003", &params).unwrap();
        assert!(form.contains(&("strtDd", "20240102".to_string())));
        assert!(form.contains(&("endDd", "20240628".to_string())));
        assert!(form.contains(&("isuCd", "KR7005930003".to_string())));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let params = DailyBarsRequest::new("005930", day(2024, 2, 1), day(2024, 1, 1));
        let err = issue_ohlcv_form("KR7005930003", &params).unwrap_err();
        assert!(matches!(err, ProviderError::Validation { .. }));
    }

    #[test]
    fn listing_form_maps_market_ids() {
        assert!(listing_form(Market::Kospi).contains(&("mktId", "STK".to_string())));
        assert!(listing_form(Market::Kosdaq).contains(&("mktId", "KSQ".to_string())));
    }
}
