use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Equity markets operated by the Korea Exchange that the ingestor supports.
///
/// KONEX is deliberately absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    Kospi,
    Kosdaq,
}

impl Market {
    /// Every supported market, in the order listings are requested.
    pub const ALL: [Market; 2] = [Market::Kospi, Market::Kosdaq];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Market::Kospi => "KOSPI",
            Market::Kosdaq => "KOSDAQ",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown market: {0}")]
pub struct UnknownMarketError(pub String);

impl FromStr for Market {
    type Err = UnknownMarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "KOSPI" => Ok(Market::Kospi),
            "KOSDAQ" => Ok(Market::Kosdaq),
            _ => Err(UnknownMarketError(s.to_string())),
        }
    }
}

/// One entry of a market's ticker list.
///
/// Field names double as the header of the universe cache file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerListing {
    /// Short exchange code (e.g., "005930").
    #[serde(rename = "ticker")]
    pub symbol: String,
    /// Abbreviated display name.
    pub name: String,
    pub market: Market,
}
