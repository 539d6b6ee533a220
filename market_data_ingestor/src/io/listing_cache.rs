//! On-disk cache of ticker listings, one CSV per snapshot date.
//!
//! Header is `ticker,name,market`; rows keep the order in which the listings were stored.

use std::{fs, path::PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::{errors::Error, models::asset::TickerListing};

/// File-backed listing cache. Entries are keyed by a date (the run's newest trading day).
#[derive(Clone, Debug)]
pub struct CsvListingCache {
    dir: PathBuf,
}

impl CsvListingCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<dir>/<YYYYMMDD>.csv`
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.csv", date.format("%Y%m%d")))
    }

    pub fn load(&self, date: NaiveDate) -> Result<Option<Vec<TickerListing>>, Error> {
        let path = self.path_for(date);
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let listings = reader
            .deserialize::<TickerListing>()
            .collect::<Result<Vec<_>, _>>()?;
        debug!(path = %path.display(), listings = listings.len(), "listing cache hit");
        Ok(Some(listings))
    }

    pub fn store(&self, date: NaiveDate, listings: &[TickerListing]) -> Result<(), Error> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(date);
        let tmp = path.with_extension("csv.tmp");

        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp)?;
            writer.write_record(["ticker", "name", "market"])?;
            for listing in listings {
                writer.serialize(listing)?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
