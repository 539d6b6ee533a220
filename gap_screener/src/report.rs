//! Per-condition CSV reports of one screening run.
//!
//! Each run writes `<results>/<YYYYMMDD>_condition_1.csv` and `..._condition_2.csv`. Both
//! files are truncated and receive the header up front, so an empty result still leaves a
//! header-only file behind.

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use market_data_ingestor::models::asset::Market;
use serde::Serialize;

use crate::ticker::Classification;

pub const REPORT_HEADER: [&str; 11] = [
    "날짜",
    "티커",
    "이름",
    "마켓",
    "전일종가",
    "당일시가",
    "갭상승률",
    "고가",
    "고가%",
    "저가",
    "저가%",
];

/// One report line. Missing prices are written as empty fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub date: String,
    pub symbol: String,
    pub name: String,
    pub market: Market,
    pub previous_close: Option<i64>,
    pub open: Option<i64>,
    pub gap_rate: Option<f64>,
    pub high: Option<i64>,
    pub high_rate: Option<f64>,
    pub low: Option<i64>,
    pub low_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub condition_1: PathBuf,
    pub condition_2: PathBuf,
}

impl ReportPaths {
    pub fn for_date(results_dir: &Path, date: NaiveDate) -> Self {
        let stamp = date.format("%Y%m%d");
        Self {
            condition_1: results_dir.join(format!("{stamp}_condition_1.csv")),
            condition_2: results_dir.join(format!("{stamp}_condition_2.csv")),
        }
    }
}

pub struct ReportWriter<W: io::Write> {
    condition_1: csv::Writer<W>,
    condition_2: csv::Writer<W>,
}

impl ReportWriter<File> {
    /// Creates `results_dir` if needed and truncates both report files of `date`.
    pub fn create(results_dir: &Path, date: NaiveDate) -> Result<(Self, ReportPaths), csv::Error> {
        fs::create_dir_all(results_dir)?;
        let paths = ReportPaths::for_date(results_dir, date);
        let writer = Self::from_writers(
            File::create(&paths.condition_1)?,
            File::create(&paths.condition_2)?,
        )?;
        Ok((writer, paths))
    }
}

impl<W: io::Write> ReportWriter<W> {
    pub fn from_writers(condition_1: W, condition_2: W) -> Result<Self, csv::Error> {
        let mut writer = Self {
            condition_1: Self::csv_writer(condition_1),
            condition_2: Self::csv_writer(condition_2),
        };
        writer.condition_1.write_record(REPORT_HEADER)?;
        writer.condition_2.write_record(REPORT_HEADER)?;
        Ok(writer)
    }

    fn csv_writer(inner: W) -> csv::Writer<W> {
        csv::WriterBuilder::new().has_headers(false).from_writer(inner)
    }

    /// Writes `row` to the report of `classification`; unmatched rows go nowhere.
    pub fn append(&mut self, classification: Classification, row: &ReportRow) -> Result<(), csv::Error> {
        let writer = match classification {
            Classification::Condition1 => &mut self.condition_1,
            Classification::Condition2 => &mut self.condition_2,
            Classification::Unmatched => return Ok(()),
        };
        writer.serialize(row)?;
        // Flushed per row so partial results survive an aborted run.
        writer.flush()?;
        Ok(())
    }

    pub fn finish(self) -> Result<(W, W), io::Error> {
        let condition_1 = self.condition_1.into_inner().map_err(|e| e.into_error())?;
        let condition_2 = self.condition_2.into_inner().map_err(|e| e.into_error())?;
        Ok((condition_1, condition_2))
    }
}
