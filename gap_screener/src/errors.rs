use thiserror::Error;

use crate::{calendar::CalendarError, config::ConfigError};

/// Errors that abort a screening run. Per-ticker problems are logged and counted instead.
#[derive(Debug, Error)]
pub enum ScreenerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("trading calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("market data error: {0}")]
    Ingestor(#[from] market_data_ingestor::errors::Error),

    #[error("report error: {0}")]
    Report(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
