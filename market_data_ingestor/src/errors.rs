use std::path::PathBuf;

use thiserror::Error;

use crate::providers::{ProviderError, ProviderInitError};

/// The unified error type for the `market_data_ingestor` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from a data provider (e.g., API error, validation).
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A provider could not be constructed.
    #[error("Provider initialization error: {0}")]
    ProviderInit(#[from] ProviderInitError),

    /// A cache file exists but could not be read back into bars.
    #[error("Cache error at {}: {message}", path.display())]
    Cache { path: PathBuf, message: String },

    /// A generic I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// An error from the CSV reader or writer.
    #[error("CSV operation failed")]
    Csv(#[from] csv::Error),
}
