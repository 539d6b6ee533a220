//! Korea Exchange (KRX) market data portal provider.
//!
//! The portal serves every dataset through one form-POST JSON endpoint; the dataset
//! is selected by a `bld` code (see [`params`]).

pub mod params;
pub mod provider;
pub mod response;

pub use provider::{KrxConfig, KrxProvider};
