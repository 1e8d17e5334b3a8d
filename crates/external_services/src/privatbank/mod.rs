//! PrivatBank exchange-rate API client.
//!
//! Provides the archive REST client and its response types.

pub mod client;
pub mod types;

pub use client::{PrivatBankClient, DEFAULT_TIMEOUT, EXCHANGE_RATES_URL};
pub use types::{ExchangeRateEntry, ExchangeRatesResponse};
