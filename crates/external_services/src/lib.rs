//! External exchange-rate API client library.
//!
//! This library provides:
//! - PrivatBank: archive exchange-rate client (one request per date)
//! - History: concurrent multi-date fetches with per-date results
//! - Dump: structured JSON shape for offline rate exports
//!
//! # Example
//!
//! ```ignore
//! use external_services::privatbank::PrivatBankClient;
//! use external_services::{fetch_last_days, RateProvider};
//!
//! let client = PrivatBankClient::new();
//! let today = chrono::Local::now().date_naive();
//! let table = client.fetch_rates(today, &["EUR", "USD", "GBP"]).await?;
//! let history = fetch_last_days(&client, today, 10, &["USD"], None).await;
//! ```

pub mod dump;
pub mod error;
pub mod history;
pub mod privatbank;
pub mod traits;
pub mod types;

pub use dump::{history_to_dump, merge_currencies, DatedRates, RatePair, DEFAULT_CURRENCIES};
pub use error::{Error, Result};
pub use history::{dates_back_from, fetch_last_days, fetch_range, last_days, RateHistory};
pub use privatbank::PrivatBankClient;
pub use traits::RateProvider;
pub use types::{RateRecord, RateTable, DATE_FORMAT};
