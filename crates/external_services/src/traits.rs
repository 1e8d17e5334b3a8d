//! Rate provider trait.
//!
//! The gateway and the offline dump only talk to this trait, so tests can
//! substitute a stub for the HTTP client.

use crate::error::Result;
use crate::types::RateTable;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of exchange rates for a single date.
///
/// # Example
///
/// ```ignore
/// let client = PrivatBankClient::new();
/// let table = client.fetch_rates(date, &["EUR", "USD"]).await?;
/// for line in table.lines() {
///     println!("{}", line);
/// }
/// ```
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetch rates for `currencies` on `date`.
    ///
    /// Currencies the provider does not report are listed in
    /// [`RateTable::missing`] instead of failing the whole call.
    async fn fetch_rates(&self, date: NaiveDate, currencies: &[&str]) -> Result<RateTable>;
}
