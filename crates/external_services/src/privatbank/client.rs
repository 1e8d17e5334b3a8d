//! PrivatBank exchange-rate archive client.

use crate::error::{Error, Result};
use crate::privatbank::types::ExchangeRatesResponse;
use crate::traits::RateProvider;
use crate::types::{RateTable, DATE_FORMAT};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, error};

/// Archive endpoint. The date is appended as `DD.MM.YYYY`.
pub const EXCHANGE_RATES_URL: &str = "https://api.privatbank.ua/p24api/exchange_rates?date=";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// PrivatBank REST API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PrivatBankClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl Default for PrivatBankClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PrivatBankClient {
    /// Create a client for the public endpoint with the default timeout.
    pub fn new() -> Self {
        Self::with_config(EXCHANGE_RATES_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_config(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL and per-request timeout.
    pub fn with_config(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Request URL for a date.
    pub fn url_for(&self, date: NaiveDate) -> String {
        format!("{}{}", self.base_url, date.format(DATE_FORMAT))
    }

    async fn request(&self, date: NaiveDate, currencies: &[&str]) -> Result<RateTable> {
        let url = self.url_for(date);
        debug!("Fetching exchange rates from: {}", url);

        let response = self.http.get(&url).timeout(self.timeout).send().await?;

        if response.status() != StatusCode::OK {
            return Err(Error::Api(format!(
                "API returned status {} for {}",
                response.status(),
                date.format(DATE_FORMAT)
            )));
        }

        let text = response.text().await?;
        let body: ExchangeRatesResponse = serde_json::from_str(&text)?;
        body.into_rate_table(date, currencies)
    }
}

#[async_trait]
impl RateProvider for PrivatBankClient {
    async fn fetch_rates(&self, date: NaiveDate, currencies: &[&str]) -> Result<RateTable> {
        match self.request(date, currencies).await {
            Ok(table) => {
                debug!(
                    "Fetched {} rates for {} ({} missing)",
                    table.rates.len(),
                    date.format(DATE_FORMAT),
                    table.missing.len()
                );
                Ok(table)
            }
            Err(e) => {
                error!(
                    "Failed to fetch exchange rates for {}: {}",
                    date.format(DATE_FORMAT),
                    e
                );
                Err(e)
            }
        }
    }
}
