//! Exchange rate data types shared by the fetcher and its consumers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format expected by the rate provider (`DD.MM.YYYY`).
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Sale and purchase price of one currency on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    /// ISO currency code (e.g., "USD").
    pub currency: String,
    /// National bank sale rate.
    pub sale: f64,
    /// National bank purchase rate.
    pub purchase: f64,
}

impl RateRecord {
    pub fn new(currency: impl Into<String>, sale: f64, purchase: f64) -> Self {
        Self {
            currency: currency.into(),
            sale,
            purchase,
        }
    }
}

impl fmt::Display for RateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Sale - {}, Purchase - {}",
            self.currency, self.sale, self.purchase
        )
    }
}

/// Rates for a single date.
///
/// `rates` follows the order in which currencies were requested.
/// Requested currencies the provider did not report end up in `missing`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub date: NaiveDate,
    pub rates: Vec<RateRecord>,
    pub missing: Vec<String>,
}

impl RateTable {
    /// Create an empty table for a date.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            rates: Vec::new(),
            missing: Vec::new(),
        }
    }

    /// Look up the record for a currency code.
    pub fn get(&self, currency: &str) -> Option<&RateRecord> {
        self.rates.iter().find(|r| r.currency == currency)
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// One formatted line per found currency.
    pub fn lines(&self) -> Vec<String> {
        self.rates.iter().map(ToString::to_string).collect()
    }

    /// All lines joined with newlines. Empty when nothing was found.
    pub fn to_block(&self) -> String {
        self.lines().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> RateTable {
        RateTable {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            rates: vec![
                RateRecord::new("EUR", 41.2, 40.9),
                RateRecord::new("USD", 38.05, 37.8),
            ],
            missing: vec!["GBP".to_string()],
        }
    }

    #[test]
    fn test_record_display() {
        let record = RateRecord::new("USD", 38.05, 37.8);
        assert_eq!(record.to_string(), "USD: Sale - 38.05, Purchase - 37.8");
    }

    #[test]
    fn test_table_block() {
        let table = sample_table();
        assert_eq!(
            table.to_block(),
            "EUR: Sale - 41.2, Purchase - 40.9\nUSD: Sale - 38.05, Purchase - 37.8"
        );
        assert_eq!(table.get("USD").map(|r| r.sale), Some(38.05));
        assert!(table.get("GBP").is_none());
    }

    #[test]
    fn test_empty_table_block() {
        let table = RateTable::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(table.is_empty());
        assert_eq!(table.to_block(), "");
    }
}
