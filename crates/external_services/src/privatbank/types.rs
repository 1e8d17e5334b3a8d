//! PrivatBank API response types.

use crate::error::{Error, Result};
use crate::types::{RateRecord, RateTable};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

/// Response of the `exchange_rates` archive endpoint.
///
/// Only the rate list is read; the other top-level fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRatesResponse {
    #[serde(rename = "exchangeRate", default)]
    pub exchange_rate: Option<Vec<ExchangeRateEntry>>,
}

/// One currency row.
///
/// The first row of a real response describes the base currency and has no
/// `currency` field. Rows for metals and retired currencies may lack the
/// NB rates, so every field is optional and checked only when requested.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRateEntry {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(rename = "saleRateNB", default)]
    pub sale_rate_nb: Option<f64>,
    #[serde(rename = "purchaseRateNB", default)]
    pub purchase_rate_nb: Option<f64>,
}

impl ExchangeRateEntry {
    fn to_record(&self, currency: &str) -> Option<RateRecord> {
        Some(RateRecord::new(
            currency,
            self.sale_rate_nb?,
            self.purchase_rate_nb?,
        ))
    }
}

impl ExchangeRatesResponse {
    /// Pick the requested currencies out of the response.
    ///
    /// Fails only when the `exchangeRate` list is absent. Currencies not in
    /// the list, or listed without both NB rates, are logged and recorded as
    /// missing.
    pub fn into_rate_table(self, date: NaiveDate, currencies: &[&str]) -> Result<RateTable> {
        let entries = self.exchange_rate.ok_or_else(|| {
            Error::InvalidResponse(format!(
                "no exchangeRate list in response for {}",
                date.format(crate::DATE_FORMAT)
            ))
        })?;

        let by_code: HashMap<&str, &ExchangeRateEntry> = entries
            .iter()
            .filter_map(|e| e.currency.as_deref().map(|code| (code, e)))
            .collect();

        let mut table = RateTable::new(date);
        for &currency in currencies {
            match by_code.get(currency).and_then(|e| e.to_record(currency)) {
                Some(record) => table.rates.push(record),
                None => {
                    warn!(
                        "Rate for {} not found on {}",
                        currency,
                        date.format(crate::DATE_FORMAT)
                    );
                    table.missing.push(currency.to_string());
                }
            }
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "date": "01.03.2024",
        "bank": "PB",
        "baseCurrency": 980,
        "baseCurrencyLit": "UAH",
        "exchangeRate": [
            {"baseCurrency": "UAH", "saleRateNB": 1.0, "purchaseRateNB": 1.0},
            {"baseCurrency": "UAH", "currency": "EUR", "saleRateNB": 41.2, "purchaseRateNB": 40.9, "saleRate": 41.5, "purchaseRate": 40.6},
            {"baseCurrency": "UAH", "currency": "USD", "saleRateNB": 38.05, "purchaseRateNB": 37.8}
        ]
    }"#;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_parse_sample_response() {
        let response: ExchangeRatesResponse = serde_json::from_str(SAMPLE).unwrap();
        let entries = response.exchange_rate.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].currency.is_none());
        assert_eq!(entries[1].currency.as_deref(), Some("EUR"));
        assert_eq!(entries[2].sale_rate_nb, Some(38.05));
    }

    #[test]
    fn test_row_without_nb_rates_does_not_fail_the_date() {
        let body = r#"{
            "exchangeRate": [
                {"currency": "USD", "saleRateNB": 38.05, "purchaseRateNB": 37.8},
                {"currency": "XAU", "purchaseRateNB": 1.0},
                {"currency": "PLN", "saleRateNB": null, "purchaseRateNB": null}
            ]
        }"#;
        let response: ExchangeRatesResponse = serde_json::from_str(body).unwrap();
        let table = response
            .into_rate_table(date(), &["USD", "XAU", "PLN"])
            .unwrap();

        assert_eq!(table.rates, vec![RateRecord::new("USD", 38.05, 37.8)]);
        assert_eq!(table.missing, vec!["XAU".to_string(), "PLN".to_string()]);
    }

    #[test]
    fn test_missing_currency_is_recorded() {
        let response: ExchangeRatesResponse = serde_json::from_str(SAMPLE).unwrap();
        let table = response
            .into_rate_table(date(), &["EUR", "USD", "GBP"])
            .unwrap();

        assert_eq!(
            table.rates,
            vec![
                RateRecord::new("EUR", 41.2, 40.9),
                RateRecord::new("USD", 38.05, 37.8),
            ]
        );
        assert_eq!(table.missing, vec!["GBP".to_string()]);
        assert_eq!(table.lines().len(), 2);
    }

    #[test]
    fn test_requested_order_is_kept() {
        let response: ExchangeRatesResponse = serde_json::from_str(SAMPLE).unwrap();
        let table = response.into_rate_table(date(), &["USD", "EUR"]).unwrap();
        let codes: Vec<&str> = table.rates.iter().map(|r| r.currency.as_str()).collect();
        assert_eq!(codes, vec!["USD", "EUR"]);
    }

    #[test]
    fn test_response_without_rate_list() {
        let response: ExchangeRatesResponse =
            serde_json::from_str(r#"{"date": "01.03.2024", "bank": "PB"}"#).unwrap();
        let err = response.into_rate_table(date(), &["USD"]).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }
}
