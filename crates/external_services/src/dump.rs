//! Structured dump of a rate history.
//!
//! Shape (one object per date that was fetched successfully):
//!
//! ```text
//! [
//!   { "01.03.2024": { "EUR": { "sale": 41.2, "purchase": 40.9 }, ... } },
//!   ...
//! ]
//! ```

use crate::history::RateHistory;
use crate::types::DATE_FORMAT;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Default currencies for the dump; extra codes are appended to these.
pub const DEFAULT_CURRENCIES: [&str; 3] = ["EUR", "USD", "GBP"];

/// Sale and purchase price without the currency code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatePair {
    pub sale: f64,
    pub purchase: f64,
}

/// `{ "DD.MM.YYYY": { code: RatePair } }` for a single date.
pub type DatedRates = BTreeMap<String, BTreeMap<String, RatePair>>;

/// Convert a history into dump entries, preserving its order.
///
/// Dates whose fetch failed are logged and skipped.
pub fn history_to_dump(history: &RateHistory) -> Vec<DatedRates> {
    history
        .iter()
        .filter_map(|(date, result)| match result {
            Ok(table) => {
                let rates = table
                    .rates
                    .iter()
                    .map(|r| {
                        (
                            r.currency.clone(),
                            RatePair {
                                sale: r.sale,
                                purchase: r.purchase,
                            },
                        )
                    })
                    .collect();
                let mut entry = DatedRates::new();
                entry.insert(date.format(DATE_FORMAT).to_string(), rates);
                Some(entry)
            }
            Err(e) => {
                warn!("Skipping {} in dump: {}", date.format(DATE_FORMAT), e);
                None
            }
        })
        .collect()
}

/// Default currencies followed by any extra codes not already present.
pub fn merge_currencies(extra: &[String]) -> Vec<String> {
    let mut currencies: Vec<String> = DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect();
    for code in extra {
        let code = code.trim().to_uppercase();
        if !code.is_empty() && !currencies.contains(&code) {
            currencies.push(code);
        }
    }
    currencies
}
