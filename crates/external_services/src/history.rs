//! Multi-date rate aggregation.
//!
//! Fans out one fetch per date against a single provider and waits for all
//! of them. Every date keeps its own `Result`, so a failed date is
//! distinguishable from a date with no data and never affects the others.
//!
//! # Example
//!
//! ```ignore
//! let client = PrivatBankClient::new();
//! let today = chrono::Local::now().date_naive();
//! let history = fetch_last_days(&client, today, 10, &["USD"], None).await;
//! for (date, result) in &history {
//!     // ...
//! }
//! ```

use crate::error::Result;
use crate::traits::RateProvider;
use crate::types::RateTable;
use chrono::{Days, NaiveDate};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tracing::debug;

/// Per-date fetch results, newest date first.
pub type RateHistory = Vec<(NaiveDate, Result<RateTable>)>;

/// `n_days` dates walking backwards from `start` (inclusive).
pub fn dates_back_from(start: NaiveDate, n_days: usize) -> Vec<NaiveDate> {
    (0..n_days as u64)
        .map_while(|i| start.checked_sub_days(Days::new(i)))
        .collect()
}

/// `n_days` dates ending yesterday; `today` itself is excluded.
pub fn last_days(today: NaiveDate, n_days: usize) -> Vec<NaiveDate> {
    match today.pred_opt() {
        Some(yesterday) => dates_back_from(yesterday, n_days),
        None => Vec::new(),
    }
}

/// Fetch `currencies` for each of `n_days` dates walking back from `start`.
///
/// With `max_in_flight = None` all fetches run at once. With a limit, at
/// most that many requests are outstanding; output order is unchanged.
pub async fn fetch_range<P>(
    provider: &P,
    start: NaiveDate,
    n_days: usize,
    currencies: &[&str],
    max_in_flight: Option<usize>,
) -> RateHistory
where
    P: RateProvider + ?Sized,
{
    fetch_dates(provider, dates_back_from(start, n_days), currencies, max_in_flight).await
}

/// Fetch the `n_days` days before `today`, newest first.
pub async fn fetch_last_days<P>(
    provider: &P,
    today: NaiveDate,
    n_days: usize,
    currencies: &[&str],
    max_in_flight: Option<usize>,
) -> RateHistory
where
    P: RateProvider + ?Sized,
{
    fetch_dates(provider, last_days(today, n_days), currencies, max_in_flight).await
}

async fn fetch_dates<P>(
    provider: &P,
    dates: Vec<NaiveDate>,
    currencies: &[&str],
    max_in_flight: Option<usize>,
) -> RateHistory
where
    P: RateProvider + ?Sized,
{
    debug!(
        "Fetching rates for {} dates (limit: {:?})",
        dates.len(),
        max_in_flight
    );

    let fetches = dates
        .into_iter()
        .map(|date| async move { (date, provider.fetch_rates(date, currencies).await) });

    let history: RateHistory = match max_in_flight {
        Some(limit) => {
            stream::iter(fetches)
                .buffered(limit.max(1))
                .collect::<Vec<_>>()
                .await
        }
        None => join_all(fetches).await,
    };

    let failed = history.iter().filter(|(_, r)| r.is_err()).count();
    debug!(
        "Fetched rates for {} dates ({} failed)",
        history.len(),
        failed
    );

    history
}
