//! Offline exchange-rate dump.
//!
//! Fetches PrivatBank rates for today and the preceding days and writes them
//! to a JSON file, one object per date (newest first). EUR, USD and GBP are
//! always included; extra currency codes can be passed as arguments.
//!
//! ```text
//! rates_dump PLN CHF --output rates.json --days 10
//! ```

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use external_services::privatbank::{DEFAULT_TIMEOUT, EXCHANGE_RATES_URL};
use external_services::{fetch_range, history_to_dump, merge_currencies, PrivatBankClient};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rates_dump", about = "Dump recent PrivatBank exchange rates to JSON")]
struct Args {
    /// Extra currency codes to include besides EUR, USD and GBP.
    currencies: Vec<String>,

    /// Output file.
    #[arg(short, long, default_value = "exchange_rates.json")]
    output: PathBuf,

    /// Number of days to fetch, counting today.
    #[arg(short, long, default_value_t = 10)]
    days: usize,

    /// Rate provider endpoint; the date is appended as DD.MM.YYYY.
    #[arg(long, env = "RATES_BASE_URL", default_value = EXCHANGE_RATES_URL)]
    base_url: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Maximum requests in flight. Unbounded when omitted.
    #[arg(long)]
    max_in_flight: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let currencies = merge_currencies(&args.currencies);
    let codes: Vec<&str> = currencies.iter().map(String::as_str).collect();

    info!(
        "Fetching {} days of rates for {:?} from {}",
        args.days, codes, args.base_url
    );

    let client = PrivatBankClient::with_config(args.base_url, Duration::from_secs(args.timeout_secs));
    let today = Local::now().date_naive();
    let history = fetch_range(&client, today, args.days, &codes, args.max_in_flight).await;

    let dump = history_to_dump(&history);
    let json = serde_json::to_string_pretty(&dump)?;
    tokio::fs::write(&args.output, json)
        .await
        .with_context(|| format!("writing {}", args.output.display()))?;

    info!(
        "Wrote {} of {} dates to {}",
        dump.len(),
        history.len(),
        args.output.display()
    );
    Ok(())
}
