//! Chat protocol: command classification and reply formats.
//!
//! Clients send plain text frames. A frame starting with one of the command
//! prefixes triggers a private rate reply; everything else is chat.

use chrono::NaiveDate;
use external_services::{RateTable, Result as RateResult};

/// Prefix of the single-date command.
pub const EXCHANGE_TODAY: &str = "exchange today";

/// Prefix of the multi-date command.
pub const EXCHANGE_LAST_DAYS: &str = "exchange lastday";

/// Shown for a history date whose fetch failed.
pub const RATE_UNAVAILABLE: &str = "rate data unavailable";

/// A classified inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Today's EUR/USD/GBP rates, replied privately.
    ExchangeToday,
    /// USD history for the last days, replied privately.
    ExchangeLastDays,
    /// Plain chat text, broadcast to everyone.
    Chat(&'a str),
}

impl<'a> Command<'a> {
    /// Classify a raw message. Case-sensitive prefix match, first match wins.
    pub fn parse(text: &'a str) -> Self {
        if text.starts_with(EXCHANGE_TODAY) {
            Command::ExchangeToday
        } else if text.starts_with(EXCHANGE_LAST_DAYS) {
            Command::ExchangeLastDays
        } else {
            Command::Chat(text)
        }
    }

    /// Name used in the audit log and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Command::ExchangeToday => EXCHANGE_TODAY,
            Command::ExchangeLastDays => EXCHANGE_LAST_DAYS,
            Command::Chat(_) => "chat",
        }
    }
}

/// `"{sender}: {message}"`
pub fn chat_line(sender: &str, message: &str) -> String {
    format!("{}: {}", sender, message)
}

/// Private reply to `exchange today`: a header followed by the rate block.
pub fn today_reply(block: &str) -> String {
    format!("PrivatBank exchange rate for today:\n{}", block)
}

/// First message of the `exchange lastday` reply.
pub fn history_header(days: usize) -> String {
    format!("PrivatBank exchange rates for the last {} days:", days)
}

/// One message per date of the `exchange lastday` reply:
/// `"{YYYY-MM-DD}: {code} - Sale: {sale}, Purchase: {purchase}"`.
///
/// A failed fetch, or a date without any of the requested currencies,
/// reads as unavailable.
pub fn history_line(date: NaiveDate, result: &RateResult<RateTable>) -> String {
    let rates = match result {
        Ok(table) if !table.is_empty() => table
            .rates
            .iter()
            .map(|r| format!("{} - Sale: {}, Purchase: {}", r.currency, r.sale, r.purchase))
            .collect::<Vec<_>>()
            .join(", "),
        _ => RATE_UNAVAILABLE.to_string(),
    };
    format!("{}: {}", date, rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use external_services::{Error, RateRecord};

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("exchange today"), Command::ExchangeToday);
        assert_eq!(Command::parse("exchange today EUR"), Command::ExchangeToday);
        assert_eq!(Command::parse("exchange lastday"), Command::ExchangeLastDays);
        assert_eq!(Command::parse("exchange lastday 5"), Command::ExchangeLastDays);
    }

    #[test]
    fn test_parse_chat() {
        assert_eq!(Command::parse("hello"), Command::Chat("hello"));
        assert_eq!(Command::parse("Exchange today"), Command::Chat("Exchange today"));
        assert_eq!(Command::parse(" exchange today"), Command::Chat(" exchange today"));
        assert_eq!(Command::parse("exchange"), Command::Chat("exchange"));
        assert_eq!(Command::parse(""), Command::Chat(""));
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::ExchangeToday.name(), "exchange today");
        assert_eq!(Command::ExchangeLastDays.name(), "exchange lastday");
        assert_eq!(Command::Chat("x").name(), "chat");
    }

    #[test]
    fn test_reply_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut table = RateTable::new(date);
        table.rates.push(RateRecord::new("USD", 38.05, 37.8));

        assert_eq!(chat_line("Alice", "hello"), "Alice: hello");
        assert_eq!(
            today_reply("USD: Sale - 38.05, Purchase - 37.8"),
            "PrivatBank exchange rate for today:\nUSD: Sale - 38.05, Purchase - 37.8"
        );
        assert_eq!(
            history_line(date, &Ok(table)),
            "2024-03-01: USD - Sale: 38.05, Purchase: 37.8"
        );
        assert_eq!(
            history_line(date, &Ok(RateTable::new(date))),
            "2024-03-01: rate data unavailable"
        );
        assert_eq!(
            history_line(date, &Err(Error::Api("status 500".to_string()))),
            "2024-03-01: rate data unavailable"
        );
        assert_eq!(
            history_header(10),
            "PrivatBank exchange rates for the last 10 days:"
        );
    }
}
