//! Command dispatcher: routes each inbound message to chat broadcast or a
//! private rate reply.

use crate::audit::AuditLog;
use crate::client::{ClientRegistry, ClientState};
use crate::error::Result;
use crate::protocol::{chat_line, history_header, history_line, today_reply, Command};
use chrono::{Local, NaiveDate};
use external_services::{fetch_last_days, RateProvider};
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Currencies reported by `exchange today`.
pub const TODAY_CURRENCIES: [&str; 3] = ["EUR", "USD", "GBP"];

/// Currencies reported by `exchange lastday`.
pub const HISTORY_CURRENCIES: [&str; 1] = ["USD"];

/// Configuration for the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Number of days covered by `exchange lastday`.
    pub history_days: usize,
    /// Maximum in-flight fetches per history request.
    pub max_concurrent_fetches: Option<usize>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            history_days: 10,
            max_concurrent_fetches: None,
        }
    }
}

/// Routes classified messages.
pub struct CommandDispatcher {
    registry: Arc<ClientRegistry>,
    rates: Arc<dyn RateProvider>,
    audit: Arc<AuditLog>,
    config: DispatcherConfig,
}

impl CommandDispatcher {
    pub fn new(
        registry: Arc<ClientRegistry>,
        rates: Arc<dyn RateProvider>,
        audit: Arc<AuditLog>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            registry,
            rates,
            audit,
            config,
        }
    }

    /// Handle one text message from `client`.
    ///
    /// Errors only when the reply cannot be queued to `client` itself.
    pub async fn dispatch(&self, client: &ClientState, text: &str) -> Result<()> {
        let command = Command::parse(text);
        match command {
            Command::Chat(message) => {
                let delivered = self.registry.broadcast(&chat_line(&client.name, message));
                counter!("gateway_chat_messages_total").increment(1);
                debug!("Chat from {} delivered to {} clients", client.id, delivered);
                Ok(())
            }
            Command::ExchangeToday => {
                counter!("gateway_commands_total", "command" => command.name()).increment(1);
                self.exchange_today(client, Local::now().date_naive()).await
            }
            Command::ExchangeLastDays => {
                counter!("gateway_commands_total", "command" => command.name()).increment(1);
                self.exchange_last_days(client, Local::now().date_naive())
                    .await
            }
        }
    }

    async fn exchange_today(&self, client: &ClientState, today: NaiveDate) -> Result<()> {
        info!("Client {} requested today's rates", client.id);

        let block = match self.rates.fetch_rates(today, &TODAY_CURRENCIES).await {
            Ok(table) => table.to_block(),
            Err(e) => {
                warn!("No rates for {} ({}): {}", client.id, today, e);
                counter!("gateway_rate_fetch_failures_total").increment(1);
                String::new()
            }
        };

        self.audit
            .record(Command::ExchangeToday.name(), &block)
            .await;

        client.send_text(today_reply(&block))
    }

    async fn exchange_last_days(&self, client: &ClientState, today: NaiveDate) -> Result<()> {
        let days = self.config.history_days;
        info!("Client {} requested rates for the last {} days", client.id, days);

        let history = fetch_last_days(
            self.rates.as_ref(),
            today,
            days,
            &HISTORY_CURRENCIES,
            self.config.max_concurrent_fetches,
        )
        .await;

        let failed = history.iter().filter(|(_, r)| r.is_err()).count();
        if failed > 0 {
            counter!("gateway_rate_fetch_failures_total").increment(failed as u64);
        }

        let lines: Vec<String> = history
            .iter()
            .map(|(date, result)| history_line(*date, result))
            .collect();

        self.audit
            .record(Command::ExchangeLastDays.name(), &lines.join("\n"))
            .await;

        client.send_text(history_header(days))?;
        for line in lines {
            client.send_text(line)?;
        }
        Ok(())
    }
}
