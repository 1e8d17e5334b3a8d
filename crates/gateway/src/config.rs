//! Gateway configuration from environment variables.

use crate::error::{GatewayError, Result};
use external_services::privatbank::EXCHANGE_RATES_URL;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration for the gateway service.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to bind the WebSocket/HTTP listener to.
    pub host: IpAddr,
    /// Port for the WebSocket/HTTP listener.
    pub http_port: u16,
    /// Port for the Prometheus exporter.
    pub metrics_port: u16,
    /// Rate provider endpoint; the date is appended as `DD.MM.YYYY`.
    pub rates_base_url: String,
    /// Per-request timeout for rate fetches.
    pub fetch_timeout: Duration,
    /// Append-only audit file.
    pub audit_log_path: PathBuf,
    /// Upper bound on a single audit append.
    pub audit_timeout: Duration,
    /// Number of days covered by `exchange lastday`.
    pub history_days: usize,
    /// Keepalive ping interval.
    pub ping_interval: Duration,
    /// Maximum simultaneous connections. `None` means unbounded.
    pub max_connections: Option<usize>,
    /// Maximum in-flight fetches per history request. `None` means unbounded.
    pub max_concurrent_fetches: Option<usize>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            http_port: 8080,
            metrics_port: 9093,
            rates_base_url: EXCHANGE_RATES_URL.to_string(),
            fetch_timeout: Duration::from_secs(10),
            audit_log_path: PathBuf::from("exchange_log.txt"),
            audit_timeout: Duration::from_secs(5),
            history_days: 10,
            ping_interval: Duration::from_secs(30),
            max_connections: None,
            max_concurrent_fetches: None,
        }
    }
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            host: parse_or(&lookup, "HTTP_HOST", defaults.host)?,
            http_port: parse_or(&lookup, "HTTP_PORT", defaults.http_port)?,
            metrics_port: parse_or(&lookup, "METRICS_PORT", defaults.metrics_port)?,
            rates_base_url: lookup("RATES_BASE_URL").unwrap_or(defaults.rates_base_url),
            fetch_timeout: Duration::from_secs(parse_or(
                &lookup,
                "FETCH_TIMEOUT_SECS",
                defaults.fetch_timeout.as_secs(),
            )?),
            audit_log_path: lookup("AUDIT_LOG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.audit_log_path),
            audit_timeout: Duration::from_secs(parse_or(
                &lookup,
                "AUDIT_TIMEOUT_SECS",
                defaults.audit_timeout.as_secs(),
            )?),
            history_days: parse_or(&lookup, "HISTORY_DAYS", defaults.history_days)?,
            ping_interval: Duration::from_secs(non_zero(
                "PING_INTERVAL_SECS",
                parse_or(&lookup, "PING_INTERVAL_SECS", defaults.ping_interval.as_secs())?,
            )?),
            max_connections: parse_optional(&lookup, "MAX_CONNECTIONS")?,
            max_concurrent_fetches: parse_optional(&lookup, "MAX_CONCURRENT_FETCHES")?,
        })
    }

    /// Socket address for the WebSocket/HTTP listener.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.http_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    Ok(parse_optional(lookup, key)?.unwrap_or(default))
}

fn non_zero(key: &str, value: u64) -> Result<u64> {
    if value == 0 {
        return Err(GatewayError::Config(format!("{} must be greater than zero", key)));
    }
    Ok(value)
}

fn parse_optional<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| GatewayError::Config(format!("{} has invalid value '{}'", key, raw))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = GatewayConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.history_days, 10);
        assert_eq!(config.rates_base_url, EXCHANGE_RATES_URL);
        assert!(config.max_connections.is_none());
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("HTTP_HOST", "127.0.0.1"),
            ("HTTP_PORT", "9000"),
            ("FETCH_TIMEOUT_SECS", "3"),
            ("AUDIT_LOG_PATH", "/tmp/audit.txt"),
            ("MAX_CONNECTIONS", "64"),
            ("MAX_CONCURRENT_FETCHES", "4"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
        assert_eq!(config.audit_log_path, PathBuf::from("/tmp/audit.txt"));
        assert_eq!(config.max_connections, Some(64));
        assert_eq!(config.max_concurrent_fetches, Some(4));
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup_from(&[("HTTP_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn test_zero_ping_interval_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup_from(&[("PING_INTERVAL_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Config(ref msg) if msg.contains("PING_INTERVAL_SECS")));

        let config =
            GatewayConfig::from_lookup(lookup_from(&[("PING_INTERVAL_SECS", "5")])).unwrap();
        assert_eq!(config.ping_interval, Duration::from_secs(5));
    }
}
