//! Gateway service entry point.
//!
//! WebSocket chat relay with private exchange-rate commands.

use anyhow::Result;
use external_services::PrivatBankClient;
use gateway::{
    create_router, AppState, AuditLog, ClientRegistry, CommandDispatcher, DispatcherConfig,
    GatewayConfig,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Gateway service");

    let config = GatewayConfig::from_env()?;

    info!("Configuration:");
    info!("  BIND_ADDR: {}", config.bind_addr());
    info!("  METRICS_PORT: {}", config.metrics_port);
    info!("  RATES_BASE_URL: {}", config.rates_base_url);
    info!("  FETCH_TIMEOUT: {:?}", config.fetch_timeout);
    info!("  AUDIT_LOG_PATH: {}", config.audit_log_path.display());
    info!("  HISTORY_DAYS: {}", config.history_days);
    info!("  MAX_CONNECTIONS: {:?}", config.max_connections);
    info!("  MAX_CONCURRENT_FETCHES: {:?}", config.max_concurrent_fetches);

    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.metrics_port))
        .install()?;
    info!(
        "Prometheus metrics server started on port {}",
        config.metrics_port
    );

    let rates = Arc::new(PrivatBankClient::with_config(
        config.rates_base_url.clone(),
        config.fetch_timeout,
    ));
    let audit = Arc::new(AuditLog::open(&config.audit_log_path, config.audit_timeout).await?);

    let registry = Arc::new(ClientRegistry::new());
    let dispatcher = Arc::new(CommandDispatcher::new(
        registry.clone(),
        rates,
        audit,
        DispatcherConfig {
            history_days: config.history_days,
            max_concurrent_fetches: config.max_concurrent_fetches,
        },
    ));

    let state = Arc::new(AppState::new(
        registry,
        dispatcher,
        config.ping_interval,
        config.max_connections,
    ));

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("Gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received terminate signal"),
    }
}
