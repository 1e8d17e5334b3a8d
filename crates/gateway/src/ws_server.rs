//! WebSocket server handler using Axum.

use crate::client::{ClientId, ClientRegistry, ClientState};
use crate::dispatcher::CommandDispatcher;
use crate::error::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

/// Shared application state.
pub struct AppState {
    pub registry: Arc<ClientRegistry>,
    pub dispatcher: Arc<CommandDispatcher>,
    /// Keepalive ping interval.
    pub ping_interval: Duration,
    /// One permit per allowed connection. `None` means unbounded.
    connection_slots: Option<Arc<Semaphore>>,
}

impl AppState {
    pub fn new(
        registry: Arc<ClientRegistry>,
        dispatcher: Arc<CommandDispatcher>,
        ping_interval: Duration,
        max_connections: Option<usize>,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            ping_interval,
            connection_slots: max_connections.map(|max| Arc::new(Semaphore::new(max))),
        }
    }

    /// Reserve a connection slot. `Err` when the server is full.
    fn reserve_slot(&self) -> std::result::Result<Option<OwnedSemaphorePermit>, TryAcquireError> {
        match &self.connection_slots {
            Some(slots) => slots.clone().try_acquire_owned().map(Some),
            None => Ok(None),
        }
    }
}

/// Create the WebSocket router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Health check handler.
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "clients": state.registry.client_count(),
    }))
}

/// WebSocket upgrade handler.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    // The slot is taken before upgrading so concurrent handshakes cannot
    // overshoot the limit.
    let slot = match state.reserve_slot() {
        Ok(slot) => slot,
        Err(_) => {
            warn!(
                "Refusing connection: {} clients connected",
                state.registry.client_count()
            );
            counter!("gateway_rejected_connections_total").increment(1);
            return (StatusCode::SERVICE_UNAVAILABLE, "too many connections").into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, slot))
}

/// Everything a live connection holds. Released on drop, so cleanup also
/// runs when the connection task panics.
struct ConnectionGuard {
    registry: Arc<ClientRegistry>,
    client_id: ClientId,
    send_task: JoinHandle<()>,
    slot: Option<OwnedSemaphorePermit>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        // Freed before unregistering: a client absent from the registry
        // never holds a slot.
        self.slot.take();
        self.registry.unregister(&self.client_id);
        self.send_task.abort();

        counter!("gateway_disconnections_total").increment(1);
        gauge!("gateway_active_connections").set(self.registry.client_count() as f64);

        info!("Client {} disconnected", self.client_id);
    }
}

/// Handle a WebSocket connection from registration to cleanup.
async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    slot: Option<OwnedSemaphorePermit>,
) {
    let (mut ws_tx, ws_rx) = socket.split();

    // Outgoing messages are queued here and written by a dedicated task.
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let client = Arc::new(ClientState::new(tx));
    let client_id = state.registry.register(client.clone());

    counter!("gateway_connections_total").increment(1);
    gauge!("gateway_active_connections").set(state.registry.client_count() as f64);

    info!("Client {} ({}) connected", client_id, client.name);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(msg).await.is_err() {
                break;
            }
        }
    });

    let _guard = ConnectionGuard {
        registry: state.registry.clone(),
        client_id,
        send_task,
        slot,
    };

    match distribute(&state, &client, ws_rx).await {
        Ok(()) => debug!("Client {} closed the connection", client_id),
        Err(e) => warn!("Connection {} ended with error: {}", client_id, e),
    }
}

/// Per-connection receive loop.
///
/// Messages are dispatched one at a time in arrival order. Returns `Ok` on
/// an orderly close and `Err` on a transport error.
async fn distribute(
    state: &AppState,
    client: &ClientState,
    mut ws_rx: SplitStream<WebSocket>,
) -> Result<()> {
    let mut ping_interval = interval(state.ping_interval);
    ping_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ping_interval.reset();

    loop {
        tokio::select! {
            biased;

            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = state.dispatcher.dispatch(client, text.as_str()).await {
                            debug!("Reply to {} not delivered: {}", client.id, e);
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        debug!("Ignoring binary frame from {}", client.id);
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Err(e)) => return Err(e.into()),
                }
            }

            _ = ping_interval.tick() => {
                client.send(Message::Ping(Vec::new().into()))?;
            }
        }
    }
}
