//! Client state and registry management.
//!
//! Uses DashMap so register, unregister and broadcast can run concurrently
//! from every connection task without a global lock.

use crate::error::{GatewayError, Result};
use crate::names::generate_display_name;
use axum::extract::ws::{Message, Utf8Bytes};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Unique client identifier.
pub type ClientId = Uuid;

/// State for a single connected client.
pub struct ClientState {
    /// Unique client identifier.
    pub id: ClientId,
    /// Display name shown in front of chat messages. Fixed for the
    /// lifetime of the connection.
    pub name: String,
    /// Channel to the client's WebSocket writer task.
    pub tx: mpsc::UnboundedSender<Message>,
    /// Timestamp when client connected.
    pub connected_at: i64,
}

impl ClientState {
    /// Create a new client with a generated display name.
    pub fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self::with_name(generate_display_name(), tx)
    }

    /// Create a new client with an explicit display name.
    pub fn with_name(name: impl Into<String>, tx: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tx,
            connected_at: Utc::now().timestamp_millis(),
        }
    }

    /// Send a raw message to this client.
    pub fn send(&self, msg: Message) -> Result<()> {
        self.tx.send(msg).map_err(|_| GatewayError::ChannelSend)
    }

    /// Send a text message to this client.
    pub fn send_text(&self, text: impl Into<String>) -> Result<()> {
        let text: String = text.into();
        self.send(Message::Text(text.into()))
    }
}

/// Registry of connected clients.
pub struct ClientRegistry {
    /// Client ID → Client State.
    clients: DashMap<ClientId, Arc<ClientState>>,
}

impl ClientRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
        }
    }

    /// Register a new client.
    pub fn register(&self, client: Arc<ClientState>) -> ClientId {
        let id = client.id;
        info!("Client {} registered as '{}'", id, client.name);
        self.clients.insert(id, client);
        id
    }

    /// Unregister a client.
    ///
    /// Returns `false` if the client was not registered; the registry is
    /// left untouched in that case.
    pub fn unregister(&self, client_id: &ClientId) -> bool {
        match self.clients.remove(client_id) {
            Some((_, client)) => {
                info!("Client {} ('{}') unregistered", client_id, client.name);
                true
            }
            None => {
                debug!("Client {} was not registered", client_id);
                false
            }
        }
    }

    /// Get a client by ID.
    pub fn get(&self, client_id: &ClientId) -> Option<Arc<ClientState>> {
        self.clients.get(client_id).map(|r| r.clone())
    }

    /// Snapshot of all connected clients.
    pub fn clients(&self) -> Vec<Arc<ClientState>> {
        self.clients.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Get the total number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Send `text` to every connected client.
    ///
    /// Returns the number of clients the message was handed to. A client
    /// whose writer has gone away is skipped without affecting the rest.
    pub fn broadcast(&self, text: &str) -> usize {
        if self.clients.is_empty() {
            return 0;
        }

        // Built once, cloned per client.
        let payload = Utf8Bytes::from(text);
        let mut delivered = 0;

        for entry in self.clients.iter() {
            let client = entry.value();
            match client.send(Message::Text(payload.clone())) {
                Ok(()) => delivered += 1,
                Err(e) => debug!("Failed to send to client {}: {}", client.id, e),
            }
        }

        delivered
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client(name: &str) -> (Arc<ClientState>, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(ClientState::with_name(name, tx)), rx)
    }

    fn recv_text(rx: &mut mpsc::UnboundedReceiver<Message>) -> Option<String> {
        match rx.try_recv() {
            Ok(Message::Text(text)) => Some(text.as_str().to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_register_unregister_counts() {
        let registry = ClientRegistry::new();
        let (a, _rx_a) = make_client("Alice");
        let (b, _rx_b) = make_client("Bob");
        let (c, _rx_c) = make_client("Carol");

        let a_id = registry.register(a);
        let b_id = registry.register(b);
        registry.register(c);
        assert_eq!(registry.client_count(), 3);

        assert!(registry.unregister(&a_id));
        assert!(!registry.unregister(&a_id));
        assert_eq!(registry.client_count(), 2);

        assert!(registry.unregister(&b_id));
        assert_eq!(registry.client_count(), 1);
        assert!(registry.get(&b_id).is_none());
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let registry = ClientRegistry::new();
        let (a, _rx) = make_client("Alice");
        registry.register(a);

        assert!(!registry.unregister(&Uuid::new_v4()));
        assert_eq!(registry.client_count(), 1);
    }

    #[test]
    fn test_register_twice_keeps_single_entry() {
        let registry = ClientRegistry::new();
        let (a, _rx) = make_client("Alice");
        registry.register(a.clone());
        registry.register(a);
        assert_eq!(registry.client_count(), 1);
    }

    #[test]
    fn test_broadcast_empty_registry() {
        let registry = ClientRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.broadcast("hello"), 0);
    }

    #[test]
    fn test_broadcast_reaches_all() {
        let registry = ClientRegistry::new();
        let mut receivers = Vec::new();
        for name in ["Alice", "Bob", "Carol"] {
            let (client, rx) = make_client(name);
            registry.register(client);
            receivers.push(rx);
        }

        assert_eq!(registry.broadcast("Alice: hello"), 3);
        for rx in receivers.iter_mut() {
            assert_eq!(recv_text(rx).as_deref(), Some("Alice: hello"));
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn test_broadcast_isolates_failed_client() {
        let registry = ClientRegistry::new();
        let (a, mut rx_a) = make_client("Alice");
        let (b, rx_b) = make_client("Bob");
        let (c, mut rx_c) = make_client("Carol");
        registry.register(a);
        registry.register(b);
        registry.register(c);

        // Bob's writer is gone.
        drop(rx_b);

        assert_eq!(registry.broadcast("news"), 2);
        assert_eq!(recv_text(&mut rx_a).as_deref(), Some("news"));
        assert_eq!(recv_text(&mut rx_c).as_deref(), Some("news"));
    }
}
