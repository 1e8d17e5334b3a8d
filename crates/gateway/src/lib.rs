//! Gateway service: real-time chat relay with exchange-rate commands.
//!
//! This service:
//! - Accepts WebSocket connections from chat clients
//! - Assigns each client a display name and tracks it in a registry
//! - Broadcasts chat messages to every connected client
//! - Answers `exchange today` / `exchange lastday` privately with
//!   PrivatBank rates, recording each command in an audit log
//!
//! ## Architecture
//!
//! ```text
//! WebSocket client
//!         ↓
//! distribute loop (one task per connection)
//!         ↓
//! CommandDispatcher ──→ RateProvider (PrivatBank HTTP, concurrent per date)
//!         │        └──→ AuditLog (append-only file)
//!         ↓
//! ClientRegistry (DashMap) ──→ every client's writer task
//! ```

pub mod audit;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod names;
pub mod protocol;
pub mod ws_server;

pub use audit::{AuditEntry, AuditLog};
pub use client::{ClientId, ClientRegistry, ClientState};
pub use config::GatewayConfig;
pub use dispatcher::{CommandDispatcher, DispatcherConfig};
pub use error::{GatewayError, Result};
pub use protocol::Command;
pub use ws_server::{create_router, AppState};
