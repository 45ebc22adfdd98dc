//! # relay-server
//!
//! Axum HTTP + `WebSocket` gateway for display clients.
//!
//! - `WebSocket` gateway at `/` and `/ws`: registration handshake, heartbeat,
//!   close detection
//! - [`ClientRegistry`]: guild → live connections, doubling as the
//!   broadcast router (implements [`DisplaySink`](relay_runtime::DisplaySink))
//! - `/health` endpoint
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod errors;
pub mod health;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use errors::ServerError;
pub use server::RelayServer;
pub use shutdown::ShutdownCoordinator;
pub use websocket::registry::ClientRegistry;
