//! Display client `WebSocket` handling.

pub mod connection;
pub mod registration;
pub mod registry;
pub mod session;
