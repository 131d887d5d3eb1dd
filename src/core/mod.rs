//! Core module containing shared infrastructure components.
//!
//! Configuration, error handling, the server handler, the session gateway
//! and the transport layer.

pub mod config;
pub mod error;
pub mod gateway;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use gateway::{Gateway, GatewayError};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
