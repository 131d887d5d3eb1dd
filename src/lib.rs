//! MCP Tool Gateway Library
//!
//! An MCP server exposing weather alerts, weather forecasts, Azure retail
//! prices and Chinese character counting. Clients connect over Server-Sent
//! Events (or STDIO) and invoke tools concurrently; every invocation yields
//! text, with upstream failures reported as explanatory messages.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the server handler, the session
//!   gateway and the transports
//! - **domains**: business logic organized by bounded contexts
//!   - **upstream**: fetcher with explicit absent results, and the paginator
//!   - **tools**: descriptors, registry and the four tool handlers
//!
//! # Example
//!
//! ```rust,no_run
//! use mcp_tool_gateway::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone());
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
