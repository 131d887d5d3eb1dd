//! Transport layer for the MCP server.
//!
//! - **SSE**: `GET /sse` event stream plus `POST /messages/` - feature: `sse`
//! - **STDIO**: standard input/output through rmcp - feature: `stdio`
//!
//! Both transports share one tool registry. The SSE transport drives the
//! session gateway in `core::gateway`; STDIO hands the registry to rmcp.

mod config;
mod error;
mod service;

#[cfg(feature = "sse")]
pub mod sse;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "sse")]
pub use config::SseConfig;
